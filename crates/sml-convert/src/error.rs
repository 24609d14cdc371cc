//! Error types for sml-convert

use thiserror::Error;

/// Fatal conversion error. Any of these aborts the whole run.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// C001: Warehouse type outside the supported set
    #[error("[C001] Unsupported warehouse type '{warehouse}': expected one of snowflake, databricks")]
    UnsupportedWarehouse { warehouse: String },

    /// C002: The index has no semantic models
    #[error("[C002] No semantic models found in project '{project}'")]
    NoSemanticModels { project: String },

    /// C003: No semantic model resolved to a dataset
    #[error("[C003] No datasets are referenced by any semantic model in project '{project}'")]
    NoDatasets { project: String },

    /// C004: Failed to load the converter configuration
    #[error("[C004] Invalid converter config: {message}")]
    Config { message: String },

    /// C005: Object graph invariant violated
    #[error("[C005] {0}")]
    Graph(#[from] sml_core::SmlError),

    /// C006: Input index error propagation
    #[error("[C006] {0}")]
    Input(#[from] sml_dbt::DbtError),
}

/// Result type alias for ConvertError
pub type ConvertResult<T> = Result<T, ConvertError>;
