//! Error types for sml-dbt

use thiserror::Error;

/// Input error type
#[derive(Error, Debug)]
pub enum DbtError {
    /// D001: The index could not be deserialized
    #[error("[D001] Failed to parse dbt semantic index: {message}")]
    Parse { message: String },

    /// D002: A metric definition is structurally invalid
    #[error("[D002] Invalid metric '{name}': {reason}")]
    InvalidMetric { name: String, reason: String },
}

/// Result type alias for DbtError
pub type DbtResult<T> = Result<T, DbtError>;
