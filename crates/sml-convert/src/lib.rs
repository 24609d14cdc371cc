//! sml-convert - dbt semantic layer to SML conversion
//!
//! The engine reads a parsed [`sml_dbt::DbtIndex`] and produces an
//! [`sml_core::SmlGraph`]: datasets and columns from semantic models,
//! dimensions and relationships inferred from entities and time
//! attributes, and measures compiled from metrics. Metrics that cannot be
//! expressed are skipped with a warning, and anything that referred to them
//! is removed so the finished graph has no dangling references.

pub mod cascade;
pub mod case;
pub mod config;
pub mod convert;
pub mod datasets;
pub mod error;
pub mod expression;
pub mod metric_dag;
pub mod metrics;
mod relationships;
pub mod report;
pub mod time_dimension;

pub use cascade::{cascade_removals, CascadeOutcome, CascadedRemoval};
pub use case::normalize_case;
pub use config::{ConvertConfig, DateColumns, DateDimensionConfig, WarehouseType};
pub use convert::{convert, ConversionOutput};
pub use error::{ConvertError, ConvertResult};
pub use report::{ConversionReport, ConversionWarning, WarningKind};
