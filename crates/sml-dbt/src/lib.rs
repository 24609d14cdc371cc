//! sml-dbt - dbt semantic-layer input types
//!
//! This crate models the already-parsed dbt semantic layer that the converter
//! consumes: the project header with its quoting flags, semantic models with
//! their entities, dimensions and measures, and the metric definitions. The
//! types deserialize straight from the YAML/JSON shape dbt uses.

pub mod error;
pub mod index;
pub mod metric;
pub mod project;
pub mod semantic_model;
pub(crate) mod serde_helpers;

pub use error::{DbtError, DbtResult};
pub use index::DbtIndex;
pub use metric::{Metric, MetricInput, MetricKind, MetricType, TimePeriod, Window};
pub use project::{DbtProject, Quoting};
pub use semantic_model::{
    Aggregation, DimensionAttribute, DimensionType, Entity, EntityType, Measure, SemanticModel,
};
