//! sml-core - SML object graph
//!
//! This crate defines the semantic-model objects produced by the converter
//! (catalog, connection, datasets, dimensions, measures, calculated measures
//! and the composite model) and the accumulator that collects them while
//! enforcing name uniqueness across the whole graph.

pub mod catalog;
pub mod dataset;
pub mod dimension;
pub mod error;
pub mod graph;
pub mod ident;
pub mod measure;
pub mod model;
pub mod object;

pub use catalog::{Catalog, Connection};
pub use dataset::{Column, ColumnChange, ColumnType, Dataset};
pub use dimension::{
    Dimension, DimensionKind, Hierarchy, Level, LevelAttribute, SecondaryAttribute, TimeUnit,
};
pub use error::{SmlError, SmlResult};
pub use graph::{SmlGraph, SmlGraphBuilder};
pub use measure::{CalculatedMeasure, CalculationMethod, Measure};
pub use model::{
    DimensionReference, MetricReference, Model, Relationship, RelationshipFrom, RelationshipTo,
};
pub use object::{ObjectType, SmlObject};
