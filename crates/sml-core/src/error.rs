//! Error types for sml-core

use crate::object::ObjectType;
use thiserror::Error;

/// Object graph error type
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SmlError {
    /// S001: An object with the same name and type is already in the graph
    #[error("[S001] Duplicate {object_type} '{name}' in the object graph")]
    DuplicateName {
        name: String,
        object_type: ObjectType,
    },

    /// S002: The catalog was read before it was set
    #[error("[S002] Catalog has not been set")]
    CatalogNotSet,

    /// S003: The catalog was set a second time
    #[error("[S003] Catalog is already set to '{existing}'")]
    CatalogAlreadySet { existing: String },
}

/// Result type alias for SmlError
pub type SmlResult<T> = Result<T, SmlError>;
