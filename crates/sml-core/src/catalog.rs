//! Catalog and connection objects

use crate::object::{impl_sml_object, ObjectType};
use serde::{Deserialize, Serialize};

/// Root catalog object, one per conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub unique_name: String,
    pub object_type: ObjectType,
    pub label: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Catalog {
    pub fn new(unique_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            unique_name: unique_name.into(),
            object_type: ObjectType::Catalog,
            label: label.into(),
            version: "1.0".to_string(),
            description: None,
        }
    }
}

/// Warehouse connection the datasets read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub unique_name: String,
    pub object_type: ObjectType,
    pub label: String,
    /// Name of the connection configured in the BI engine
    pub as_connection: String,
    pub database: String,
    pub schema: String,
}

impl Connection {
    pub fn new(
        unique_name: impl Into<String>,
        database: impl Into<String>,
        schema: impl Into<String>,
    ) -> Self {
        let unique_name = unique_name.into();
        Self {
            label: unique_name.clone(),
            as_connection: unique_name.clone(),
            unique_name,
            object_type: ObjectType::Connection,
            database: database.into(),
            schema: schema.into(),
        }
    }
}

impl_sml_object!(Catalog, Connection);
