//! Converter configuration

use crate::error::{ConvertError, ConvertResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Target warehouse
///
/// Parsing never fails: a value outside the supported set is kept as
/// [`WarehouseType::Unsupported`] so that `convert` can reject it with the
/// original spelling before doing any work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WarehouseType {
    Snowflake,
    Databricks,
    Unsupported(String),
}

impl WarehouseType {
    pub fn is_supported(&self) -> bool {
        !matches!(self, WarehouseType::Unsupported(_))
    }

    /// Whether unquoted identifiers resolve as upper case on this warehouse
    pub fn folds_to_uppercase(&self) -> bool {
        matches!(self, WarehouseType::Snowflake)
    }
}

impl From<String> for WarehouseType {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "snowflake" => WarehouseType::Snowflake,
            "databricks" => WarehouseType::Databricks,
            _ => WarehouseType::Unsupported(s),
        }
    }
}

impl From<&str> for WarehouseType {
    fn from(s: &str) -> Self {
        WarehouseType::from(s.to_string())
    }
}

impl From<WarehouseType> for String {
    fn from(w: WarehouseType) -> Self {
        w.to_string()
    }
}

impl std::fmt::Display for WarehouseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarehouseType::Snowflake => write!(f, "snowflake"),
            WarehouseType::Databricks => write!(f, "databricks"),
            WarehouseType::Unsupported(s) => write!(f, "{}", s),
        }
    }
}

/// Column names on the date dataset, one per calendar unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateColumns {
    pub year: String,
    pub half_year: String,
    pub quarter: String,
    pub month: String,
    pub week: String,
    pub day: String,
}

impl Default for DateColumns {
    fn default() -> Self {
        Self {
            year: "year".to_string(),
            half_year: "half_year".to_string(),
            quarter: "quarter".to_string(),
            month: "month".to_string(),
            week: "week".to_string(),
            day: "date_day".to_string(),
        }
    }
}

/// Shared date dimension that time attributes role-play against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateDimensionConfig {
    /// Dimension name
    pub name: String,

    /// Dataset backing the dimension
    pub dataset: String,

    /// Physical table of the dataset
    pub table: String,

    /// Year > Half Year > Quarter > Month > Day
    pub standard_hierarchy: String,

    /// Year > Week > Day
    pub week_hierarchy: String,

    pub columns: DateColumns,
}

impl Default for DateDimensionConfig {
    fn default() -> Self {
        Self {
            name: "Date Dimension".to_string(),
            dataset: "date_dim".to_string(),
            table: "date_dim".to_string(),
            standard_hierarchy: "Standard Calendar".to_string(),
            week_hierarchy: "Week Calendar".to_string(),
            columns: DateColumns::default(),
        }
    }
}

/// Conversion settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertConfig {
    /// Target warehouse type
    pub warehouse: WarehouseType,

    /// Database the datasets live in
    #[serde(default)]
    pub database: String,

    /// Schema the datasets live in
    #[serde(default)]
    pub schema: String,

    /// Connection identifier shared by every dataset
    #[serde(default = "default_connection_id")]
    pub connection_id: String,

    /// Catalog name (defaults to the dbt project name)
    #[serde(default)]
    pub catalog_name: Option<String>,

    /// Model name (defaults to the dbt project name)
    #[serde(default)]
    pub model_name: Option<String>,

    #[serde(default)]
    pub date_dimension: DateDimensionConfig,
}

fn default_connection_id() -> String {
    "dbt_connection".to_string()
}

impl ConvertConfig {
    /// Config with defaults for everything but the target location
    pub fn new(
        warehouse: impl Into<WarehouseType>,
        database: impl Into<String>,
        schema: impl Into<String>,
    ) -> Self {
        Self {
            warehouse: warehouse.into(),
            database: database.into(),
            schema: schema.into(),
            connection_id: default_connection_id(),
            catalog_name: None,
            model_name: None,
            date_dimension: DateDimensionConfig::default(),
        }
    }

    /// Parse configuration from YAML content
    pub fn from_yaml(content: &str) -> ConvertResult<Self> {
        serde_yaml::from_str(content).map_err(|e| ConvertError::Config {
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> ConvertResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConvertError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            ConvertError::Config { message } => ConvertError::Config {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
