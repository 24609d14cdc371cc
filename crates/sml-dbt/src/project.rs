//! dbt project header

use serde::{Deserialize, Serialize};

/// Per-identifier-class quoting flags from `dbt_project.yml`.
///
/// An unset flag means the warehouse default applies, which for every
/// supported warehouse is "not quoted".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quoting {
    #[serde(default)]
    pub database: Option<bool>,
    #[serde(default)]
    pub schema: Option<bool>,
    #[serde(default)]
    pub identifier: Option<bool>,
}

impl Quoting {
    /// Whether database names are quoted
    pub fn database_quoted(&self) -> bool {
        self.database.unwrap_or(false)
    }

    /// Whether schema names are quoted
    pub fn schema_quoted(&self) -> bool {
        self.schema.unwrap_or(false)
    }

    /// Whether table and column identifiers are quoted
    pub fn identifier_quoted(&self) -> bool {
        self.identifier.unwrap_or(false)
    }
}

/// The dbt project the semantic layer belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbtProject {
    /// Project name
    pub name: String,

    /// Identifier quoting configuration
    #[serde(default)]
    pub quoting: Quoting,
}
