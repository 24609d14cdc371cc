//! Semantic model definitions
//!
//! A semantic model bundles a backing table with the key entities,
//! dimension attributes and measures defined on it.

use crate::serde_helpers::deserialize_expr;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Role of an entity (key column) on a semantic model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// One row per value; the target of foreign keys
    Primary,
    /// References a primary entity on another semantic model
    Foreign,
    /// Unique but possibly sparse key
    Unique,
    /// Natural key (slowly changing dimensions)
    Natural,
}

/// A key column on a semantic model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,

    #[serde(rename = "type")]
    pub entity_type: EntityType,

    #[serde(default, deserialize_with = "deserialize_expr")]
    pub expr: Option<String>,
}

/// Kind of a dimension attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionType {
    Time,
    Categorical,
}

/// Extra parameters on a dimension attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionTypeParams {
    /// Time granularity for time dimensions (e.g. `day`, `month`)
    #[serde(default)]
    pub time_granularity: Option<String>,
}

/// A dimension attribute on a semantic model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionAttribute {
    pub name: String,

    #[serde(rename = "type")]
    pub dimension_type: DimensionType,

    #[serde(default, deserialize_with = "deserialize_expr")]
    pub expr: Option<String>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub type_params: Option<DimensionTypeParams>,
}

impl DimensionAttribute {
    /// Declared time granularity, if any
    pub fn time_granularity(&self) -> Option<&str> {
        self.type_params
            .as_ref()
            .and_then(|p| p.time_granularity.as_deref())
    }

    pub fn is_time(&self) -> bool {
        self.dimension_type == DimensionType::Time
    }
}

/// Aggregation applied by a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Sum,
    SumBoolean,
    Count,
    CountDistinct,
    Average,
    Min,
    Max,
    Median,
    Percentile,
}

impl Aggregation {
    /// Whether the aggregation counts rows or values
    pub fn is_count(&self) -> bool {
        matches!(self, Aggregation::Count | Aggregation::CountDistinct)
    }

    /// Whether the aggregation is percentile based (median included)
    pub fn is_percentile(&self) -> bool {
        matches!(self, Aggregation::Median | Aggregation::Percentile)
    }
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Aggregation::Sum => "sum",
            Aggregation::SumBoolean => "sum_boolean",
            Aggregation::Count => "count",
            Aggregation::CountDistinct => "count_distinct",
            Aggregation::Average => "average",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Median => "median",
            Aggregation::Percentile => "percentile",
        };
        f.write_str(s)
    }
}

/// A measure on a semantic model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub name: String,

    /// Aggregation; dbt treats a missing value as `sum`
    #[serde(default)]
    pub agg: Option<Aggregation>,

    #[serde(default, deserialize_with = "deserialize_expr")]
    pub expr: Option<String>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub agg_time_dimension: Option<String>,
}

impl Measure {
    pub fn aggregation(&self) -> Aggregation {
        self.agg.unwrap_or(Aggregation::Sum)
    }
}

/// Defaults block on a semantic model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticModelDefaults {
    #[serde(default)]
    pub agg_time_dimension: Option<String>,
}

/// A dbt semantic model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticModel {
    pub name: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Backing table reference, usually `ref('table')`
    pub model: String,

    #[serde(default)]
    pub defaults: Option<SemanticModelDefaults>,

    #[serde(default)]
    pub entities: Vec<Entity>,

    #[serde(default)]
    pub dimensions: Vec<DimensionAttribute>,

    #[serde(default)]
    pub measures: Vec<Measure>,
}

static REF_PATTERN: OnceLock<Regex> = OnceLock::new();

fn ref_regex() -> &'static Regex {
    REF_PATTERN.get_or_init(|| {
        Regex::new(r#"^ref\(\s*(?:['"][^'"]*['"]\s*,\s*)?['"]([^'"]+)['"]\s*\)$"#)
            .expect("valid regex literal")
    })
}

impl SemanticModel {
    /// Resolve the backing table name from the `model` reference.
    ///
    /// Accepts `ref('x')`, `ref("x")`, `ref('package', 'x')` and a bare
    /// identifier. Returns `None` for anything else.
    pub fn table_name(&self) -> Option<String> {
        let model = self.model.trim();
        if let Some(caps) = ref_regex().captures(model) {
            return caps.get(1).map(|m| m.as_str().trim().to_string());
        }
        let bare = !model.is_empty()
            && model
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        bare.then(|| model.to_string())
    }

    /// Label falling back to the name
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn has_measures(&self) -> bool {
        !self.measures.is_empty()
    }

    /// The primary entity with the given name
    pub fn primary_entity(&self, name: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.entity_type == EntityType::Primary && e.name == name)
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn dimension(&self, name: &str) -> Option<&DimensionAttribute> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
#[path = "semantic_model_test.rs"]
mod tests;
