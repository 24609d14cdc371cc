//! The composite model: relationships plus exposed metrics and dimensions

use crate::object::{impl_sml_object, ObjectType};
use serde::{Deserialize, Serialize};

/// Fact side of a relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipFrom {
    pub dataset: String,
    pub join_columns: Vec<String>,
}

/// Dimension side of a relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipTo {
    pub dimension: String,
    pub level: String,
}

/// Join from a dataset to a dimension level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub unique_name: String,
    pub from: RelationshipFrom,
    pub to: RelationshipTo,
    /// Role-play template such as `order_date {0}` for shared dimensions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_play: Option<String>,
}

impl Relationship {
    pub fn new(
        dataset: impl Into<String>,
        join_columns: Vec<String>,
        dimension: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        let from = RelationshipFrom {
            dataset: dataset.into(),
            join_columns,
        };
        let to = RelationshipTo {
            dimension: dimension.into(),
            level: level.into(),
        };
        Self {
            unique_name: format!(
                "{}_{}_to_{}",
                from.dataset,
                from.join_columns.join("_"),
                to.dimension
            ),
            from,
            to,
            role_play: None,
        }
    }

    pub fn with_role_play(mut self, role_play: impl Into<String>) -> Self {
        let role_play = role_play.into();
        self.unique_name = format!("{}_{}", self.unique_name, role_play.replace("{0}", "").trim());
        self.role_play = Some(role_play);
        self
    }

    /// Whether both relationships join the same columns to the same target
    pub fn same_join(&self, other: &Relationship) -> bool {
        self.from == other.from && self.to == other.to && self.role_play == other.role_play
    }
}

/// Metric exposed by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricReference {
    pub unique_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

/// Dimension exposed by the model without a relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionReference {
    pub unique_name: String,
}

/// The composite model handed to end users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub unique_name: String,
    pub object_type: ObjectType,
    pub label: String,
    pub relationships: Vec<Relationship>,
    pub metrics: Vec<MetricReference>,
    pub dimensions: Vec<DimensionReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Model {
    pub fn new(unique_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            unique_name: unique_name.into(),
            object_type: ObjectType::Model,
            label: label.into(),
            relationships: Vec::new(),
            metrics: Vec::new(),
            dimensions: Vec::new(),
            description: None,
        }
    }

    pub fn has_metric(&self, name: &str) -> bool {
        self.metrics.iter().any(|m| m.unique_name == name)
    }
}

impl_sml_object!(Model);
