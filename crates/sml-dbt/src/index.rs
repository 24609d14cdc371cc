//! The parsed dbt semantic-layer index handed to the converter

use crate::error::{DbtError, DbtResult};
use crate::metric::Metric;
use crate::project::DbtProject;
use crate::semantic_model::{Measure, SemanticModel};
use serde::Deserialize;

/// Everything the converter reads from a dbt project
#[derive(Debug, Clone, Deserialize)]
pub struct DbtIndex {
    pub project: DbtProject,

    #[serde(default)]
    pub semantic_models: Vec<SemanticModel>,

    #[serde(default)]
    pub metrics: Vec<Metric>,
}

impl DbtIndex {
    /// Parse an index from YAML content
    pub fn from_yaml(content: &str) -> DbtResult<Self> {
        serde_yaml::from_str(content).map_err(|e| DbtError::Parse {
            message: e.to_string(),
        })
    }

    /// Parse an index from JSON content
    pub fn from_json(content: &str) -> DbtResult<Self> {
        serde_json::from_str(content).map_err(|e| DbtError::Parse {
            message: e.to_string(),
        })
    }

    pub fn semantic_model(&self, name: &str) -> Option<&SemanticModel> {
        self.semantic_models.iter().find(|m| m.name == name)
    }

    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }

    /// Find a measure by name together with the semantic model defining it
    pub fn find_measure(&self, name: &str) -> Option<(&SemanticModel, &Measure)> {
        self.semantic_models
            .iter()
            .find_map(|model| model.measure(name).map(|measure| (model, measure)))
    }
}

#[cfg(test)]
#[path = "index_test.rs"]
mod tests;
