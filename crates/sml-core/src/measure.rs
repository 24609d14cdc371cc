//! Column-backed and expression-backed measures

use crate::object::{impl_sml_object, ObjectType};
use serde::{Deserialize, Serialize};

/// How a column-backed measure aggregates its column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalculationMethod {
    #[default]
    #[serde(rename = "sum")]
    Sum,
    #[serde(rename = "average")]
    Average,
    #[serde(rename = "count non-null")]
    CountNonNull,
    #[serde(rename = "count distinct")]
    CountDistinct,
    #[serde(rename = "maximum")]
    Maximum,
    #[serde(rename = "minimum")]
    Minimum,
}

/// Measure aggregating a dataset column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measure {
    pub unique_name: String,
    pub object_type: ObjectType,
    pub label: String,
    pub calculation_method: CalculationMethod,
    pub dataset: String,
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Measure {
    pub fn new(
        unique_name: impl Into<String>,
        dataset: impl Into<String>,
        column: impl Into<String>,
        calculation_method: CalculationMethod,
    ) -> Self {
        let unique_name = unique_name.into();
        Self {
            label: unique_name.clone(),
            unique_name,
            object_type: ObjectType::Metric,
            calculation_method,
            dataset: dataset.into(),
            column: column.into(),
            description: None,
        }
    }
}

/// Measure defined by an MDX expression over other measures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedMeasure {
    pub unique_name: String,
    pub object_type: ObjectType,
    pub label: String,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CalculatedMeasure {
    pub fn new(unique_name: impl Into<String>, expression: impl Into<String>) -> Self {
        let unique_name = unique_name.into();
        Self {
            label: unique_name.clone(),
            unique_name,
            object_type: ObjectType::MetricCalc,
            expression: expression.into(),
            description: None,
        }
    }
}

impl_sml_object!(Measure, CalculatedMeasure);
