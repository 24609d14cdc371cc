//! Dimensions, hierarchies, levels and attributes

use crate::object::{impl_sml_object, ObjectType};
use serde::{Deserialize, Serialize};

/// Calendar unit a time level is keyed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Year,
    HalfYear,
    Quarter,
    Month,
    Week,
    Day,
}

/// Whether a dimension is a regular or a time dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionKind {
    #[default]
    Standard,
    Time,
}

/// Attribute keyed by a level of a hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelAttribute {
    pub unique_name: String,
    pub label: String,
    pub dataset: String,
    pub name_column: String,
    pub key_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<TimeUnit>,
}

impl LevelAttribute {
    /// Attribute whose key and name are the same column
    pub fn keyed_by(
        unique_name: impl Into<String>,
        dataset: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        let unique_name = unique_name.into();
        let column = column.into();
        Self {
            label: unique_name.clone(),
            unique_name,
            dataset: dataset.into(),
            name_column: column.clone(),
            key_columns: vec![column],
            sort_column: None,
            time_unit: None,
        }
    }

    pub fn with_time_unit(mut self, unit: TimeUnit) -> Self {
        self.time_unit = Some(unit);
        self
    }
}

/// Extra attribute hanging off a level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryAttribute {
    pub unique_name: String,
    pub label: String,
    pub dataset: String,
    pub name_column: String,
    pub key_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_column: Option<String>,
}

impl SecondaryAttribute {
    pub fn keyed_by(
        unique_name: impl Into<String>,
        dataset: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        let unique_name = unique_name.into();
        let column = column.into();
        Self {
            label: unique_name.clone(),
            unique_name,
            dataset: dataset.into(),
            name_column: column.clone(),
            key_columns: vec![column],
            sort_column: None,
        }
    }
}

/// A level of a hierarchy; refers to a level attribute by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub unique_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_attributes: Vec<SecondaryAttribute>,
}

impl Level {
    pub fn new(unique_name: impl Into<String>) -> Self {
        Self {
            unique_name: unique_name.into(),
            secondary_attributes: Vec::new(),
        }
    }
}

/// Ordered levels from coarsest to finest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub unique_name: String,
    pub label: String,
    pub levels: Vec<Level>,
}

impl Hierarchy {
    pub fn new(unique_name: impl Into<String>, levels: Vec<Level>) -> Self {
        let unique_name = unique_name.into();
        Self {
            label: unique_name.clone(),
            unique_name,
            levels,
        }
    }

    /// The finest level
    pub fn leaf(&self) -> Option<&Level> {
        self.levels.last()
    }

    pub fn level(&self, name: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.unique_name == name)
    }
}

/// A dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub unique_name: String,
    pub object_type: ObjectType,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: DimensionKind,
    #[serde(default)]
    pub is_degenerate: bool,
    pub hierarchies: Vec<Hierarchy>,
    pub level_attributes: Vec<LevelAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Dimension {
    pub fn new(unique_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            unique_name: unique_name.into(),
            object_type: ObjectType::Dimension,
            label: label.into(),
            kind: DimensionKind::Standard,
            is_degenerate: false,
            hierarchies: Vec::new(),
            level_attributes: Vec::new(),
            description: None,
        }
    }

    pub fn hierarchy(&self, name: &str) -> Option<&Hierarchy> {
        self.hierarchies.iter().find(|h| h.unique_name == name)
    }

    pub fn level_attribute(&self, name: &str) -> Option<&LevelAttribute> {
        self.level_attributes.iter().find(|a| a.unique_name == name)
    }

    /// Whether any hierarchy has a level with this name
    pub fn has_level(&self, name: &str) -> bool {
        self.hierarchies.iter().any(|h| h.level(name).is_some())
    }

    /// Names of every level attribute and secondary attribute
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        let levels = self.level_attributes.iter().map(|a| a.unique_name.as_str());
        let secondary = self
            .hierarchies
            .iter()
            .flat_map(|h| h.levels.iter())
            .flat_map(|l| l.secondary_attributes.iter())
            .map(|a| a.unique_name.as_str());
        levels.chain(secondary)
    }

    /// First hierarchy and level whose attribute carries `unit`
    pub fn find_time_level(&self, unit: TimeUnit) -> Option<(&Hierarchy, &Level)> {
        self.hierarchies.iter().find_map(|h| {
            h.levels
                .iter()
                .find(|l| {
                    self.level_attribute(&l.unique_name)
                        .is_some_and(|a| a.time_unit == Some(unit))
                })
                .map(|l| (h, l))
        })
    }
}

impl_sml_object!(Dimension);

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar() -> Dimension {
        let mut dim = Dimension::new("Date Dimension", "Date Dimension");
        dim.kind = DimensionKind::Time;
        dim.level_attributes = vec![
            LevelAttribute::keyed_by("Year", "date_dim", "year").with_time_unit(TimeUnit::Year),
            LevelAttribute::keyed_by("Week", "date_dim", "week").with_time_unit(TimeUnit::Week),
            LevelAttribute::keyed_by("Day", "date_dim", "date_day").with_time_unit(TimeUnit::Day),
        ];
        dim.hierarchies = vec![
            Hierarchy::new("Standard", vec![Level::new("Year"), Level::new("Day")]),
            Hierarchy::new(
                "Weekly",
                vec![Level::new("Year"), Level::new("Week"), Level::new("Day")],
            ),
        ];
        dim
    }

    #[test]
    fn test_find_time_level_prefers_first_hierarchy() {
        let dim = calendar();
        let (h, l) = dim.find_time_level(TimeUnit::Day).unwrap();
        assert_eq!(h.unique_name, "Standard");
        assert_eq!(l.unique_name, "Day");
    }

    #[test]
    fn test_find_time_level_searches_later_hierarchies() {
        let dim = calendar();
        let (h, l) = dim.find_time_level(TimeUnit::Week).unwrap();
        assert_eq!(h.unique_name, "Weekly");
        assert_eq!(l.unique_name, "Week");
        assert!(dim.find_time_level(TimeUnit::Quarter).is_none());
    }

    #[test]
    fn test_attribute_names_include_secondary() {
        let mut dim = Dimension::new("customers", "Customers");
        dim.level_attributes = vec![LevelAttribute::keyed_by("customer_id", "customers", "id")];
        let mut level = Level::new("customer_id");
        level
            .secondary_attributes
            .push(SecondaryAttribute::keyed_by("region", "customers", "region"));
        dim.hierarchies = vec![Hierarchy::new("customers", vec![level])];

        let names: Vec<&str> = dim.attribute_names().collect();
        assert_eq!(names, vec!["customer_id", "region"]);
        assert!(dim.has_level("customer_id"));
        assert!(!dim.has_level("region"));
    }

    #[test]
    fn test_time_unit_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TimeUnit::HalfYear).unwrap(),
            r#""halfyear""#
        );
    }
}
