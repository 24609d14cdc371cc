//! The shared date dimension and time level lookup

use crate::config::DateDimensionConfig;
use sml_core::{
    Column, ColumnType, Dataset, Dimension, DimensionKind, Hierarchy, Level, LevelAttribute,
    TimeUnit,
};
use sml_dbt::TimePeriod;

pub const YEAR: &str = "Year";
pub const HALF_YEAR: &str = "Half Year";
pub const QUARTER: &str = "Quarter";
pub const MONTH: &str = "Month";
pub const WEEK: &str = "Week";
/// Level every time relationship joins at
pub const DAY: &str = "Day";

/// Calendar unit for a dbt period
pub fn time_unit(period: TimePeriod) -> TimeUnit {
    match period {
        TimePeriod::Day => TimeUnit::Day,
        TimePeriod::Week => TimeUnit::Week,
        TimePeriod::Month => TimeUnit::Month,
        TimePeriod::Quarter => TimeUnit::Quarter,
        TimePeriod::HalfYear => TimeUnit::HalfYear,
        TimePeriod::Year => TimeUnit::Year,
    }
}

/// Role-play template for a time attribute, e.g. `order_date {0}`
pub fn role_play(attribute: &str) -> String {
    format!("{} {{0}}", attribute)
}

/// Dataset backing the date dimension
pub fn date_dataset(config: &DateDimensionConfig, connection_id: &str) -> Dataset {
    let mut dataset = Dataset::new(&config.dataset, connection_id, &config.table);
    for column in date_columns(config) {
        dataset.upsert_column(column);
    }
    dataset
}

/// Columns the date dimension reads, day key first
pub fn date_columns(config: &DateDimensionConfig) -> Vec<Column> {
    let c = &config.columns;
    vec![
        Column::new(&c.day, ColumnType::DateTime),
        Column::new(&c.week, ColumnType::Long),
        Column::new(&c.month, ColumnType::Long),
        Column::new(&c.quarter, ColumnType::Long),
        Column::new(&c.half_year, ColumnType::Long),
        Column::new(&c.year, ColumnType::Long),
    ]
}

/// Time dimension with a standard and a week calendar
pub fn date_dimension(config: &DateDimensionConfig) -> Dimension {
    let c = &config.columns;
    let attribute = |name: &str, column: &str, unit: TimeUnit| {
        LevelAttribute::keyed_by(name, &config.dataset, column).with_time_unit(unit)
    };

    let mut dimension = Dimension::new(&config.name, &config.name);
    dimension.kind = DimensionKind::Time;
    dimension.level_attributes = vec![
        attribute(YEAR, &c.year, TimeUnit::Year),
        attribute(HALF_YEAR, &c.half_year, TimeUnit::HalfYear),
        attribute(QUARTER, &c.quarter, TimeUnit::Quarter),
        attribute(MONTH, &c.month, TimeUnit::Month),
        attribute(WEEK, &c.week, TimeUnit::Week),
        attribute(DAY, &c.day, TimeUnit::Day),
    ];
    dimension.hierarchies = vec![
        Hierarchy::new(
            &config.standard_hierarchy,
            [YEAR, HALF_YEAR, QUARTER, MONTH, DAY]
                .into_iter()
                .map(Level::new)
                .collect(),
        ),
        Hierarchy::new(
            &config.week_hierarchy,
            [YEAR, WEEK, DAY].into_iter().map(Level::new).collect(),
        ),
    ];
    dimension
}

/// A level of a hierarchy on a time dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLevelRef {
    pub dimension: String,
    pub hierarchy: String,
    pub level: String,
}

impl TimeLevelRef {
    /// `[dimension].[hierarchy]`
    pub fn hierarchy_ref(&self) -> String {
        format!("[{}].[{}]", self.dimension, self.hierarchy)
    }

    /// `[dimension].[hierarchy].[level]`
    pub fn level_ref(&self) -> String {
        format!("[{}].[{}].[{}]", self.dimension, self.hierarchy, self.level)
    }
}

/// Find the level whose attribute is keyed at `period`
pub fn resolve_time_level(dimension: &Dimension, period: TimePeriod) -> Option<TimeLevelRef> {
    dimension
        .find_time_level(time_unit(period))
        .map(|(hierarchy, level)| TimeLevelRef {
            dimension: dimension.unique_name.clone(),
            hierarchy: hierarchy.unique_name.clone(),
            level: level.unique_name.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_dimension_shape() {
        let dim = date_dimension(&DateDimensionConfig::default());
        assert_eq!(dim.kind, DimensionKind::Time);
        assert_eq!(dim.hierarchies.len(), 2);
        assert_eq!(dim.hierarchies[0].leaf().unwrap().unique_name, DAY);
        assert_eq!(dim.hierarchies[1].levels.len(), 3);
        for hierarchy in &dim.hierarchies {
            for level in &hierarchy.levels {
                assert!(dim.level_attribute(&level.unique_name).is_some());
            }
        }
    }

    #[test]
    fn test_resolve_week_uses_week_calendar() {
        let dim = date_dimension(&DateDimensionConfig::default());
        let level = resolve_time_level(&dim, TimePeriod::Week).unwrap();
        assert_eq!(level.hierarchy, "Week Calendar");
        assert_eq!(level.level_ref(), "[Date Dimension].[Week Calendar].[Week]");
        assert_eq!(level.hierarchy_ref(), "[Date Dimension].[Week Calendar]");
    }

    #[test]
    fn test_resolve_month_uses_standard_calendar() {
        let dim = date_dimension(&DateDimensionConfig::default());
        let level = resolve_time_level(&dim, TimePeriod::Month).unwrap();
        assert_eq!(level.level_ref(), "[Date Dimension].[Standard Calendar].[Month]");
    }

    #[test]
    fn test_resolve_fails_without_time_units() {
        let dim = Dimension::new("customers", "Customers");
        assert!(resolve_time_level(&dim, TimePeriod::Day).is_none());
    }

    #[test]
    fn test_role_play_template() {
        assert_eq!(role_play("ordered_at"), "ordered_at {0}");
    }

    #[test]
    fn test_date_dataset_columns() {
        let dataset = date_dataset(&DateDimensionConfig::default(), "con");
        assert_eq!(dataset.columns.len(), 6);
        assert_eq!(
            dataset.column("date_day").map(|c| c.data_type),
            Some(ColumnType::DateTime)
        );
    }
}
