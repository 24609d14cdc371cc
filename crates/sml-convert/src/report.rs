//! Recoverable conversion problems
//!
//! Anything that makes the converter skip an object is recorded here as a
//! [`ConversionWarning`] and also logged through `log::warn!`. The report is
//! returned next to the finished graph so callers can list what was dropped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Why an object was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Semantic model `model` does not resolve to a table
    UnresolvedTable,
    /// Metric type the target cannot express
    UnsupportedMetricType,
    /// Measure aggregation the target cannot express
    UnsupportedAggregation,
    /// Filter outside the single-dimension template
    UnsupportedFilter,
    /// Filter dimension lives on another dataset
    CrossDatasetFilter,
    /// Time attribute granularity other than day
    UnsupportedGranularity,
    /// Cumulative or offset window that cannot be mapped
    UnsupportedWindow,
    /// Required metric parameter is missing
    MissingField,
    /// Reference to a measure or metric that does not exist
    UnresolvedReference,
    /// No time level matches the requested period
    UnresolvedTimeLevel,
    /// Offset sub-metric without an alias
    MissingAlias,
    /// Calculated column names exhausted
    ColumnAllocation,
    /// Attribute name already used by another dimension
    AttributeCollision,
    /// Object name already taken in the graph
    NameCollision,
    /// Metric takes part in a reference cycle
    ReferenceCycle,
    /// Removed because it referenced a removed metric
    CascadeRemoval,
}

impl WarningKind {
    /// Stable code shown in log lines
    pub fn code(&self) -> &'static str {
        match self {
            WarningKind::UnresolvedTable => "W001",
            WarningKind::UnsupportedMetricType => "W002",
            WarningKind::UnsupportedAggregation => "W003",
            WarningKind::UnsupportedFilter => "W004",
            WarningKind::CrossDatasetFilter => "W005",
            WarningKind::UnsupportedGranularity => "W006",
            WarningKind::UnsupportedWindow => "W007",
            WarningKind::MissingField => "W008",
            WarningKind::UnresolvedReference => "W009",
            WarningKind::UnresolvedTimeLevel => "W010",
            WarningKind::MissingAlias => "W011",
            WarningKind::ColumnAllocation => "W012",
            WarningKind::AttributeCollision => "W013",
            WarningKind::NameCollision => "W014",
            WarningKind::ReferenceCycle => "W015",
            WarningKind::CascadeRemoval => "W016",
        }
    }
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WarningKind::UnresolvedTable => "unresolved table",
            WarningKind::UnsupportedMetricType => "unsupported metric type",
            WarningKind::UnsupportedAggregation => "unsupported aggregation",
            WarningKind::UnsupportedFilter => "unsupported filter",
            WarningKind::CrossDatasetFilter => "cross-dataset filter",
            WarningKind::UnsupportedGranularity => "unsupported granularity",
            WarningKind::UnsupportedWindow => "unsupported window",
            WarningKind::MissingField => "missing field",
            WarningKind::UnresolvedReference => "unresolved reference",
            WarningKind::UnresolvedTimeLevel => "unresolved time level",
            WarningKind::MissingAlias => "missing alias",
            WarningKind::ColumnAllocation => "column allocation",
            WarningKind::AttributeCollision => "attribute collision",
            WarningKind::NameCollision => "name collision",
            WarningKind::ReferenceCycle => "reference cycle",
            WarningKind::CascadeRemoval => "cascade removal",
        };
        f.write_str(s)
    }
}

/// One skipped object and the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionWarning {
    /// Name of the skipped metric, attribute or semantic model
    pub object: String,
    pub kind: WarningKind,
    pub message: String,
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} '{}': {}",
            self.kind.code(),
            self.kind,
            self.object,
            self.message
        )
    }
}

/// Warnings and removals collected over one conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub warnings: Vec<ConversionWarning>,

    /// Every metric that did not make it into the graph, cascades included
    pub removed_metrics: BTreeSet<String>,
}

impl ConversionReport {
    /// Record and log a warning
    pub fn warn(&mut self, object: impl Into<String>, kind: WarningKind, message: impl Into<String>) {
        let warning = ConversionWarning {
            object: object.into(),
            kind,
            message: message.into(),
        };
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Warnings recorded against one object
    pub fn warnings_for<'a>(&'a self, object: &'a str) -> impl Iterator<Item = &'a ConversionWarning> {
        self.warnings.iter().filter(move |w| w.object == object)
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_records_and_filters_by_object() {
        let mut report = ConversionReport::default();
        report.warn("ltv", WarningKind::UnsupportedMetricType, "conversion metrics are not supported");
        report.warn("rev", WarningKind::UnsupportedFilter, "bad filter");

        assert_eq!(report.warnings_for("ltv").count(), 1);
        assert_eq!(report.warnings_for("missing").count(), 0);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_warning_display_includes_code() {
        let warning = ConversionWarning {
            object: "orders_filtered".to_string(),
            kind: WarningKind::UnsupportedFilter,
            message: "filter must be a single dimension reference".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "[W004] unsupported filter 'orders_filtered': filter must be a single dimension reference"
        );
    }
}
