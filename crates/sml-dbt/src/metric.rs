//! Metric definitions
//!
//! dbt metrics come in five flavours that each carry a different
//! `type_params` block. They are represented as a tagged union so that the
//! converter can match on the kind instead of probing for optional keys.

use crate::error::DbtError;
use crate::serde_helpers::deserialize_filters;
use serde::{Deserialize, Serialize};

/// A time period used by granularities, windows and offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriod {
    Day,
    Week,
    Month,
    Quarter,
    HalfYear,
    Year,
}

impl TimePeriod {
    /// Parse a period name, accepting plurals and `half-year` spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Some(TimePeriod::Day),
            "week" | "weeks" => Some(TimePeriod::Week),
            "month" | "months" => Some(TimePeriod::Month),
            "quarter" | "quarters" => Some(TimePeriod::Quarter),
            "half_year" | "half_years" | "half-year" | "half-years" | "halfyear" => {
                Some(TimePeriod::HalfYear)
            }
            "year" | "years" => Some(TimePeriod::Year),
            _ => None,
        }
    }
}

impl std::fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimePeriod::Day => "day",
            TimePeriod::Week => "week",
            TimePeriod::Month => "month",
            TimePeriod::Quarter => "quarter",
            TimePeriod::HalfYear => "half_year",
            TimePeriod::Year => "year",
        };
        f.write_str(s)
    }
}

/// A `<count> <period>` window such as `1 month` or `7 days`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub count: u32,
    pub period: TimePeriod,
}

impl Window {
    /// Parse a window string. Returns `None` unless it is exactly a positive
    /// integer followed by a known period.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split_whitespace();
        let count = parts.next()?.parse::<u32>().ok()?;
        let period = TimePeriod::parse(parts.next()?)?;
        if parts.next().is_some() || count == 0 {
            return None;
        }
        Some(Window { count, period })
    }
}

/// Reference from a metric to a measure or to another metric.
///
/// dbt accepts either a bare name or a mapping with extra options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawMetricInput")]
pub struct MetricInput {
    pub name: String,
    pub alias: Option<String>,
    pub filter: Vec<String>,
    pub offset_window: Option<String>,
}

impl MetricInput {
    /// Plain reference by name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            filter: Vec::new(),
            offset_window: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMetricInput {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        alias: Option<String>,
        #[serde(default, deserialize_with = "deserialize_filters")]
        filter: Vec<String>,
        #[serde(default)]
        offset_window: Option<String>,
    },
}

impl From<RawMetricInput> for MetricInput {
    fn from(raw: RawMetricInput) -> Self {
        match raw {
            RawMetricInput::Name(name) => MetricInput::named(name),
            RawMetricInput::Detailed {
                name,
                alias,
                filter,
                offset_window,
            } => MetricInput {
                name,
                alias,
                filter,
                offset_window,
            },
        }
    }
}

/// Metric type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Simple,
    Ratio,
    Derived,
    Cumulative,
    Conversion,
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MetricType::Simple => "simple",
            MetricType::Ratio => "ratio",
            MetricType::Derived => "derived",
            MetricType::Cumulative => "cumulative",
            MetricType::Conversion => "conversion",
        };
        f.write_str(s)
    }
}

/// Kind-specific metric parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricKind {
    /// Aggregates one measure
    Simple { measure: Option<MetricInput> },
    /// Divides one metric by another
    Ratio {
        numerator: Option<MetricInput>,
        denominator: Option<MetricInput>,
    },
    /// Expression over other metrics
    Derived {
        expr: Option<String>,
        metrics: Vec<MetricInput>,
    },
    /// Running aggregate of a measure over a window or grain
    Cumulative {
        measure: Option<MetricInput>,
        window: Option<String>,
        grain_to_date: Option<String>,
    },
    /// Funnel conversion between two events
    Conversion,
}

impl MetricKind {
    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricKind::Simple { .. } => MetricType::Simple,
            MetricKind::Ratio { .. } => MetricType::Ratio,
            MetricKind::Derived { .. } => MetricType::Derived,
            MetricKind::Cumulative { .. } => MetricType::Cumulative,
            MetricKind::Conversion => MetricType::Conversion,
        }
    }

    /// Names of other metrics this metric is computed from
    pub fn metric_references(&self) -> Vec<&str> {
        match self {
            MetricKind::Ratio {
                numerator,
                denominator,
            } => numerator
                .iter()
                .chain(denominator.iter())
                .map(|m| m.name.as_str())
                .collect(),
            MetricKind::Derived { metrics, .. } => metrics.iter().map(|m| m.name.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Name of the measure aggregated by simple and cumulative metrics
    pub fn measure_name(&self) -> Option<&str> {
        match self {
            MetricKind::Simple { measure } | MetricKind::Cumulative { measure, .. } => {
                measure.as_ref().map(|m| m.name.as_str())
            }
            _ => None,
        }
    }
}

/// A dbt metric
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawMetric")]
pub struct Metric {
    pub name: String,
    pub label: Option<String>,
    pub description: Option<String>,
    /// Metric-level `filter`, normalized to a list
    pub filter: Vec<String>,
    /// Display folder from `config.meta.folder`
    pub folder: Option<String>,
    pub kind: MetricKind,
}

impl Metric {
    pub fn metric_type(&self) -> MetricType {
        self.kind.metric_type()
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawTypeParams {
    #[serde(default)]
    measure: Option<MetricInput>,
    #[serde(default)]
    numerator: Option<MetricInput>,
    #[serde(default)]
    denominator: Option<MetricInput>,
    #[serde(default)]
    expr: Option<String>,
    #[serde(default)]
    metrics: Vec<MetricInput>,
    #[serde(default)]
    window: Option<String>,
    #[serde(default)]
    grain_to_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetricMeta {
    #[serde(default)]
    folder: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetricConfig {
    #[serde(default)]
    meta: RawMetricMeta,
}

/// Raw YAML structure for a metric entry
#[derive(Debug, Deserialize)]
struct RawMetric {
    name: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type", default)]
    metric_type: Option<MetricType>,
    #[serde(default)]
    type_params: RawTypeParams,
    #[serde(default, deserialize_with = "deserialize_filters")]
    filter: Vec<String>,
    #[serde(default)]
    config: RawMetricConfig,
    #[serde(default)]
    meta: Option<RawMetricMeta>,
}

impl TryFrom<RawMetric> for Metric {
    type Error = DbtError;

    fn try_from(raw: RawMetric) -> Result<Self, Self::Error> {
        let Some(metric_type) = raw.metric_type else {
            return Err(DbtError::InvalidMetric {
                name: raw.name,
                reason: "missing required field `type`".to_string(),
            });
        };

        let params = raw.type_params;
        let kind = match metric_type {
            MetricType::Simple => MetricKind::Simple {
                measure: params.measure,
            },
            MetricType::Ratio => MetricKind::Ratio {
                numerator: params.numerator,
                denominator: params.denominator,
            },
            MetricType::Derived => MetricKind::Derived {
                expr: params.expr,
                metrics: params.metrics,
            },
            MetricType::Cumulative => MetricKind::Cumulative {
                measure: params.measure,
                window: params.window,
                grain_to_date: params.grain_to_date,
            },
            MetricType::Conversion => MetricKind::Conversion,
        };

        let folder = raw
            .config
            .meta
            .folder
            .or_else(|| raw.meta.and_then(|m| m.folder));

        Ok(Metric {
            name: raw.name,
            label: raw.label,
            description: raw.description,
            filter: raw.filter,
            folder,
            kind,
        })
    }
}

#[cfg(test)]
#[path = "metric_test.rs"]
mod tests;
