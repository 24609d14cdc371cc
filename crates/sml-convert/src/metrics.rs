//! Metric compilation
//!
//! Each dbt metric becomes either a column-backed [`Measure`] or an
//! expression-backed [`CalculatedMeasure`]. Anything that cannot be
//! expressed is rejected: the metric is recorded as removed, one warning is
//! logged, and the run continues. References to removed metrics are cleaned
//! up afterwards by the cascade pass.

use crate::convert::Converter;
use crate::error::ConvertResult;
use crate::expression::{measure_ref, substitute_identifiers};
use crate::metric_dag::MetricDag;
use crate::report::WarningKind;
use crate::time_dimension::{resolve_time_level, TimeLevelRef};
use regex::Regex;
use sml_core::{CalculatedMeasure, CalculationMethod, Measure, MetricReference, ObjectType};
use sml_dbt::{Aggregation, Metric, MetricInput, MetricKind, SemanticModel, TimePeriod, Window};
use std::collections::HashMap;
use std::sync::OnceLock;

/// What a metric compiled to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledMetric {
    Measure(String),
    Calculated(String),
}

impl CompiledMetric {
    pub fn name(&self) -> &str {
        match self {
            CompiledMetric::Measure(name) | CompiledMetric::Calculated(name) => name,
        }
    }
}

/// Result of compiling one metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Compiled(CompiledMetric),
    Rejected,
}

/// Why a metric could not be compiled
struct Rejection {
    kind: WarningKind,
    message: String,
}

impl Rejection {
    fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

type CompileResult<T> = Result<T, Rejection>;

/// Aggregation for a dbt measure, if the target supports it
pub fn calculation_method(agg: Aggregation) -> Option<CalculationMethod> {
    match agg {
        Aggregation::Sum | Aggregation::SumBoolean => Some(CalculationMethod::Sum),
        Aggregation::Count => Some(CalculationMethod::CountNonNull),
        Aggregation::CountDistinct => Some(CalculationMethod::CountDistinct),
        Aggregation::Average => Some(CalculationMethod::Average),
        Aggregation::Min => Some(CalculationMethod::Minimum),
        Aggregation::Max => Some(CalculationMethod::Maximum),
        Aggregation::Median | Aggregation::Percentile => None,
    }
}

static FILTER_PATTERN: OnceLock<Regex> = OnceLock::new();

fn filter_regex() -> &'static Regex {
    FILTER_PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)^\s*\{\{\s*dimension\(\s*['"]([A-Za-z0-9_]+)['"]\s*\)\s*\}\}(.*)$"#)
            .expect("valid regex literal")
    })
}

/// A filter of the form `{{ Dimension('entity__attribute') }} <predicate>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionFilter {
    /// Semantic model or entity name before `__`
    pub prefix: String,
    pub attribute: String,
    /// Comparison text following the dimension reference
    pub predicate: String,
}

/// Parse a single-dimension filter. Anything else yields `None`.
pub fn parse_filter(filter: &str) -> Option<DimensionFilter> {
    let caps = filter_regex().captures(filter)?;
    let reference = caps.get(1)?.as_str();
    let predicate = caps.get(2)?.as_str().trim();
    let (prefix, attribute) = reference.split_once("__")?;
    if prefix.is_empty() || attribute.is_empty() || predicate.is_empty() || predicate.contains("{{")
    {
        return None;
    }
    Some(DimensionFilter {
        prefix: prefix.to_string(),
        attribute: attribute.to_string(),
        predicate: predicate.to_string(),
    })
}

/// Period-over-period expression for an offset sub-metric
pub fn parallel_period_expression(level: &TimeLevelRef, count: u32, measure: &str) -> String {
    format!(
        "(ParallelPeriod({}, {}, {}.CurrentMember), {})",
        level.level_ref(),
        count,
        level.hierarchy_ref(),
        measure_ref(measure)
    )
}

/// Period-to-date aggregate for a cumulative metric
pub fn periods_to_date_expression(level: &TimeLevelRef, measure: &str) -> String {
    format!(
        "Aggregate(PeriodsToDate({}, {}.CurrentMember), {})",
        level.level_ref(),
        level.hierarchy_ref(),
        measure_ref(measure)
    )
}

fn fill_description(target: &mut Option<String>, description: &Option<String>) {
    if target.is_none() {
        target.clone_from(description);
    }
}

impl Converter<'_> {
    /// Compile every metric in dependency order
    pub(crate) fn compile_metrics(&mut self) -> ConvertResult<()> {
        let index = self.index;
        let dag = MetricDag::build(&index.metrics);

        for name in dag.cyclic_metrics() {
            self.reject(
                &name,
                Rejection::new(
                    WarningKind::ReferenceCycle,
                    "metric takes part in a reference cycle",
                ),
            );
        }
        for name in dag.compile_order() {
            self.compile_metric(&name)?;
        }
        Ok(())
    }

    fn reject(&mut self, name: &str, rejection: Rejection) {
        if self.removed.insert(name.to_string()) {
            self.warn(name, rejection.kind, rejection.message);
        }
    }

    /// Whether a measure or calculated measure with this name exists
    fn measure_exists(&self, name: &str) -> bool {
        self.builder.contains(name, ObjectType::Metric)
            || self.builder.contains(name, ObjectType::MetricCalc)
    }

    /// Compile a metric by name.
    ///
    /// Compiling an already-compiled metric merges its description into the
    /// existing object and returns it unchanged. A metric whose name is held
    /// by an object some other metric produced is rejected.
    pub(crate) fn compile_metric(&mut self, name: &str) -> ConvertResult<Outcome> {
        let index = self.index;
        let Some(metric) = index.metric(name) else {
            return Ok(Outcome::Rejected);
        };
        if self.removed.contains(name) {
            return Ok(Outcome::Rejected);
        }

        if self.compiled.contains(name) {
            if let Some(measure) = self.builder.measure_mut(name) {
                fill_description(&mut measure.description, &metric.description);
                return Ok(Outcome::Compiled(CompiledMetric::Measure(name.to_string())));
            }
            if let Some(measure) = self.builder.calculated_measure_mut(name) {
                fill_description(&mut measure.description, &metric.description);
                return Ok(Outcome::Compiled(CompiledMetric::Calculated(name.to_string())));
            }
        }
        if self.measure_exists(name) {
            self.reject(
                name,
                Rejection::new(
                    WarningKind::NameCollision,
                    format!("'{}' is already taken by another measure", name),
                ),
            );
            return Ok(Outcome::Rejected);
        }

        if !self.in_progress.insert(name.to_string()) {
            self.reject(
                name,
                Rejection::new(WarningKind::ReferenceCycle, "metric references itself"),
            );
            return Ok(Outcome::Rejected);
        }
        let result = match &metric.kind {
            MetricKind::Simple { measure } => self.compile_simple(metric, measure.as_ref()),
            MetricKind::Ratio {
                numerator,
                denominator,
            } => self.compile_ratio(metric, numerator.as_ref(), denominator.as_ref()),
            MetricKind::Derived { expr, metrics } => {
                self.compile_derived(metric, expr.as_deref(), metrics)
            }
            MetricKind::Cumulative {
                measure,
                window,
                grain_to_date,
            } => self.compile_cumulative(
                metric,
                measure.as_ref(),
                window.as_deref(),
                grain_to_date.as_deref(),
            ),
            MetricKind::Conversion => Ok(Err(Rejection::new(
                WarningKind::UnsupportedMetricType,
                "conversion metrics are not supported",
            ))),
        };
        self.in_progress.remove(name);

        match result? {
            Ok(compiled) => {
                self.compiled.insert(name.to_string());
                if !self.model.has_metric(name) {
                    self.model.metrics.push(MetricReference {
                        unique_name: name.to_string(),
                        folder: metric.folder.clone(),
                    });
                }
                Ok(Outcome::Compiled(compiled))
            }
            Err(rejection) => {
                self.reject(name, rejection);
                Ok(Outcome::Rejected)
            }
        }
    }

    fn compile_simple(
        &mut self,
        metric: &Metric,
        input: Option<&MetricInput>,
    ) -> ConvertResult<CompileResult<CompiledMetric>> {
        let Some(input) = input else {
            return Ok(Err(Rejection::new(
                WarningKind::MissingField,
                "simple metric has no measure",
            )));
        };
        let index = self.index;
        let Some((model, dbt_measure)) = index.find_measure(&input.name) else {
            return Ok(Err(Rejection::new(
                WarningKind::UnresolvedReference,
                format!("measure '{}' does not exist", input.name),
            )));
        };
        let (Some(dataset), Some(column)) = (
            self.dataset_of(&model.name).map(str::to_string),
            self.column_of(&model.name, &dbt_measure.name).map(str::to_string),
        ) else {
            return Ok(Err(Rejection::new(
                WarningKind::UnresolvedReference,
                format!("semantic model '{}' has no dataset", model.name),
            )));
        };
        let agg = dbt_measure.aggregation();
        let Some(method) = calculation_method(agg) else {
            return Ok(Err(Rejection::new(
                WarningKind::UnsupportedAggregation,
                format!("aggregation '{}' is not supported", agg),
            )));
        };

        let filters: Vec<&String> = metric.filter.iter().chain(input.filter.iter()).collect();
        let column = match filters.as_slice() {
            [] => column,
            [filter] => match self.filtered_column(model, &dataset, &column, filter) {
                Ok(column) => column,
                Err(rejection) => return Ok(Err(rejection)),
            },
            _ => {
                return Ok(Err(Rejection::new(
                    WarningKind::UnsupportedFilter,
                    "only a single filter is supported",
                )))
            }
        };

        let mut measure = Measure::new(&metric.name, dataset, column, method);
        measure.label = metric.label.clone().unwrap_or_else(|| metric.name.clone());
        measure.description = metric.description.clone();
        self.builder.add_measure(measure)?;
        Ok(Ok(CompiledMetric::Measure(metric.name.clone())))
    }

    /// Calculated column applying `filter` to a measure column
    fn filtered_column(
        &mut self,
        model: &SemanticModel,
        dataset: &str,
        column: &str,
        filter: &str,
    ) -> CompileResult<String> {
        let Some(parsed) = parse_filter(filter) else {
            return Err(Rejection::new(
                WarningKind::UnsupportedFilter,
                format!(
                    "filter '{}' is not a single {{{{ Dimension('entity__attribute') }}}} comparison",
                    filter
                ),
            ));
        };

        let index = self.index;
        let owner = index.semantic_models.iter().find(|m| {
            (m.name == parsed.prefix || m.entity(&parsed.prefix).is_some())
                && m.dimension(&parsed.attribute).is_some()
        });
        let Some(owner) = owner else {
            return Err(Rejection::new(
                WarningKind::UnsupportedFilter,
                format!(
                    "filter dimension '{}__{}' does not exist",
                    parsed.prefix, parsed.attribute
                ),
            ));
        };
        if self.dataset_of(&owner.name) != Some(dataset) {
            return Err(Rejection::new(
                WarningKind::CrossDatasetFilter,
                format!(
                    "filter dimension '{}__{}' is not on the same dataset as '{}'",
                    parsed.prefix, parsed.attribute, model.name
                ),
            ));
        }

        let (Some(dimension_sql), Some(measure_sql), Some(data_type)) = (
            self.field_expression(&owner.name, &parsed.attribute),
            self.builder
                .dataset(dataset)
                .and_then(|d| d.column(column))
                .map(|c| c.expression().to_string()),
            self.builder
                .dataset(dataset)
                .and_then(|d| d.column(column))
                .map(|c| c.data_type),
        ) else {
            return Err(Rejection::new(
                WarningKind::UnresolvedReference,
                format!("column for '{}' is missing", parsed.attribute),
            ));
        };

        let sql = format!(
            "CASE WHEN {} {} THEN {} ELSE NULL END",
            dimension_sql, parsed.predicate, measure_sql
        );
        self.builder
            .dataset_mut(dataset)
            .and_then(|d| d.get_or_create_calculated_column(&sql, data_type))
            .ok_or_else(|| {
                Rejection::new(
                    WarningKind::ColumnAllocation,
                    format!("no calculated column name left on dataset '{}'", dataset),
                )
            })
    }

    /// Measure reference for a ratio or derived input: a metric (compiled on
    /// demand) or a plain dbt measure
    fn resolve_reference(&mut self, name: &str) -> ConvertResult<CompileResult<String>> {
        if self.index.metric(name).is_some() {
            // a rejected metric still yields its reference; the cascade pass
            // removes whatever ends up pointing at it
            self.compile_metric(name)?;
            return Ok(Ok(measure_ref(name)));
        }
        Ok(self.ensure_measure(name).map(|m| measure_ref(&m)))
    }

    fn compile_ratio(
        &mut self,
        metric: &Metric,
        numerator: Option<&MetricInput>,
        denominator: Option<&MetricInput>,
    ) -> ConvertResult<CompileResult<CompiledMetric>> {
        let (Some(numerator), Some(denominator)) = (numerator, denominator) else {
            return Ok(Err(Rejection::new(
                WarningKind::MissingField,
                "ratio metric needs both numerator and denominator",
            )));
        };
        let filtered = !metric.filter.is_empty()
            || !numerator.filter.is_empty()
            || !denominator.filter.is_empty();
        if filtered {
            return Ok(Err(Rejection::new(
                WarningKind::UnsupportedFilter,
                "filters on ratio metrics are not supported",
            )));
        }

        let numerator = match self.resolve_reference(&numerator.name)? {
            Ok(r) => r,
            Err(rejection) => return Ok(Err(rejection)),
        };
        let denominator = match self.resolve_reference(&denominator.name)? {
            Ok(r) => r,
            Err(rejection) => return Ok(Err(rejection)),
        };

        let expression = format!("{} / {}", numerator, denominator);
        self.add_calculated(metric, expression)
    }

    fn compile_derived(
        &mut self,
        metric: &Metric,
        expr: Option<&str>,
        inputs: &[MetricInput],
    ) -> ConvertResult<CompileResult<CompiledMetric>> {
        let Some(expr) = expr.filter(|e| !e.trim().is_empty()) else {
            return Ok(Err(Rejection::new(
                WarningKind::MissingField,
                "derived metric has no expression",
            )));
        };
        if !metric.filter.is_empty() || inputs.iter().any(|i| !i.filter.is_empty()) {
            return Ok(Err(Rejection::new(
                WarningKind::UnsupportedFilter,
                "filters on derived metrics are not supported",
            )));
        }

        let mut replacements = HashMap::new();
        for input in inputs {
            if input.offset_window.is_some() {
                if let Some((alias, reference)) = self.offset_input(metric, input)? {
                    replacements.insert(alias, reference);
                }
                continue;
            }
            let reference = match self.resolve_reference(&input.name)? {
                Ok(r) => r,
                Err(rejection) => return Ok(Err(rejection)),
            };
            let token = input.alias.clone().unwrap_or_else(|| input.name.clone());
            replacements.insert(token, reference);
        }

        let expression = substitute_identifiers(expr, &replacements);
        self.add_calculated(metric, expression)
    }

    /// Calculated measure shifting a sub-metric by its offset window.
    ///
    /// Failures skip the sub-metric with a warning against the outer metric;
    /// the outer expression keeps the unsubstituted alias.
    fn offset_input(
        &mut self,
        metric: &Metric,
        input: &MetricInput,
    ) -> ConvertResult<Option<(String, String)>> {
        let window_text = input.offset_window.as_deref().unwrap_or_default();
        let Some(alias) = input.alias.clone() else {
            self.warn(
                &metric.name,
                WarningKind::MissingAlias,
                format!(
                    "offset input '{}' needs an alias; left unresolved",
                    input.name
                ),
            );
            return Ok(None);
        };
        if self.index.metric(&alias).is_some() {
            self.warn(
                &metric.name,
                WarningKind::NameCollision,
                format!("offset alias '{}' is the name of another metric", alias),
            );
            return Ok(None);
        }
        let Some(window) = Window::parse(window_text) else {
            self.warn(
                &metric.name,
                WarningKind::UnsupportedWindow,
                format!("offset window '{}' on '{}' cannot be parsed", window_text, alias),
            );
            return Ok(None);
        };
        let Some(level) = self.resolve_time_level(window.period) else {
            self.warn(
                &metric.name,
                WarningKind::UnresolvedTimeLevel,
                format!(
                    "no time level for period '{}' needed by '{}'",
                    window.period, alias
                ),
            );
            return Ok(None);
        };

        let expression = parallel_period_expression(&level, window.count, &input.name);
        let reference = measure_ref(&alias);
        if let Some(existing) = self.builder.calculated_measure(&alias) {
            if existing.expression == expression {
                return Ok(Some((alias, reference)));
            }
        }
        if self.measure_exists(&alias) {
            self.warn(
                &metric.name,
                WarningKind::NameCollision,
                format!("offset alias '{}' is already a metric name", alias),
            );
            return Ok(None);
        }
        if let Err(rejection) = self.resolve_reference(&input.name)? {
            self.warn(&metric.name, rejection.kind, rejection.message);
            return Ok(None);
        }

        self.builder
            .add_calculated_measure(CalculatedMeasure::new(&alias, expression))?;
        self.model.metrics.push(MetricReference {
            unique_name: alias.clone(),
            folder: metric.folder.clone(),
        });
        Ok(Some((alias, reference)))
    }

    fn compile_cumulative(
        &mut self,
        metric: &Metric,
        input: Option<&MetricInput>,
        window: Option<&str>,
        grain_to_date: Option<&str>,
    ) -> ConvertResult<CompileResult<CompiledMetric>> {
        let Some(input) = input else {
            return Ok(Err(Rejection::new(
                WarningKind::MissingField,
                "cumulative metric has no measure",
            )));
        };
        if !metric.filter.is_empty() || !input.filter.is_empty() {
            return Ok(Err(Rejection::new(
                WarningKind::UnsupportedFilter,
                "filters on cumulative metrics are not supported",
            )));
        }

        let period = match (window, grain_to_date) {
            (Some(window), _) => match Window::parse(window) {
                Some(w) if w.count == 1 => w.period,
                Some(_) => {
                    return Ok(Err(Rejection::new(
                        WarningKind::UnsupportedWindow,
                        format!("window '{}' spans more than one period", window),
                    )))
                }
                None => {
                    return Ok(Err(Rejection::new(
                        WarningKind::UnsupportedWindow,
                        format!("window '{}' cannot be parsed", window),
                    )))
                }
            },
            (None, Some(grain)) => match TimePeriod::parse(grain) {
                Some(period) => period,
                None => {
                    return Ok(Err(Rejection::new(
                        WarningKind::UnsupportedWindow,
                        format!("grain_to_date '{}' cannot be parsed", grain),
                    )))
                }
            },
            (None, None) => {
                return Ok(Err(Rejection::new(
                    WarningKind::UnsupportedWindow,
                    "unbounded cumulative metrics are not supported",
                )))
            }
        };

        let Some(level) = self.resolve_time_level(period) else {
            return Ok(Err(Rejection::new(
                WarningKind::UnresolvedTimeLevel,
                format!("no time level for period '{}'", period),
            )));
        };
        if input.name == metric.name {
            return Ok(Err(Rejection::new(
                WarningKind::NameCollision,
                format!(
                    "cumulative metric shares its name with measure '{}'",
                    input.name
                ),
            )));
        }
        let measure = match self.ensure_measure(&input.name) {
            Ok(m) => m,
            Err(rejection) => return Ok(Err(rejection)),
        };

        let expression = periods_to_date_expression(&level, &measure);
        self.add_calculated(metric, expression)
    }

    /// Column-backed measure named after a dbt measure, created on demand
    fn ensure_measure(&mut self, name: &str) -> CompileResult<String> {
        let index = self.index;
        let Some((model, dbt_measure)) = index.find_measure(name) else {
            return Err(Rejection::new(
                WarningKind::UnresolvedReference,
                format!("'{}' is neither a metric nor a measure", name),
            ));
        };
        let (Some(dataset), Some(column)) = (
            self.dataset_of(&model.name).map(str::to_string),
            self.column_of(&model.name, &dbt_measure.name).map(str::to_string),
        ) else {
            return Err(Rejection::new(
                WarningKind::UnresolvedReference,
                format!("semantic model '{}' has no dataset", model.name),
            ));
        };

        if let Some(existing) = self.builder.measure(name) {
            if existing.dataset == dataset && existing.column == column {
                return Ok(name.to_string());
            }
            return Err(Rejection::new(
                WarningKind::NameCollision,
                format!("measure '{}' already exists with a different column", name),
            ));
        }
        if self.builder.contains(name, ObjectType::MetricCalc) {
            return Err(Rejection::new(
                WarningKind::NameCollision,
                format!("'{}' is already a calculated measure", name),
            ));
        }

        let agg = dbt_measure.aggregation();
        let Some(method) = calculation_method(agg) else {
            return Err(Rejection::new(
                WarningKind::UnsupportedAggregation,
                format!("aggregation '{}' of measure '{}' is not supported", agg, name),
            ));
        };
        let mut measure = Measure::new(name, dataset, column, method);
        if let Some(label) = &dbt_measure.label {
            measure.label = label.clone();
        }
        measure.description = dbt_measure.description.clone();
        if self.builder.add_measure(measure).is_err() {
            return Err(Rejection::new(
                WarningKind::NameCollision,
                format!("measure '{}' cannot be added", name),
            ));
        }
        self.model.metrics.push(MetricReference {
            unique_name: name.to_string(),
            folder: None,
        });
        Ok(name.to_string())
    }

    fn add_calculated(
        &mut self,
        metric: &Metric,
        expression: String,
    ) -> ConvertResult<CompileResult<CompiledMetric>> {
        if self.builder.contains(&metric.name, ObjectType::Metric) {
            return Ok(Err(Rejection::new(
                WarningKind::NameCollision,
                format!("a measure named '{}' already exists", metric.name),
            )));
        }
        let mut measure = CalculatedMeasure::new(&metric.name, expression);
        measure.label = metric.label.clone().unwrap_or_else(|| metric.name.clone());
        measure.description = metric.description.clone();
        self.builder.add_calculated_measure(measure)?;
        Ok(Ok(CompiledMetric::Calculated(metric.name.clone())))
    }

    /// Level on the shared date dimension for a period
    fn resolve_time_level(&self, period: TimePeriod) -> Option<TimeLevelRef> {
        self.builder
            .dimension(&self.config.date_dimension.name)
            .and_then(|d| resolve_time_level(d, period))
    }
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod tests;
