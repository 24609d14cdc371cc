//! Conversion entry point
//!
//! [`convert`] runs the passes in order: fatal checks, catalog and
//! connection, datasets, relationships and dimensions, metrics, the model,
//! then the cascade and case passes over the finished graph.

use crate::cascade::cascade_removals;
use crate::case::normalize_case;
use crate::config::ConvertConfig;
use crate::error::{ConvertError, ConvertResult};
use crate::report::{ConversionReport, WarningKind};
use sml_core::{Catalog, Connection, Model, SmlGraph, SmlGraphBuilder};
use sml_dbt::DbtIndex;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub graph: SmlGraph,
    pub report: ConversionReport,
}

/// State shared by the conversion passes of one run
pub(crate) struct Converter<'a> {
    pub(crate) index: &'a DbtIndex,
    pub(crate) config: &'a ConvertConfig,
    pub(crate) builder: SmlGraphBuilder,
    pub(crate) report: ConversionReport,

    /// Relationships and exposed references, added to the graph last
    pub(crate) model: Model,

    /// Semantic model name -> dataset name
    pub(crate) dataset_by_model: HashMap<String, String>,

    /// (semantic model, field) -> column name on its dataset
    pub(crate) field_columns: HashMap<(String, String), String>,

    /// (semantic model, dimension attribute) pairs exposed through a
    /// foreign-key dimension
    pub(crate) linked_attributes: HashSet<(String, String)>,

    /// Metrics rejected so far
    pub(crate) removed: BTreeSet<String>,

    /// Metrics currently being compiled
    pub(crate) in_progress: HashSet<String>,

    /// Metrics compiled so far, each owning the object of its name
    pub(crate) compiled: HashSet<String>,
}

impl<'a> Converter<'a> {
    pub(crate) fn new(index: &'a DbtIndex, config: &'a ConvertConfig) -> Self {
        let model_name = config
            .model_name
            .clone()
            .unwrap_or_else(|| index.project.name.clone());
        let model = Model::new(&model_name, &model_name);
        Self {
            index,
            config,
            builder: SmlGraphBuilder::new(),
            report: ConversionReport::default(),
            model,
            dataset_by_model: HashMap::new(),
            field_columns: HashMap::new(),
            linked_attributes: HashSet::new(),
            removed: BTreeSet::new(),
            in_progress: HashSet::new(),
            compiled: HashSet::new(),
        }
    }

    /// Dataset name of a semantic model
    pub(crate) fn dataset_of(&self, semantic_model: &str) -> Option<&str> {
        self.dataset_by_model.get(semantic_model).map(String::as_str)
    }

    /// Column name of a field on a semantic model
    pub(crate) fn column_of(&self, semantic_model: &str, field: &str) -> Option<&str> {
        self.field_columns
            .get(&(semantic_model.to_string(), field.to_string()))
            .map(String::as_str)
    }

    /// Record a warning against an object
    pub(crate) fn warn(&mut self, object: &str, kind: WarningKind, message: impl Into<String>) {
        self.report.warn(object, kind, message);
    }

    fn add_catalog_and_connection(&mut self) -> ConvertResult<()> {
        let project = &self.index.project.name;
        let name = self.config.catalog_name.as_deref().unwrap_or(project);
        self.builder.set_catalog(Catalog::new(name, project))?;
        self.builder.add_connection(Connection::new(
            &self.config.connection_id,
            &self.config.database,
            &self.config.schema,
        ))?;
        Ok(())
    }

    fn finish(mut self) -> ConvertResult<ConversionOutput> {
        self.builder.add_model(self.model)?;
        let graph = self.builder.build()?;

        let outcome = cascade_removals(graph, &self.removed);
        let mut report = self.report;
        for removal in &outcome.cascaded {
            report.warn(
                &removal.name,
                WarningKind::CascadeRemoval,
                format!("references removed metric '{}'", removal.referenced),
            );
        }
        report.removed_metrics = self.removed;
        report
            .removed_metrics
            .extend(outcome.cascaded.into_iter().map(|r| r.name));
        if !report.removed_metrics.is_empty() {
            log::info!("{} metrics removed", report.removed_metrics.len());
        }

        let mut graph = outcome.graph;
        if normalize_case(
            &mut graph,
            &self.config.warehouse,
            &self.index.project.quoting,
        ) {
            log::debug!("Upper-cased identifiers for {}", self.config.warehouse);
        }

        Ok(ConversionOutput { graph, report })
    }
}

/// Convert a dbt semantic layer into an SML object graph.
///
/// Fails fast on an unsupported warehouse, an index without semantic
/// models, an index where no semantic model resolves to a table, or a name
/// clash in the graph. Everything else is skipped with a warning in the
/// returned report.
pub fn convert(index: &DbtIndex, config: &ConvertConfig) -> ConvertResult<ConversionOutput> {
    if !config.warehouse.is_supported() {
        return Err(ConvertError::UnsupportedWarehouse {
            warehouse: config.warehouse.to_string(),
        });
    }
    if index.semantic_models.is_empty() {
        return Err(ConvertError::NoSemanticModels {
            project: index.project.name.clone(),
        });
    }

    let mut converter = Converter::new(index, config);
    converter.add_catalog_and_connection()?;

    converter.build_datasets()?;
    if converter.builder.datasets().is_empty() {
        return Err(ConvertError::NoDatasets {
            project: index.project.name.clone(),
        });
    }
    log::debug!("Built {} datasets", converter.builder.datasets().len());

    converter.resolve_relationships()?;
    log::debug!(
        "Resolved {} relationships and {} dimensions",
        converter.model.relationships.len(),
        converter.builder.dimensions().len()
    );

    converter.compile_metrics()?;
    log::debug!("Compiled {} metrics", converter.model.metrics.len());

    converter.finish()
}

#[cfg(test)]
#[path = "convert_test.rs"]
mod tests;
