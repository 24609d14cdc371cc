//! Result accumulator and the finished object graph
//!
//! [`SmlGraphBuilder`] is owned by a single conversion run. Every `add_*`
//! call checks the `(unique_name, object_type)` pair against all collections
//! at once, so the builder can never hold two objects that would collide in
//! the downstream namespace. [`SmlGraphBuilder::build`] hands the collections
//! over as an [`SmlGraph`].

use crate::catalog::{Catalog, Connection};
use crate::dataset::Dataset;
use crate::dimension::Dimension;
use crate::error::{SmlError, SmlResult};
use crate::measure::{CalculatedMeasure, Measure};
use crate::model::Model;
use crate::object::{ObjectType, SmlObject};
use serde::{Deserialize, Serialize};

fn chain_objects<'a>(
    catalog: Option<&'a Catalog>,
    connections: &'a [Connection],
    datasets: &'a [Dataset],
    dimensions: &'a [Dimension],
    measures: &'a [Measure],
    measures_calculated: &'a [CalculatedMeasure],
    models: &'a [Model],
) -> impl Iterator<Item = &'a dyn SmlObject> + 'a {
    catalog
        .into_iter()
        .map(|o| o as &dyn SmlObject)
        .chain(connections.iter().map(|o| o as &dyn SmlObject))
        .chain(datasets.iter().map(|o| o as &dyn SmlObject))
        .chain(dimensions.iter().map(|o| o as &dyn SmlObject))
        .chain(measures.iter().map(|o| o as &dyn SmlObject))
        .chain(measures_calculated.iter().map(|o| o as &dyn SmlObject))
        .chain(models.iter().map(|o| o as &dyn SmlObject))
}

/// Append-only accumulator for one conversion run
#[derive(Debug, Default)]
pub struct SmlGraphBuilder {
    catalog: Option<Catalog>,
    connections: Vec<Connection>,
    datasets: Vec<Dataset>,
    dimensions: Vec<Dimension>,
    measures: Vec<Measure>,
    measures_calculated: Vec<CalculatedMeasure>,
    models: Vec<Model>,
}

impl SmlGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every object added so far
    pub fn objects(&self) -> impl Iterator<Item = &dyn SmlObject> + '_ {
        chain_objects(
            self.catalog.as_ref(),
            &self.connections,
            &self.datasets,
            &self.dimensions,
            &self.measures,
            &self.measures_calculated,
            &self.models,
        )
    }

    /// Whether an object with this name and type exists anywhere in the graph
    pub fn contains(&self, name: &str, object_type: ObjectType) -> bool {
        self.objects()
            .any(|o| o.unique_name() == name && o.object_type() == object_type)
    }

    fn ensure_unique(&self, object: &dyn SmlObject) -> SmlResult<()> {
        if self.contains(object.unique_name(), object.object_type()) {
            return Err(SmlError::DuplicateName {
                name: object.unique_name().to_string(),
                object_type: object.object_type(),
            });
        }
        Ok(())
    }

    /// Set the catalog. Fails if a catalog is already present.
    pub fn set_catalog(&mut self, catalog: Catalog) -> SmlResult<()> {
        if let Some(existing) = &self.catalog {
            return Err(SmlError::CatalogAlreadySet {
                existing: existing.unique_name.clone(),
            });
        }
        self.ensure_unique(&catalog)?;
        self.catalog = Some(catalog);
        Ok(())
    }

    /// Read the catalog. Fails if it was never set.
    pub fn catalog(&self) -> SmlResult<&Catalog> {
        self.catalog.as_ref().ok_or(SmlError::CatalogNotSet)
    }

    pub fn add_connection(&mut self, connection: Connection) -> SmlResult<()> {
        self.ensure_unique(&connection)?;
        self.connections.push(connection);
        Ok(())
    }

    pub fn add_dataset(&mut self, dataset: Dataset) -> SmlResult<()> {
        self.ensure_unique(&dataset)?;
        log::debug!("Adding dataset '{}'", dataset.unique_name);
        self.datasets.push(dataset);
        Ok(())
    }

    pub fn add_dimension(&mut self, dimension: Dimension) -> SmlResult<()> {
        self.ensure_unique(&dimension)?;
        log::debug!("Adding dimension '{}'", dimension.unique_name);
        self.dimensions.push(dimension);
        Ok(())
    }

    pub fn add_measure(&mut self, measure: Measure) -> SmlResult<()> {
        self.ensure_unique(&measure)?;
        self.measures.push(measure);
        Ok(())
    }

    pub fn add_calculated_measure(&mut self, measure: CalculatedMeasure) -> SmlResult<()> {
        self.ensure_unique(&measure)?;
        self.measures_calculated.push(measure);
        Ok(())
    }

    pub fn add_model(&mut self, model: Model) -> SmlResult<()> {
        self.ensure_unique(&model)?;
        self.models.push(model);
        Ok(())
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.unique_name == name)
    }

    /// Mutable access for column upserts
    pub fn dataset_mut(&mut self, name: &str) -> Option<&mut Dataset> {
        self.datasets.iter_mut().find(|d| d.unique_name == name)
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.unique_name == name)
    }

    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.unique_name == name)
    }

    pub fn measure_mut(&mut self, name: &str) -> Option<&mut Measure> {
        self.measures.iter_mut().find(|m| m.unique_name == name)
    }

    pub fn calculated_measure(&self, name: &str) -> Option<&CalculatedMeasure> {
        self.measures_calculated
            .iter()
            .find(|m| m.unique_name == name)
    }

    pub fn calculated_measure_mut(&mut self, name: &str) -> Option<&mut CalculatedMeasure> {
        self.measures_calculated
            .iter_mut()
            .find(|m| m.unique_name == name)
    }

    /// Consume the builder. Requires the catalog to be set.
    pub fn build(self) -> SmlResult<SmlGraph> {
        let catalog = self.catalog.ok_or(SmlError::CatalogNotSet)?;
        Ok(SmlGraph {
            catalog,
            connections: self.connections,
            datasets: self.datasets,
            dimensions: self.dimensions,
            measures: self.measures,
            measures_calculated: self.measures_calculated,
            models: self.models,
        })
    }
}

/// The finished object graph handed to the writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmlGraph {
    pub catalog: Catalog,
    pub connections: Vec<Connection>,
    pub datasets: Vec<Dataset>,
    pub dimensions: Vec<Dimension>,
    pub measures: Vec<Measure>,
    pub measures_calculated: Vec<CalculatedMeasure>,
    pub models: Vec<Model>,
}

impl SmlGraph {
    /// Every object in the graph
    pub fn objects(&self) -> impl Iterator<Item = &dyn SmlObject> + '_ {
        chain_objects(
            Some(&self.catalog),
            &self.connections,
            &self.datasets,
            &self.dimensions,
            &self.measures,
            &self.measures_calculated,
            &self.models,
        )
    }

    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.unique_name == name)
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.unique_name == name)
    }

    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.unique_name == name)
    }

    pub fn calculated_measure(&self, name: &str) -> Option<&CalculatedMeasure> {
        self.measures_calculated
            .iter()
            .find(|m| m.unique_name == name)
    }

    /// Whether a measure or calculated measure with this name exists
    pub fn has_metric(&self, name: &str) -> bool {
        self.measure(name).is_some() || self.calculated_measure(name).is_some()
    }

    /// The single composite model, if present
    pub fn model(&self) -> Option<&Model> {
        self.models.first()
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
