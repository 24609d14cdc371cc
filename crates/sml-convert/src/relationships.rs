//! Dimensions and relationships inferred from entities and attributes
//!
//! Four passes over the dataset layer:
//!
//! 1. foreign entities become a dimension over the semantic model that owns
//!    the matching primary entity, plus a relationship from the fact dataset
//! 2. day-grained time attributes on fact models join the shared date
//!    dimension under a role-play label
//! 3. a dimension whose dataset is itself a fact dataset gets a direct
//!    relationship from that dataset
//! 4. categorical attributes not exposed through a foreign key become
//!    degenerate dimensions on their own dataset

use crate::convert::Converter;
use crate::error::ConvertResult;
use crate::report::WarningKind;
use crate::time_dimension::{self, date_columns, date_dataset, date_dimension, role_play};
use sml_core::{
    Dimension, DimensionKind, DimensionReference, Hierarchy, Level, LevelAttribute, ObjectType,
    Relationship, SecondaryAttribute,
};
use sml_dbt::{EntityType, SemanticModel, TimePeriod};
use std::collections::HashSet;

impl Converter<'_> {
    pub(crate) fn resolve_relationships(&mut self) -> ConvertResult<()> {
        self.foreign_key_dimensions()?;
        self.time_relationships()?;
        self.same_table_relationships();
        self.degenerate_dimensions()?;
        Ok(())
    }

    /// Names of every attribute on every dimension built so far
    fn used_attribute_names(&self) -> HashSet<String> {
        self.builder
            .dimensions()
            .iter()
            .flat_map(|d| d.attribute_names())
            .map(str::to_string)
            .collect()
    }

    /// Add a relationship unless an equivalent join is already present
    pub(crate) fn add_relationship(&mut self, relationship: Relationship) {
        if self
            .model
            .relationships
            .iter()
            .any(|r| r.same_join(&relationship))
        {
            return;
        }
        log::debug!("Adding relationship '{}'", relationship.unique_name);
        self.model.relationships.push(relationship);
    }

    fn foreign_key_dimensions(&mut self) -> ConvertResult<()> {
        let index = self.index;
        for fact in &index.semantic_models {
            let Some(fact_dataset) = self.dataset_of(&fact.name).map(str::to_string) else {
                continue;
            };
            let foreign = fact
                .entities
                .iter()
                .filter(|e| e.entity_type == EntityType::Foreign);

            for entity in foreign {
                let Some(target) = index
                    .semantic_models
                    .iter()
                    .find(|m| m.name != fact.name && m.primary_entity(&entity.name).is_some())
                else {
                    log::debug!(
                        "No primary entity '{}' for foreign key on '{}'",
                        entity.name,
                        fact.name
                    );
                    continue;
                };
                if self.dataset_of(&target.name).is_none() {
                    continue;
                }

                if self.builder.dimension(&target.name).is_none() {
                    let dimension = self.entity_dimension(target, &entity.name);
                    self.builder.add_dimension(dimension)?;
                }
                let has_level = self
                    .builder
                    .dimension(&target.name)
                    .is_some_and(|d| d.has_level(&entity.name));
                let Some(join_column) = self.column_of(&fact.name, &entity.name) else {
                    continue;
                };
                if !has_level {
                    log::debug!(
                        "Dimension '{}' has no level '{}'; skipping join from '{}'",
                        target.name,
                        entity.name,
                        fact.name
                    );
                    continue;
                }

                let relationship = Relationship::new(
                    fact_dataset.clone(),
                    vec![join_column.to_string()],
                    &target.name,
                    &entity.name,
                );
                self.add_relationship(relationship);
            }
        }
        Ok(())
    }

    /// Single-level dimension keyed by `key` on `target`, with the other
    /// categorical attributes as secondary attributes of the level
    fn entity_dimension(&mut self, target: &SemanticModel, key: &str) -> Dimension {
        let dataset = self.dataset_of(&target.name).unwrap_or_default().to_string();
        let key_column = self.column_of(&target.name, key).unwrap_or(key).to_string();

        let mut used = self.used_attribute_names();
        used.insert(key.to_string());

        let mut level = Level::new(key);
        for attribute in target.dimensions.iter().filter(|d| !d.is_time()) {
            if attribute.name == key {
                continue;
            }
            let Some(column) = self
                .column_of(&target.name, &attribute.name)
                .map(str::to_string)
            else {
                continue;
            };
            self.linked_attributes
                .insert((target.name.clone(), attribute.name.clone()));

            if !used.insert(attribute.name.clone()) {
                self.warn(
                    &format!("{}.{}", target.name, attribute.name),
                    WarningKind::AttributeCollision,
                    format!(
                        "attribute name '{}' is already used; dropped from dimension '{}'",
                        attribute.name, target.name
                    ),
                );
                continue;
            }

            let mut secondary = SecondaryAttribute::keyed_by(&attribute.name, &dataset, column);
            if let Some(label) = &attribute.label {
                secondary.label = label.clone();
            }
            level.secondary_attributes.push(secondary);
        }

        let mut dimension = Dimension::new(&target.name, target.display_label());
        dimension.description = target.description.clone();
        dimension.level_attributes = vec![LevelAttribute::keyed_by(key, &dataset, key_column)];
        dimension.hierarchies = vec![Hierarchy::new(&target.name, vec![level])];
        dimension
    }

    fn time_relationships(&mut self) -> ConvertResult<()> {
        let index = self.index;
        let date_name = self.config.date_dimension.name.clone();

        for model in index.semantic_models.iter().filter(|m| m.has_measures()) {
            let Some(dataset) = self.dataset_of(&model.name).map(str::to_string) else {
                continue;
            };
            for attribute in model.dimensions.iter().filter(|d| d.is_time()) {
                let granularity = attribute.time_granularity().unwrap_or("day");
                if TimePeriod::parse(granularity) != Some(TimePeriod::Day) {
                    self.warn(
                        &format!("{}.{}", model.name, attribute.name),
                        WarningKind::UnsupportedGranularity,
                        format!(
                            "time granularity '{}' is not supported; only day-grained attributes join the date dimension",
                            granularity
                        ),
                    );
                    continue;
                }
                let Some(column) = self
                    .column_of(&model.name, &attribute.name)
                    .map(str::to_string)
                else {
                    continue;
                };

                self.ensure_date_dimension()?;
                let relationship =
                    Relationship::new(dataset.clone(), vec![column], &date_name, time_dimension::DAY)
                        .with_role_play(role_play(&attribute.name));
                self.add_relationship(relationship);
            }
        }
        Ok(())
    }

    /// Add the date dataset and dimension the first time they are needed
    pub(crate) fn ensure_date_dimension(&mut self) -> ConvertResult<()> {
        let config = self.config;
        let date = &config.date_dimension;
        if self.builder.dimension(&date.name).is_some() {
            return Ok(());
        }

        match self.builder.dataset_mut(&date.dataset) {
            Some(dataset) => {
                for column in date_columns(date) {
                    if dataset.column(&column.name).is_none() {
                        dataset.upsert_column(column);
                    }
                }
            }
            None => self
                .builder
                .add_dataset(date_dataset(date, &config.connection_id))?,
        }
        self.builder.add_dimension(date_dimension(date))?;
        log::debug!("Added date dimension '{}'", date.name);
        Ok(())
    }

    fn same_table_relationships(&mut self) {
        let fact_datasets: HashSet<String> = self
            .index
            .semantic_models
            .iter()
            .filter(|m| m.has_measures())
            .filter_map(|m| self.dataset_of(&m.name).map(str::to_string))
            .collect();

        let mut shortcuts = Vec::new();
        for dimension in self.builder.dimensions() {
            if dimension.kind != DimensionKind::Standard || dimension.is_degenerate {
                continue;
            }
            let leaves = dimension.hierarchies.iter().filter_map(|h| h.leaf());
            for leaf in leaves {
                let Some(attribute) = dimension.level_attribute(&leaf.unique_name) else {
                    continue;
                };
                if fact_datasets.contains(&attribute.dataset) {
                    shortcuts.push(Relationship::new(
                        attribute.dataset.clone(),
                        attribute.key_columns.clone(),
                        &dimension.unique_name,
                        &leaf.unique_name,
                    ));
                }
            }
        }

        for relationship in shortcuts {
            self.add_relationship(relationship);
        }
    }

    fn degenerate_dimensions(&mut self) -> ConvertResult<()> {
        let index = self.index;
        for model in &index.semantic_models {
            let Some(dataset) = self.dataset_of(&model.name).map(str::to_string) else {
                continue;
            };
            for attribute in model.dimensions.iter().filter(|d| !d.is_time()) {
                let linked = self
                    .linked_attributes
                    .contains(&(model.name.clone(), attribute.name.clone()));
                if linked {
                    continue;
                }
                let Some(column) = self
                    .column_of(&model.name, &attribute.name)
                    .map(str::to_string)
                else {
                    continue;
                };

                let object = format!("{}.{}", model.name, attribute.name);
                if self.builder.contains(&attribute.name, ObjectType::Dimension) {
                    self.warn(
                        &object,
                        WarningKind::NameCollision,
                        format!("a dimension named '{}' already exists", attribute.name),
                    );
                    continue;
                }
                if self.used_attribute_names().contains(&attribute.name) {
                    self.warn(
                        &object,
                        WarningKind::AttributeCollision,
                        format!("attribute name '{}' is already used", attribute.name),
                    );
                    continue;
                }

                let label = attribute.label.as_deref().unwrap_or(&attribute.name);
                let mut level_attribute = LevelAttribute::keyed_by(&attribute.name, &dataset, column);
                level_attribute.label = label.to_string();

                let mut dimension = Dimension::new(&attribute.name, label);
                dimension.is_degenerate = true;
                dimension.description = attribute.description.clone();
                dimension.level_attributes = vec![level_attribute];
                dimension.hierarchies = vec![Hierarchy::new(
                    &attribute.name,
                    vec![Level::new(&attribute.name)],
                )];

                self.builder.add_dimension(dimension)?;
                self.model.dimensions.push(DimensionReference {
                    unique_name: attribute.name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "relationships_test.rs"]
mod tests;
