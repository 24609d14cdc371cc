//! Datasets and columns from semantic models

use crate::convert::Converter;
use crate::error::ConvertResult;
use crate::report::WarningKind;
use sml_core::ident::is_plain_identifier;
use sml_core::{Column, ColumnChange, ColumnType, Dataset};
use sml_dbt::{Aggregation, DbtIndex, EntityType, SemanticModel};

/// What a column is derived from, for type inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Entity,
    Categorical,
    Time,
    Measure(Aggregation),
}

/// Whether a column name looks like an identifier key
fn is_id_like(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name == "id" || name.ends_with("_id") || name.ends_with("_key")
}

/// Logical type of a column from its name and role
pub fn infer_column_type(name: &str, role: FieldRole) -> ColumnType {
    if name.to_ascii_lowercase().starts_with("is_") {
        return ColumnType::Boolean;
    }
    match role {
        FieldRole::Entity | FieldRole::Categorical => ColumnType::String,
        FieldRole::Time => ColumnType::DateTime,
        FieldRole::Measure(agg) if agg.is_count() => {
            if is_id_like(name) {
                ColumnType::String
            } else {
                ColumnType::Long
            }
        }
        FieldRole::Measure(Aggregation::SumBoolean) => ColumnType::Boolean,
        FieldRole::Measure(_) => ColumnType::Decimal,
    }
}

/// Column for a field. A plain identifier `expr` names the physical column;
/// any other expression keeps the field name and becomes the column SQL.
pub fn column_for(field: &str, expr: Option<&str>, role: FieldRole) -> Column {
    let (name, sql) = match expr.map(str::trim) {
        None | Some("") => (field, None),
        Some(e) if is_plain_identifier(e) => (e, None),
        Some(e) => (field, Some(e)),
    };
    let column = Column::new(name, infer_column_type(name, role));
    match sql {
        Some(sql) => column.with_sql(sql),
        None => column,
    }
}

/// Every field of a semantic model with the column it maps to
fn model_columns(model: &SemanticModel) -> Vec<(&str, Column)> {
    let entities = model.entities.iter().map(|e| {
        (
            e.name.as_str(),
            column_for(&e.name, e.expr.as_deref(), FieldRole::Entity),
        )
    });
    let dimensions = model.dimensions.iter().map(|d| {
        let role = if d.is_time() {
            FieldRole::Time
        } else {
            FieldRole::Categorical
        };
        (d.name.as_str(), column_for(&d.name, d.expr.as_deref(), role))
    });
    let measures = model.measures.iter().map(|m| {
        (
            m.name.as_str(),
            column_for(
                &m.name,
                m.expr.as_deref(),
                FieldRole::Measure(m.aggregation()),
            ),
        )
    });
    entities.chain(dimensions).chain(measures).collect()
}

/// Whether a semantic model needs a dataset: it carries measures or owns
/// the primary entity of some other model's foreign key
fn needs_dataset(index: &DbtIndex, model: &SemanticModel) -> bool {
    if model.has_measures() {
        return true;
    }
    index
        .semantic_models
        .iter()
        .filter(|other| other.name != model.name)
        .flat_map(|other| other.entities.iter())
        .any(|e| e.entity_type == EntityType::Foreign && model.primary_entity(&e.name).is_some())
}

impl Converter<'_> {
    /// Create one dataset per backing table and register every field's column
    pub(crate) fn build_datasets(&mut self) -> ConvertResult<()> {
        let index = self.index;
        for model in &index.semantic_models {
            if !needs_dataset(index, model) {
                log::debug!(
                    "Semantic model '{}' has no measures and no foreign keys to it; skipped",
                    model.name
                );
                continue;
            }
            let Some(table) = model.table_name() else {
                self.warn(
                    &model.name,
                    WarningKind::UnresolvedTable,
                    format!("cannot resolve a table from '{}'", model.model),
                );
                continue;
            };

            if self.builder.dataset(&table).is_none() {
                let mut dataset = Dataset::new(&table, &self.config.connection_id, &table);
                dataset.label = model.display_label().to_string();
                dataset.description = model.description.clone();
                self.builder.add_dataset(dataset)?;
            }
            self.dataset_by_model
                .insert(model.name.clone(), table.clone());

            for (field, column) in model_columns(model) {
                let column_name = column.name.clone();
                let Some(dataset) = self.builder.dataset_mut(&table) else {
                    continue;
                };
                if dataset.upsert_column(column) == ColumnChange::Replaced {
                    log::debug!(
                        "Column '{}' on dataset '{}' redefined by '{}.{}'",
                        column_name,
                        table,
                        model.name,
                        field
                    );
                }
                self.field_columns
                    .insert((model.name.clone(), field.to_string()), column_name);
            }
        }
        Ok(())
    }

    /// SQL producing a field's value on its dataset
    pub(crate) fn field_expression(&self, semantic_model: &str, field: &str) -> Option<String> {
        let dataset = self.dataset_of(semantic_model)?;
        let column = self.column_of(semantic_model, field)?;
        self.builder
            .dataset(dataset)?
            .column(column)
            .map(|c| c.expression().to_string())
    }
}

#[cfg(test)]
#[path = "datasets_test.rs"]
mod tests;
