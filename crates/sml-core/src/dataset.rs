//! Datasets and their columns

use crate::ident::normalize_whitespace;
use crate::object::{impl_sml_object, ObjectType};
use serde::{Deserialize, Serialize};

/// Prefix of generated calculated column names
pub const CALCULATED_COLUMN_PREFIX: &str = "calc_col";

/// Upper bound on generated calculated column names per dataset
pub const MAX_CALCULATED_COLUMNS: usize = 999;

/// Logical column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Long,
    Decimal,
    Boolean,
    DateTime,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColumnType::String => "string",
            ColumnType::Long => "long",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::DateTime => "datetime",
        };
        f.write_str(s)
    }
}

/// A physical or SQL-backed column on a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
            sql: None,
        }
    }

    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }

    /// SQL text that produces this column's value
    pub fn expression(&self) -> &str {
        self.sql.as_deref().unwrap_or(&self.name)
    }
}

/// Outcome of [`Dataset::upsert_column`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnChange {
    Added,
    Unchanged,
    /// An existing column with the same name was replaced
    Replaced,
}

/// A table exposed to the BI engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub unique_name: String,
    pub object_type: ObjectType,
    pub label: String,
    pub connection_id: String,
    pub table: String,
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Dataset {
    pub fn new(
        unique_name: impl Into<String>,
        connection_id: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        let unique_name = unique_name.into();
        Self {
            label: unique_name.clone(),
            unique_name,
            object_type: ObjectType::Dataset,
            connection_id: connection_id.into(),
            table: table.into(),
            columns: Vec::new(),
            description: None,
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Insert a column, keeping names unique.
    ///
    /// An identical column is a no-op; a column with the same name but a
    /// different type or SQL replaces the existing entry (last writer wins).
    pub fn upsert_column(&mut self, column: Column) -> ColumnChange {
        match self.columns.iter().position(|c| c.name == column.name) {
            Some(idx) if self.columns[idx] == column => ColumnChange::Unchanged,
            Some(idx) => {
                self.columns.remove(idx);
                self.columns.push(column);
                ColumnChange::Replaced
            }
            None => {
                self.columns.push(column);
                ColumnChange::Added
            }
        }
    }

    /// Find or allocate a generated column computing `sql`.
    ///
    /// Candidates are `calc_col1`, `calc_col2`, ... in order. A candidate whose
    /// SQL matches (after whitespace normalization) is reused; the first unused
    /// candidate is allocated otherwise. Returns `None` when every candidate
    /// is taken by a different expression.
    pub fn get_or_create_calculated_column(
        &mut self,
        sql: &str,
        data_type: ColumnType,
    ) -> Option<String> {
        let wanted = normalize_whitespace(sql);
        for n in 1..=MAX_CALCULATED_COLUMNS {
            let candidate = format!("{}{}", CALCULATED_COLUMN_PREFIX, n);
            match self.column(&candidate) {
                Some(existing) => {
                    if existing.sql.as_deref().map(normalize_whitespace).as_deref()
                        == Some(wanted.as_str())
                    {
                        return Some(candidate);
                    }
                }
                None => {
                    self.columns
                        .push(Column::new(candidate.clone(), data_type).with_sql(sql.trim()));
                    return Some(candidate);
                }
            }
        }
        None
    }
}

impl_sml_object!(Dataset);

#[cfg(test)]
#[path = "dataset_test.rs"]
mod tests;
