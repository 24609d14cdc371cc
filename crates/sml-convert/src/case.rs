//! Upper-casing of physical identifiers for warehouses that fold unquoted
//! names to upper case

use crate::config::WarehouseType;
use sml_core::ident::upper_outside_literals;
use sml_core::SmlGraph;
use sml_dbt::Quoting;

fn upper(s: &mut String) {
    *s = s.to_uppercase();
}

fn upper_all(columns: &mut [String]) {
    columns.iter_mut().for_each(upper);
}

/// Upper-case table, column and join identifiers in place.
///
/// Only applies to warehouses that fold unquoted identifiers to upper case,
/// and only to the identifier classes whose quoting flag is off. Returns
/// whether anything was rewritten.
pub fn normalize_case(graph: &mut SmlGraph, warehouse: &WarehouseType, quoting: &Quoting) -> bool {
    if !warehouse.folds_to_uppercase() {
        return false;
    }

    let mut changed = false;
    for connection in &mut graph.connections {
        if !quoting.database_quoted() {
            upper(&mut connection.database);
            changed = true;
        }
        if !quoting.schema_quoted() {
            upper(&mut connection.schema);
            changed = true;
        }
    }
    if quoting.identifier_quoted() {
        return changed;
    }

    for dataset in &mut graph.datasets {
        upper(&mut dataset.table);
        for column in &mut dataset.columns {
            upper(&mut column.name);
            if let Some(sql) = &mut column.sql {
                *sql = upper_outside_literals(sql);
            }
        }
    }

    for measure in &mut graph.measures {
        upper(&mut measure.column);
    }

    for dimension in &mut graph.dimensions {
        for attribute in &mut dimension.level_attributes {
            upper(&mut attribute.name_column);
            upper_all(&mut attribute.key_columns);
            if let Some(sort) = &mut attribute.sort_column {
                upper(sort);
            }
        }
        let levels = dimension
            .hierarchies
            .iter_mut()
            .flat_map(|h| h.levels.iter_mut());
        for level in levels {
            for attribute in &mut level.secondary_attributes {
                upper(&mut attribute.name_column);
                upper_all(&mut attribute.key_columns);
                if let Some(sort) = &mut attribute.sort_column {
                    upper(sort);
                }
            }
        }
    }

    for model in &mut graph.models {
        for relationship in &mut model.relationships {
            upper_all(&mut relationship.from.join_columns);
        }
    }

    true
}

#[cfg(test)]
#[path = "case_test.rs"]
mod tests;
