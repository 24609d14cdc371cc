//! Removal of metrics that depend on removed metrics
//!
//! Each step strips removed names from the model and drops every calculated
//! measure whose expression refers to one of them. Dropped measures join the
//! removed set and the step repeats until nothing new is found.

use crate::expression::references_measure;
use sml_core::SmlGraph;
use std::collections::BTreeSet;

/// A metric dropped because it referenced a removed metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadedRemoval {
    pub name: String,
    /// The removed metric it referred to
    pub referenced: String,
}

/// Graph after the cascade and what it dropped, in removal order
#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    pub graph: SmlGraph,
    pub cascaded: Vec<CascadedRemoval>,
}

/// One pass: returns the pruned graph and the newly dropped metrics
fn remove_step(mut graph: SmlGraph, removed: &BTreeSet<String>) -> (SmlGraph, Vec<CascadedRemoval>) {
    graph.measures.retain(|m| !removed.contains(&m.unique_name));
    graph
        .measures_calculated
        .retain(|m| !removed.contains(&m.unique_name));

    let mut dropped = Vec::new();
    graph.measures_calculated.retain(|measure| {
        let hit = removed
            .iter()
            .find(|name| references_measure(&measure.expression, name));
        match hit {
            Some(name) => {
                dropped.push(CascadedRemoval {
                    name: measure.unique_name.clone(),
                    referenced: name.clone(),
                });
                false
            }
            None => true,
        }
    });

    for model in &mut graph.models {
        model.metrics.retain(|m| !removed.contains(&m.unique_name));
    }
    (graph, dropped)
}

/// Remove everything that transitively references a name in `removed`.
///
/// Running it again on its own output with the grown removed set drops
/// nothing further.
pub fn cascade_removals(graph: SmlGraph, removed: &BTreeSet<String>) -> CascadeOutcome {
    let mut removed = removed.clone();
    let mut graph = graph;
    let mut cascaded = Vec::new();

    loop {
        let (next, dropped) = remove_step(graph, &removed);
        graph = next;
        if dropped.is_empty() {
            break;
        }
        for removal in &dropped {
            log::debug!(
                "Removing '{}': references removed metric '{}'",
                removal.name,
                removal.referenced
            );
            removed.insert(removal.name.clone());
        }
        cascaded.extend(dropped);
    }

    CascadeOutcome { graph, cascaded }
}

#[cfg(test)]
#[path = "cascade_test.rs"]
mod tests;
