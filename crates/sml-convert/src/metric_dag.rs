//! Metric dependency graph and compile ordering

use petgraph::algo::{condensation, tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use sml_dbt::{Metric, MetricKind};
use std::collections::{BTreeSet, HashMap};

/// Directed graph of metric-to-metric references
#[derive(Debug)]
pub struct MetricDag {
    /// Edges run from a dependency to its dependent
    graph: DiGraph<String, ()>,

    node_map: HashMap<String, NodeIndex>,
}

impl MetricDag {
    /// Build the graph over `metrics`. References to names that are not
    /// metrics (plain measures, typos) do not produce edges.
    pub fn build(metrics: &[Metric]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        for metric in metrics {
            if !node_map.contains_key(&metric.name) {
                let idx = graph.add_node(metric.name.clone());
                node_map.insert(metric.name.clone(), idx);
            }
        }

        for metric in metrics {
            let Some(&to) = node_map.get(&metric.name) else {
                continue;
            };
            for dep in dependencies(metric) {
                if let Some(&from) = node_map.get(dep) {
                    if graph.find_edge(from, to).is_none() {
                        graph.add_edge(from, to, ());
                    }
                }
            }
        }

        Self { graph, node_map }
    }

    /// Metrics that sit on a reference cycle, self-references included
    pub fn cyclic_metrics(&self) -> BTreeSet<String> {
        let mut cyclic = BTreeSet::new();
        for component in tarjan_scc(&self.graph) {
            let on_cycle = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&idx| self.graph.find_edge(idx, idx).is_some());
            if on_cycle {
                cyclic.extend(component.into_iter().map(|idx| self.graph[idx].clone()));
            }
        }
        cyclic
    }

    /// Metric names with dependencies first. Members of a cycle are left out.
    pub fn compile_order(&self) -> Vec<String> {
        let cyclic = self.cyclic_metrics();
        let condensed = condensation(self.graph.clone(), true);
        let order = match toposort(&condensed, None) {
            Ok(order) => order,
            Err(_) => condensed.node_indices().collect(),
        };
        order
            .into_iter()
            .flat_map(|idx| condensed[idx].iter())
            .filter(|name| !cyclic.contains(*name))
            .cloned()
            .collect()
    }

    /// Direct metric dependencies of `name`
    pub fn dependencies(&self, name: &str) -> Vec<String> {
        self.node_map
            .get(name)
            .map(|&idx| {
                self.graph
                    .neighbors_directed(idx, petgraph::Direction::Incoming)
                    .map(|dep| self.graph[dep].clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Names a metric needs compiled before it
fn dependencies(metric: &Metric) -> Vec<&str> {
    let mut deps = metric.kind.metric_references();
    // a cumulative metric may aggregate a measure that a simple metric of the
    // same name already exposes
    if let MetricKind::Cumulative { .. } = metric.kind {
        deps.extend(
            metric
                .kind
                .measure_name()
                .filter(|measure| *measure != metric.name),
        );
    }
    deps
}

#[cfg(test)]
#[path = "metric_dag_test.rs"]
mod tests;
