use super::*;

fn metrics(yaml: &str) -> Vec<Metric> {
    serde_yaml::from_str(yaml).unwrap()
}

const CHAIN: &str = r#"
- name: margin_pct
  type: ratio
  type_params:
    numerator: margin
    denominator: revenue
- name: margin
  type: derived
  type_params:
    expr: revenue - cost
    metrics: [revenue, cost]
- name: revenue
  type: simple
  type_params:
    measure: revenue
- name: cost
  type: simple
  type_params:
    measure: cost
"#;

fn position(order: &[String], name: &str) -> usize {
    order.iter().position(|n| n == name).unwrap()
}

#[test]
fn test_compile_order_puts_dependencies_first() {
    let dag = MetricDag::build(&metrics(CHAIN));
    let order = dag.compile_order();
    assert_eq!(order.len(), 4);
    assert!(position(&order, "revenue") < position(&order, "margin"));
    assert!(position(&order, "cost") < position(&order, "margin"));
    assert!(position(&order, "margin") < position(&order, "margin_pct"));
    assert!(dag.cyclic_metrics().is_empty());
}

#[test]
fn test_dependencies_lists_direct_references() {
    let dag = MetricDag::build(&metrics(CHAIN));
    let mut deps = dag.dependencies("margin");
    deps.sort();
    assert_eq!(deps, vec!["cost", "revenue"]);
    assert!(dag.dependencies("revenue").is_empty());
    assert!(dag.dependencies("unknown").is_empty());
}

#[test]
fn test_cycle_members_are_reported_and_excluded() {
    let dag = MetricDag::build(&metrics(
        r#"
- name: a
  type: derived
  type_params:
    expr: b + 1
    metrics: [b]
- name: b
  type: ratio
  type_params:
    numerator: a
    denominator: c
- name: c
  type: simple
  type_params:
    measure: c
"#,
    ));
    let cyclic: Vec<_> = dag.cyclic_metrics().into_iter().collect();
    assert_eq!(cyclic, vec!["a", "b"]);
    assert_eq!(dag.compile_order(), vec!["c"]);
}

#[test]
fn test_self_reference_is_a_cycle() {
    let dag = MetricDag::build(&metrics(
        r#"
- name: loop
  type: derived
  type_params:
    expr: loop * 2
    metrics: [loop]
"#,
    ));
    assert!(dag.cyclic_metrics().contains("loop"));
    assert!(dag.compile_order().is_empty());
}

#[test]
fn test_cumulative_over_own_name_is_not_a_cycle() {
    let dag = MetricDag::build(&metrics(
        r#"
- name: revenue
  type: cumulative
  type_params:
    measure: revenue
    window: 1 month
"#,
    ));
    assert!(dag.cyclic_metrics().is_empty());
    assert_eq!(dag.compile_order(), vec!["revenue"]);
}

#[test]
fn test_cumulative_waits_for_simple_metric_on_same_measure() {
    let dag = MetricDag::build(&metrics(
        r#"
- name: revenue_mtd
  type: cumulative
  type_params:
    measure: revenue
    grain_to_date: month
- name: revenue
  type: simple
  type_params:
    measure: revenue
"#,
    ));
    let order = dag.compile_order();
    assert!(position(&order, "revenue") < position(&order, "revenue_mtd"));
}
