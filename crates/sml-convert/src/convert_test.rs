use super::*;
use sml_core::ObjectType;

const INDEX: &str = r#"
project:
  name: jaffle_shop
semantic_models:
  - name: orders
    description: One row per order
    model: ref('orders')
    entities:
      - name: order_id
        type: primary
    dimensions:
      - name: ordered_at
        type: time
        type_params:
          time_granularity: day
    measures:
      - name: order_total
        agg: sum
metrics:
  - name: revenue
    type: simple
    type_params:
      measure: order_total
  - name: funnel
    type: conversion
  - name: revenue_share
    type: ratio
    type_params:
      numerator: revenue
      denominator: funnel
"#;

fn snowflake() -> ConvertConfig {
    ConvertConfig::new("snowflake", "analytics", "marts")
}

#[test]
fn test_unsupported_warehouse_fails_first() {
    // the index is also empty; the warehouse check must win
    let index = DbtIndex::from_yaml("project:\n  name: empty\n").unwrap();
    let config = ConvertConfig::new("bigquery", "db", "schema");
    let err = convert(&index, &config).unwrap_err();
    assert!(
        matches!(err, ConvertError::UnsupportedWarehouse { ref warehouse } if warehouse == "bigquery")
    );
    assert!(err.to_string().starts_with("[C001]"));
}

#[test]
fn test_no_semantic_models_is_fatal() {
    let index = DbtIndex::from_yaml("project:\n  name: empty\n").unwrap();
    let err = convert(&index, &snowflake()).unwrap_err();
    assert!(matches!(err, ConvertError::NoSemanticModels { .. }));
}

#[test]
fn test_no_resolvable_tables_is_fatal() {
    let index = DbtIndex::from_yaml(
        r#"
project:
  name: broken
semantic_models:
  - name: orders
    model: "select 1"
"#,
    )
    .unwrap();
    let err = convert(&index, &snowflake()).unwrap_err();
    assert!(matches!(err, ConvertError::NoDatasets { ref project } if project == "broken"));
}

#[test]
fn test_catalog_connection_and_model_defaults() {
    let index = DbtIndex::from_yaml(INDEX).unwrap();
    let output = convert(&index, &snowflake()).unwrap();
    let graph = &output.graph;

    assert_eq!(graph.catalog.unique_name, "jaffle_shop");
    assert_eq!(graph.connections.len(), 1);
    assert_eq!(graph.connections[0].unique_name, "dbt_connection");
    assert_eq!(graph.connections[0].database, "ANALYTICS");
    assert_eq!(graph.models.len(), 1);
    assert_eq!(graph.model().unwrap().unique_name, "jaffle_shop");
    assert_eq!(
        graph.dataset("orders").unwrap().description.as_deref(),
        Some("One row per order")
    );
}

#[test]
fn test_config_names_override_project_name() {
    let index = DbtIndex::from_yaml(INDEX).unwrap();
    let mut config = ConvertConfig::new("databricks", "main", "gold");
    config.catalog_name = Some("shop_catalog".to_string());
    config.model_name = Some("Shop".to_string());
    config.connection_id = "lakehouse".to_string();

    let output = convert(&index, &config).unwrap();
    assert_eq!(output.graph.catalog.unique_name, "shop_catalog");
    assert_eq!(output.graph.model().unwrap().unique_name, "Shop");
    assert!(output
        .graph
        .datasets
        .iter()
        .all(|d| d.connection_id == "lakehouse"));
    // databricks keeps the configured case
    assert_eq!(output.graph.connections[0].database, "main");
}

#[test]
fn test_rejections_cascade_into_report() {
    let index = DbtIndex::from_yaml(INDEX).unwrap();
    let output = convert(&index, &snowflake()).unwrap();

    let removed: Vec<_> = output.report.removed_metrics.iter().cloned().collect();
    assert_eq!(removed, vec!["funnel", "revenue_share"]);
    assert!(!output.graph.has_metric("revenue_share"));
    assert!(output.graph.has_metric("revenue"));

    let cascade: Vec<_> = output.report.warnings_for("revenue_share").collect();
    assert_eq!(cascade.len(), 1);
    assert_eq!(cascade[0].kind, WarningKind::CascadeRemoval);
}

#[test]
fn test_every_object_is_unique() {
    let index = DbtIndex::from_yaml(INDEX).unwrap();
    let output = convert(&index, &snowflake()).unwrap();
    let mut seen: Vec<(String, ObjectType)> = Vec::new();
    for object in output.graph.objects() {
        let key = (object.unique_name().to_string(), object.object_type());
        assert!(!seen.contains(&key), "duplicate {:?}", key);
        seen.push(key);
    }
}
