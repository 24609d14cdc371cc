use super::*;
use crate::config::ConvertConfig;
use sml_dbt::DbtIndex;

const INDEX: &str = r#"
project:
  name: shop
semantic_models:
  - name: orders
    model: ref('orders')
    entities:
      - name: order_id
        type: primary
      - name: customer_id
        type: foreign
      - name: store_id
        type: foreign
    dimensions:
      - name: ordered_at
        type: time
        type_params:
          time_granularity: day
      - name: shipped_at
        type: time
      - name: order_month
        type: time
        type_params:
          time_granularity: month
      - name: status
        type: categorical
    measures:
      - name: order_total
        agg: sum
  - name: returns
    model: ref('returns')
    entities:
      - name: return_id
        type: primary
      - name: customer_id
        type: foreign
    measures:
      - name: refund
  - name: customers
    model: ref('customers')
    entities:
      - name: customer_id
        type: primary
    dimensions:
      - name: region
        type: categorical
      - name: signup_tier
        type: categorical
        label: Signup Tier
      - name: first_ordered_at
        type: time
    measures:
      - name: lifetime_spend
  - name: stores
    model: ref('stores')
    entities:
      - name: store_id
        type: primary
    dimensions:
      - name: region
        type: categorical
"#;

fn resolve<'a>(index: &'a DbtIndex, config: &'a ConvertConfig) -> Converter<'a> {
    let mut converter = Converter::new(index, config);
    converter.build_datasets().unwrap();
    converter.resolve_relationships().unwrap();
    converter
}

fn setup() -> (DbtIndex, ConvertConfig) {
    (
        DbtIndex::from_yaml(INDEX).unwrap(),
        ConvertConfig::new("snowflake", "DB", "PUBLIC"),
    )
}

#[test]
fn test_foreign_key_creates_dimension_and_relationship() {
    let (index, config) = setup();
    let converter = resolve(&index, &config);

    let customers = converter.builder.dimension("customers").unwrap();
    assert!(!customers.is_degenerate);
    assert_eq!(customers.hierarchies.len(), 1);
    let leaf = customers.hierarchies[0].leaf().unwrap();
    assert_eq!(leaf.unique_name, "customer_id");
    let attribute = customers.level_attribute("customer_id").unwrap();
    assert_eq!(attribute.dataset, "customers");
    assert_eq!(attribute.key_columns, vec!["customer_id"]);

    let relationship = converter
        .model
        .relationships
        .iter()
        .find(|r| r.from.dataset == "orders" && r.to.dimension == "customers")
        .unwrap();
    assert_eq!(relationship.from.join_columns, vec!["customer_id"]);
    assert_eq!(relationship.to.level, "customer_id");
}

#[test]
fn test_secondary_attributes_skip_time_and_key() {
    let (index, config) = setup();
    let converter = resolve(&index, &config);

    let customers = converter.builder.dimension("customers").unwrap();
    let leaf = customers.hierarchies[0].leaf().unwrap();
    let names: Vec<&str> = leaf
        .secondary_attributes
        .iter()
        .map(|a| a.unique_name.as_str())
        .collect();
    assert_eq!(names, vec!["region", "signup_tier"]);
    assert_eq!(leaf.secondary_attributes[1].label, "Signup Tier");
}

#[test]
fn test_repeated_foreign_key_reuses_dimension() {
    let (index, config) = setup();
    let converter = resolve(&index, &config);

    let count = converter
        .builder
        .dimensions()
        .iter()
        .filter(|d| d.unique_name == "customers")
        .count();
    assert_eq!(count, 1);
    assert!(converter
        .model
        .relationships
        .iter()
        .any(|r| r.from.dataset == "returns" && r.to.dimension == "customers"));
}

#[test]
fn test_colliding_secondary_attribute_is_dropped_with_warning() {
    let (index, config) = setup();
    let converter = resolve(&index, &config);

    let stores = converter.builder.dimension("stores").unwrap();
    assert!(stores.hierarchies[0].levels[0].secondary_attributes.is_empty());

    let warnings: Vec<_> = converter.report.warnings_for("stores.region").collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::AttributeCollision);
    // the dropped attribute does not come back as a degenerate dimension
    assert!(converter.builder.dimension("region").is_none());
}

#[test]
fn test_day_time_attributes_role_play_the_date_dimension() {
    let (index, config) = setup();
    let converter = resolve(&index, &config);

    let date_dims = converter
        .builder
        .dimensions()
        .iter()
        .filter(|d| d.kind == DimensionKind::Time)
        .count();
    assert_eq!(date_dims, 1);
    assert!(converter.builder.dataset("date_dim").is_some());

    let roles: Vec<_> = converter
        .model
        .relationships
        .iter()
        .filter(|r| r.from.dataset == "orders" && r.to.dimension == "Date Dimension")
        .map(|r| (r.from.join_columns[0].as_str(), r.role_play.as_deref()))
        .collect();
    // missing granularity is treated as day
    assert_eq!(
        roles,
        vec![
            ("ordered_at", Some("ordered_at {0}")),
            ("shipped_at", Some("shipped_at {0}")),
        ]
    );
    assert!(converter
        .model
        .relationships
        .iter()
        .filter(|r| r.to.dimension == "Date Dimension")
        .all(|r| r.to.level == "Day"));
}

#[test]
fn test_non_day_granularity_is_warned_and_skipped() {
    let (index, config) = setup();
    let converter = resolve(&index, &config);

    let warnings: Vec<_> = converter.report.warnings_for("orders.order_month").collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::UnsupportedGranularity);
    assert!(!converter
        .model
        .relationships
        .iter()
        .any(|r| r.from.join_columns == vec!["order_month"]));
}

#[test]
fn test_fact_dataset_of_dimension_gets_direct_relationship() {
    let (index, config) = setup();
    let converter = resolve(&index, &config);

    assert!(converter.model.relationships.iter().any(|r| {
        r.from.dataset == "customers"
            && r.from.join_columns == vec!["customer_id"]
            && r.to.dimension == "customers"
            && r.to.level == "customer_id"
    }));
    // stores has no measures
    assert!(!converter
        .model
        .relationships
        .iter()
        .any(|r| r.from.dataset == "stores"));
}

#[test]
fn test_unlinked_categorical_becomes_degenerate_dimension() {
    let (index, config) = setup();
    let converter = resolve(&index, &config);

    let status = converter.builder.dimension("status").unwrap();
    assert!(status.is_degenerate);
    assert_eq!(status.level_attributes[0].dataset, "orders");
    assert!(converter
        .model
        .dimensions
        .iter()
        .any(|d| d.unique_name == "status"));
}

#[test]
fn test_relationships_are_not_duplicated() {
    let (index, config) = setup();
    let converter = resolve(&index, &config);
    let relationships = &converter.model.relationships;
    for (i, a) in relationships.iter().enumerate() {
        for b in &relationships[i + 1..] {
            assert!(!a.same_join(b), "duplicate join {}", a.unique_name);
        }
    }
}
