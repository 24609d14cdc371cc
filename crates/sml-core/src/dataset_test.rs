use super::*;

fn orders() -> Dataset {
    Dataset::new("orders", "con", "orders")
}

#[test]
fn test_upsert_identical_column_is_noop() {
    let mut ds = orders();
    let col = Column::new("order_total", ColumnType::Decimal);
    assert_eq!(ds.upsert_column(col.clone()), ColumnChange::Added);
    assert_eq!(ds.upsert_column(col), ColumnChange::Unchanged);
    assert_eq!(ds.columns.len(), 1);
}

#[test]
fn test_upsert_same_name_different_sql_replaces() {
    let mut ds = orders();
    ds.upsert_column(Column::new("order_count", ColumnType::Decimal).with_sql("1"));
    ds.upsert_column(Column::new("customer_id", ColumnType::String));
    let change =
        ds.upsert_column(Column::new("order_count", ColumnType::Decimal).with_sql("order_id"));

    assert_eq!(change, ColumnChange::Replaced);
    assert_eq!(ds.columns.len(), 2);
    let col = ds.column("order_count").unwrap();
    assert_eq!(col.sql.as_deref(), Some("order_id"));
}

#[test]
fn test_upsert_same_name_different_type_replaces() {
    let mut ds = orders();
    ds.upsert_column(Column::new("status", ColumnType::String));
    ds.upsert_column(Column::new("status", ColumnType::Long));
    assert_eq!(ds.columns.len(), 1);
    assert_eq!(ds.columns[0].data_type, ColumnType::Long);
}

#[test]
fn test_calculated_column_allocates_lowest_free_name() {
    let mut ds = orders();
    let first = ds.get_or_create_calculated_column("a + b", ColumnType::Decimal);
    let second = ds.get_or_create_calculated_column("a - b", ColumnType::Decimal);
    assert_eq!(first.as_deref(), Some("calc_col1"));
    assert_eq!(second.as_deref(), Some("calc_col2"));
    assert_eq!(ds.columns.len(), 2);
}

#[test]
fn test_calculated_column_reuses_whitespace_equivalent_sql() {
    let mut ds = orders();
    ds.get_or_create_calculated_column("CASE WHEN x THEN y ELSE NULL END", ColumnType::Decimal);
    let again = ds.get_or_create_calculated_column(
        "CASE WHEN x\n  THEN y  ELSE NULL END",
        ColumnType::Decimal,
    );
    assert_eq!(again.as_deref(), Some("calc_col1"));
    assert_eq!(ds.columns.len(), 1);
}

#[test]
fn test_calculated_column_skips_taken_candidates() {
    let mut ds = orders();
    ds.upsert_column(Column::new("calc_col1", ColumnType::String));
    let name = ds.get_or_create_calculated_column("x * 2", ColumnType::Decimal);
    assert_eq!(name.as_deref(), Some("calc_col2"));
}

#[test]
fn test_calculated_column_exhausted_returns_none() {
    let mut ds = orders();
    for n in 1..=MAX_CALCULATED_COLUMNS {
        ds.upsert_column(
            Column::new(format!("calc_col{}", n), ColumnType::Decimal).with_sql(format!("{}", n)),
        );
    }
    assert_eq!(
        ds.get_or_create_calculated_column("x + 1", ColumnType::Decimal),
        None
    );
}

#[test]
fn test_column_expression_prefers_sql() {
    assert_eq!(Column::new("a", ColumnType::Long).expression(), "a");
    assert_eq!(
        Column::new("a", ColumnType::Long).with_sql("b + 1").expression(),
        "b + 1"
    );
}

#[test]
fn test_dataset_serializes_sml_fields() {
    let mut ds = orders();
    ds.upsert_column(Column::new("amount", ColumnType::Decimal));
    let json = serde_json::to_value(&ds).unwrap();
    assert_eq!(json["object_type"], "dataset");
    assert_eq!(json["columns"][0]["data_type"], "decimal");
    assert!(json["columns"][0].get("sql").is_none());
}
