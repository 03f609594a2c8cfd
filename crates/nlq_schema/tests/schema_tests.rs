use nlq_protocol::Value;
use nlq_schema::{detect_all_relationships, Column, Dataset, SemanticType, Table};

fn orders_table() -> Table {
    Table::new(vec![
        Column::new(
            "id",
            vec![
                Value::Text("1".into()),
                Value::Text("2".into()),
                Value::Text("3".into()),
                Value::Text("4".into()),
            ],
        ),
        Column::new(
            "customer_id",
            vec![
                Value::Text("100".into()),
                Value::Text("101".into()),
                Value::Text("100".into()),
                Value::Null,
            ],
        ),
        Column::new(
            "amount",
            vec![
                Value::Text("19.99".into()),
                Value::Text("5.00".into()),
                Value::Text("12.50".into()),
                Value::Text("7.25".into()),
            ],
        ),
        Column::new(
            "status",
            vec![
                Value::Text("paid".into()),
                Value::Text("paid".into()),
                Value::Text("refunded".into()),
                Value::Text("paid".into()),
            ],
        ),
    ])
}

fn customers_table() -> Table {
    Table::new(vec![Column::new(
        "id",
        vec![Value::Text("100".into()), Value::Text("101".into())],
    )])
}

#[test]
fn profile_end_to_end_infers_types_stats_and_keys() {
    let ds = Dataset::profile("orders", "order history", orders_table());

    assert_eq!(ds.primary_key.as_deref(), Some("id"));
    assert!(ds
        .potential_foreign_keys
        .contains(&"customer_id".to_string()));

    let amount = ds.column_metadata("amount").unwrap();
    assert_eq!(amount.semantic_type, SemanticType::Float);

    let customer_id_meta = ds.column_metadata("customer_id").unwrap();
    assert!(customer_id_meta.nullable);

    let status = ds.column_metadata("status").unwrap();
    assert_eq!(status.semantic_type, SemanticType::Categorical);
}

#[test]
fn relationships_populate_after_cross_dataset_detection() {
    let orders = Dataset::profile("orders", "", orders_table());
    let customers = Dataset::profile("customers", "", customers_table());
    let mut datasets = vec![orders, customers];

    detect_all_relationships(&mut datasets);

    let rel = datasets[0]
        .relationships
        .iter()
        .find(|r| r.source_column == "customer_id")
        .expect("expected a relationship for customer_id");
    assert_eq!(rel.target_dataset, "customers");
    assert_eq!(rel.target_column, "id");
}
