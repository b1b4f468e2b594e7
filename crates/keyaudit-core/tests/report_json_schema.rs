use keyaudit_core::{AuditReport, CatalogSnapshot};
use schemars::schema_for;

fn property_names(value: &serde_json::Value) -> Vec<String> {
    let mut names: Vec<String> = value["properties"]
        .as_object()
        .expect("schema has properties")
        .keys()
        .cloned()
        .collect();
    names.sort();
    names
}

#[test]
fn report_schema_exposes_stable_fields() {
    let generated = schema_for!(AuditReport);
    let json = serde_json::to_value(&generated).expect("serialize generated schema");

    assert_eq!(
        property_names(&json),
        vec![
            "check",
            "diagnostics",
            "entries",
            "show_all",
            "summary",
            "suppressions"
        ]
    );
}

#[test]
fn catalog_snapshot_serializes_deterministically() {
    let mut catalog = CatalogSnapshot::new("postgres", Some("shop".to_string()))
        .with_index("invoices_pkey", "invoices", &["id"])
        .with_index("customers_pkey", "customers", &["id"]);
    catalog.sort();

    let json = serde_json::to_string_pretty(&catalog).expect("serialize catalog");
    let expected = r#"{
  "catalog_version": "0.1",
  "engine": "postgres",
  "database": "shop",
  "foreign_keys": [],
  "indexes": [
    {
      "name": "customers_pkey",
      "table": "customers",
      "columns": [
        "id"
      ],
      "is_unique": false,
      "is_primary": false
    },
    {
      "name": "invoices_pkey",
      "table": "invoices",
      "columns": [
        "id"
      ],
      "is_unique": false,
      "is_primary": false
    }
  ]
}"#;
    assert_eq!(json, expected);
}
