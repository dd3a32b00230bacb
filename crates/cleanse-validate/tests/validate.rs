use polars::prelude::*;

use cleanse_model::{ColumnConstraint, ColumnContract, DataSchema, DeclaredType};
use cleanse_validate::SchemaValidator;

fn string_column(name: &str, values: &[Option<&str>]) -> Column {
    Series::new(name.into(), values.to_vec()).into()
}

fn transactions() -> DataFrame {
    DataFrame::new(vec![
        string_column("transaction_id", &[Some("1001"), Some("1002"), Some("1003")]),
        string_column("customer_id", &[Some("CUST-1"), Some("BAD"), Some("CUST-3")]),
        string_column("amount", &[Some("10.50"), Some("-4"), Some("abc")]),
        string_column(
            "transaction_date",
            &[Some("2024-01-01 10:00:00"), None, Some("2024-01-02")],
        ),
    ])
    .unwrap()
}

#[test]
fn reference_schema_reports_each_problem_once() {
    let schema = DataSchema::reference();
    let result = SchemaValidator::new(&schema).validate(&transactions());

    assert!(result.column_presence.passed);
    assert!(!result.overall_passed);
    assert_eq!(
        result.data_types.errors["amount"],
        vec!["1 value(s) cannot be read as float (e.g. \"abc\")".to_string()]
    );
    assert!(!result.data_types.errors.contains_key("transaction_date"));
    assert_eq!(
        result.constraints.errors["customer_id"],
        vec![r"1 value(s) do not match pattern ^CUST-\d+$".to_string()]
    );
    assert_eq!(
        result.constraints.errors["amount"],
        vec!["1 value(s) below minimum 0".to_string()]
    );
    assert!(!result.constraints.errors.contains_key("transaction_id"));
}

#[test]
fn missing_declared_columns_are_listed() {
    let schema = DataSchema::reference();
    let df = DataFrame::new(vec![string_column("amount", &[Some("1.0")])]).unwrap();
    let result = SchemaValidator::new(&schema).validate(&df);
    assert!(!result.column_presence.passed);
    assert_eq!(
        result.column_presence.missing,
        vec!["customer_id", "transaction_date", "transaction_id"]
    );
    assert!(!result.overall_passed);
}

#[test]
fn nullability_and_allowed_values() {
    let mut schema = DataSchema::default();
    schema.columns.insert(
        "status".to_string(),
        ColumnContract {
            data_type: DeclaredType::String,
            nullable: false,
            validation: Some(ColumnConstraint {
                allowed: Some(vec!["open".to_string(), "closed".to_string()]),
                ..ColumnConstraint::default()
            }),
        },
    );
    let df = DataFrame::new(vec![string_column(
        "status",
        &[Some("open"), None, Some("pending"), Some("  ")],
    )])
    .unwrap();
    let result = SchemaValidator::new(&schema).validate(&df);
    assert_eq!(
        result.constraints.errors["status"],
        vec![
            "2 null value(s) in non-nullable column".to_string(),
            "1 value(s) outside the allowed set".to_string(),
        ]
    );
    assert_eq!(result.issue_count(), 2);
}

#[test]
fn typed_columns_are_checked_by_dtype() {
    let mut schema = DataSchema::default();
    schema.columns.insert(
        "quantity".to_string(),
        ColumnContract {
            data_type: DeclaredType::Integer,
            nullable: true,
            validation: Some(ColumnConstraint {
                max: Some(10.0),
                ..ColumnConstraint::default()
            }),
        },
    );
    let df = DataFrame::new(vec![
        Series::new("quantity".into(), vec![Some(1.5f64), Some(12.0), None]).into(),
    ])
    .unwrap();
    let result = SchemaValidator::new(&schema).validate(&df);
    assert_eq!(
        result.data_types.errors["quantity"],
        vec!["column has dtype f64, expected integer".to_string()]
    );
    assert_eq!(
        result.constraints.errors["quantity"],
        vec!["1 value(s) above maximum 10".to_string()]
    );
}

#[test]
fn custom_date_formats_replace_defaults() {
    let mut schema = DataSchema::default();
    schema.columns.insert(
        "when".to_string(),
        ColumnContract {
            data_type: DeclaredType::Datetime,
            nullable: true,
            validation: None,
        },
    );
    let df = DataFrame::new(vec![string_column("when", &[Some("2024.01.31")])]).unwrap();

    let default_run = SchemaValidator::new(&schema).validate(&df);
    assert!(!default_run.overall_passed);

    let formats = vec!["%Y.%m.%d".to_string()];
    let custom_run = SchemaValidator::new(&schema)
        .with_date_formats(&formats)
        .validate(&df);
    assert!(custom_run.overall_passed);
}

#[test]
fn clean_frame_passes() {
    let schema = DataSchema::reference();
    let df = DataFrame::new(vec![
        string_column("transaction_id", &[Some("1"), Some("2")]),
        string_column("customer_id", &[Some("CUST-1"), Some("CUST-2")]),
        string_column("amount", &[Some("1.00"), Some("2.50")]),
        string_column("transaction_date", &[Some("2024-01-01"), None]),
    ])
    .unwrap();
    let result = SchemaValidator::new(&schema).validate(&df);
    assert!(result.overall_passed, "{result:?}");
    assert_eq!(result.issue_count(), 0);
}
