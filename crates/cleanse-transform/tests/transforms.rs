use polars::prelude::*;
use proptest::prelude::*;

use cleanse_common::quantile;
use cleanse_model::{CleaningRules, PipelineError};
use cleanse_transform::{Transformer, normalize_amount};

fn string_column(name: &str, values: &[Option<&str>]) -> Column {
    Series::new(name.into(), values.to_vec()).into()
}

fn duplicate_and_bad_key() -> DataFrame {
    DataFrame::new(vec![
        string_column("transaction_id", &[Some("1001"), Some("1001"), Some("1002")]),
        string_column("customer_id", &[Some("CUST-1001"), Some("CUST-1001"), Some("BADID")]),
        string_column("amount", &[Some("150.00"), Some("200.00"), Some("250.00")]),
        string_column(
            "transaction_date",
            &[
                Some("2024-01-15 10:00:00"),
                Some("2024-01-16 11:30:00"),
                Some("2024-01-15 12:00:00"),
            ],
        ),
    ])
    .unwrap()
}

#[test]
fn duplicate_and_bad_key_scenario() {
    let rules = CleaningRules::reference();
    let output = Transformer::new(&rules)
        .unwrap()
        .transform(&duplicate_and_bad_key())
        .unwrap();

    insta::assert_json_snapshot!(output.stats, @r#"
    {
      "amounts_sign_corrected": 0,
      "duplicates_removed": 1,
      "invalid_amounts": 0,
      "invalid_customer_ids": 1,
      "invalid_dates": 0,
      "invalid_transaction_ids": 0,
      "outliers_capped": 1,
      "rows_dropped_null_keys": 0,
      "rows_final": 2,
      "rows_initial": 3
    }
    "#);

    let frame = &output.frame;
    let ids: Vec<Option<i64>> = frame
        .column("transaction_id")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(ids, vec![Some(1001), Some(1002)]);
    let amounts: Vec<Option<f64>> = frame
        .column("amount")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(amounts[0], Some(200.0));
    assert_eq!(frame.column("customer_id").unwrap().null_count(), 1);
    assert!(matches!(
        frame.column("transaction_date").unwrap().dtype(),
        DataType::Datetime(TimeUnit::Milliseconds, _)
    ));
}

#[test]
fn primary_key_is_unique_after_transform() {
    let df = DataFrame::new(vec![
        string_column(
            "transaction_id",
            &[Some("1"), Some("2"), Some("1"), Some("x"), Some("2.0"), None],
        ),
        string_column(
            "customer_id",
            &[Some("CUST-1"), Some("CUST-2"), Some("CUST-1"), None, Some("CUST-2"), None],
        ),
        string_column(
            "amount",
            &[Some("1"), Some("2"), Some("3"), Some("4"), Some("5"), Some("6")],
        ),
    ])
    .unwrap();
    let rules = CleaningRules::reference();
    let output = Transformer::new(&rules).unwrap().transform(&df).unwrap();

    let ids: Vec<i64> = output
        .frame
        .column("transaction_id")
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    let mut unique = ids.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
    assert_eq!(output.stats.get("invalid_transaction_ids"), 1);
    assert_eq!(output.stats.get("duplicates_removed"), 2);
    assert_eq!(output.stats.get("rows_dropped_null_keys"), 2);
    assert_eq!(output.stats.get("rows_final"), 2);
}

#[test]
fn missing_date_column_skips_the_date_step() {
    let df = DataFrame::new(vec![
        string_column("transaction_id", &[Some("1")]),
        string_column("customer_id", &[Some("CUST-1")]),
        string_column("amount", &[Some("-5")]),
    ])
    .unwrap();
    let rules = CleaningRules::reference();
    let output = Transformer::new(&rules).unwrap().transform(&df).unwrap();
    assert_eq!(output.stats.get("invalid_dates"), 0);
    assert_eq!(output.stats.get("amounts_sign_corrected"), 1);
    assert_eq!(output.frame.width(), 3);
}

#[test]
fn absent_referenced_column_is_structural() {
    let df = DataFrame::new(vec![
        string_column("customer_id", &[Some("CUST-1")]),
        string_column("amount", &[Some("1")]),
    ])
    .unwrap();
    let rules = CleaningRules::reference();
    let err = Transformer::new(&rules).unwrap().transform(&df).unwrap_err();
    match err {
        PipelineError::MissingColumns { columns } => {
            assert_eq!(columns, vec!["transaction_id".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_pattern_is_rejected_up_front() {
    let rules = CleaningRules {
        foreign_key_pattern: "(".to_string(),
        ..CleaningRules::reference()
    };
    assert!(matches!(
        Transformer::new(&rules),
        Err(PipelineError::ColumnType { .. })
    ));
}

proptest! {
    #[test]
    fn capped_amounts_never_exceed_the_quantile(
        raw in prop::collection::vec(-1.0e6f64..1.0e6, 1..60),
    ) {
        let absolute =
            Float64Chunked::from_vec("amount".into(), raw.iter().map(|v| v.abs()).collect());
        let cap = quantile(&absolute, 0.99).unwrap().unwrap();

        let df = DataFrame::new(vec![Series::new("amount".into(), raw.clone()).into()]).unwrap();
        let outcome = normalize_amount(&df, "amount", 0.99).unwrap();
        let capped: Vec<f64> = outcome
            .frame
            .column("amount")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        let max = capped.iter().copied().fold(f64::MIN, f64::max);
        prop_assert!(max <= cap);
        prop_assert!(capped.iter().all(|v| *v >= 0.0));
    }
}
