use std::fs;

use polars::prelude::*;

use cleanse_model::{CleaningStats, PipelineError};
use cleanse_output::{DatasetSummary, Loader, report_file_name, write_document};

fn cleaned() -> DataFrame {
    DataFrame::new(vec![
        Series::new("transaction_id".into(), vec![1001i64, 1002]).into(),
        Series::new("customer_id".into(), vec![Some("CUST-1"), None]).into(),
        Series::new("amount".into(), vec![200.0f64, 249.0]).into(),
    ])
    .unwrap()
}

fn stats() -> CleaningStats {
    let mut stats = CleaningStats::new();
    stats.add("rows_initial", 3);
    stats.add("rows_final", 2);
    stats
}

#[test]
fn writes_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let loader = Loader::new(dir.path().join("processed"));
    let paths = loader.load(&cleaned(), &stats(), "pipeline_test").unwrap();

    assert_eq!(paths.written().len(), 3);
    let parquet = paths.parquet.as_ref().unwrap();
    assert!(parquet.ends_with("cleaned_pipeline_test.parquet"));
    let file = fs::File::open(parquet).unwrap();
    let round_trip = ParquetReader::new(file).finish().unwrap();
    assert_eq!(round_trip.height(), 2);

    let csv = fs::read_to_string(paths.csv.as_ref().unwrap()).unwrap();
    assert!(csv.starts_with("transaction_id,customer_id,amount\n"));
    assert!(csv.contains("1001,CUST-1,200"));

    let summary: DatasetSummary =
        serde_json::from_str(&fs::read_to_string(paths.summary.as_ref().unwrap()).unwrap())
            .unwrap();
    assert_eq!(summary.rows_processed, 2);
    assert_eq!(summary.cleaning_stats.get("rows_initial"), 3);
    let customer = &summary.column_summary["customer_id"];
    assert_eq!(customer.null_count, 1);
    assert_eq!(customer.unique_count, 1);
    assert_eq!(summary.column_summary["amount"].dtype, "f64");
}

#[test]
fn unwritable_directory_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, "file").unwrap();
    let loader = Loader::new(blocker.join("processed"));
    let err = loader
        .load(&cleaned(), &stats(), "pipeline_test")
        .unwrap_err();
    assert!(matches!(err, PipelineError::Storage { .. }));
}

#[test]
fn documents_end_with_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(
        dir.path(),
        &report_file_name("pipeline_x"),
        &serde_json::json!({"success": true}),
    )
    .unwrap();
    assert!(path.ends_with("pipeline_report_pipeline_x.json"));
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.ends_with("}\n"));
}
