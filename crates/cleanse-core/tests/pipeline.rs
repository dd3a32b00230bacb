use std::fs;
use std::path::{Path, PathBuf};

use cleanse_core::{PipelineManager, PipelineState, RecoveryAction};
use cleanse_model::{
    ErrorCategory, ErrorSeverity, InputConfig, PathsConfig, PipelineConfig, PipelineError,
};

fn config_in(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        paths: PathsConfig {
            output_dir: dir.join("processed"),
            error_log_dir: dir.join("errors"),
            report_dir: dir.join("reports"),
        },
        ..PipelineConfig::reference()
    }
}

fn write_input(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("transactions.csv");
    fs::write(&path, contents).expect("write input");
    path
}

const DUPLICATE_AND_BAD_KEY: &str = "\
transaction_id,customer_id,amount,transaction_date
1001,CUST-1001,150.00,2024-01-15 10:00:00
1001,CUST-1001,200.00,2024-01-16 11:30:00
1002,BADID,250.00,2024-01-15 12:00:00
";

const CLEAN: &str = "\
transaction_id,customer_id,amount,transaction_date
1,CUST-1,10.00,2024-01-01 09:00:00
2,CUST-2,20.00,2024-01-01 10:00:00
3,CUST-3,30.00,2024-01-01 11:00:00
";

#[test]
fn duplicate_and_bad_key_scenario() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_input(dir.path(), DUPLICATE_AND_BAD_KEY);
    let mut manager = PipelineManager::with_config(config_in(dir.path()));
    let result = manager.execute_pipeline(&input);

    let stats = result
        .metrics
        .transformation
        .as_ref()
        .expect("transformation stats");
    assert_eq!(stats.get("duplicates_removed"), 1);
    assert_eq!(stats.get("invalid_customer_ids"), 1);
    assert_eq!(stats.get("rows_final"), 2);

    // Completeness suffers from the nulled customer id, so the gate fails
    // without an error being handled.
    assert!(!result.success);
    assert_eq!(result.state, PipelineState::Failed);
    assert!(result.error.is_none());
    assert!(result.quality_score < 95.0);
    let outputs = result.output_paths.as_ref().expect("outputs written");
    assert_eq!(outputs.written().len(), 3);
    assert!(outputs.written().iter().all(|path| path.exists()));

    let csv = fs::read_to_string(outputs.csv.as_ref().unwrap()).unwrap();
    assert!(csv.contains("1001,CUST-1001,200"));
    assert!(!csv.contains(",150"));
}

#[test]
fn clean_input_passes_the_gate() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_input(dir.path(), CLEAN);
    let mut manager = PipelineManager::with_config(config_in(dir.path()));
    let result = manager.execute_pipeline(&input);

    assert!(result.success, "{result:?}");
    assert_eq!(result.state, PipelineState::Success);
    assert_eq!(result.quality_score, 100.0);
    assert_eq!(manager.state(), PipelineState::Success);
    let execution = &result.metrics.execution;
    assert_eq!(execution.pipeline_id, result.pipeline_id);
    assert!(execution.end_time.is_some());
    assert_eq!(execution.input_sha256.as_ref().map(String::len), Some(64));
    for phase in [
        "extraction",
        "validation",
        "transformation",
        "quality",
        "anomaly_detection",
        "loading",
    ] {
        assert!(execution.phases.contains_key(phase), "missing phase {phase}");
    }
    assert!(result.metrics.validation.as_ref().unwrap().overall_passed);
}

#[test]
fn missing_input_is_a_file_io_failure() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut manager = PipelineManager::with_config(config_in(dir.path()));
    let result = manager.execute_pipeline(&dir.path().join("does_not_exist.csv"));

    assert!(!result.success);
    assert_eq!(result.state, PipelineState::Failed);
    let error = result.error.as_ref().expect("handled error");
    assert_eq!(error.classification.category, ErrorCategory::FileIo);
    assert_eq!(error.classification.severity, ErrorSeverity::High);
    assert_eq!(error.action_taken, RecoveryAction::PipelineStopped);
    assert!(error.error_log.as_ref().is_some_and(|path| path.exists()));
    assert!(result.output_paths.is_none());
    assert!(result.metrics.transformation.is_none());
}

#[test]
fn missing_required_columns_is_structural() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_input(dir.path(), "customer_id,amount\nCUST-1,10.00\n");
    let mut manager = PipelineManager::with_config(config_in(dir.path()));
    let result = manager.execute_pipeline(&input);

    assert!(!result.success);
    let error = result.error.as_ref().expect("structural error, not a gate failure");
    assert_eq!(error.classification.category, ErrorCategory::DataIntegrity);
    assert_eq!(error.classification.error_type, "MissingColumns");
    assert!(error.classification.message.contains("transaction_id"));
    assert!(result.metrics.validation.is_none());
    assert!(result.output_paths.is_none());
}

#[test]
fn non_ascii_delimiter_fails_the_run_instead_of_truncating() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_input(dir.path(), CLEAN);
    let config = PipelineConfig {
        input: InputConfig { delimiter: '\u{00e9}' },
        ..config_in(dir.path())
    };
    let mut manager = PipelineManager::with_config(config);
    let result = manager.execute_pipeline(&input);

    assert!(!result.success);
    assert_eq!(result.state, PipelineState::Failed);
    let error = result.error.as_ref().expect("handled error");
    assert_eq!(error.classification.error_type, "ConfigError");
    assert!(error.classification.message.contains("input.delimiter"));
    assert_eq!(error.action_taken, RecoveryAction::PipelineStopped);
    assert!(result.metrics.execution.phases.is_empty());
    assert!(result.output_paths.is_none());
}

#[test]
fn report_is_written_for_every_run() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_input(dir.path(), CLEAN);
    let mut manager = PipelineManager::with_config(config_in(dir.path()));
    let result = manager.execute_pipeline(&input);

    let report_path = result.report_path.as_ref().expect("report path");
    assert_eq!(
        report_path,
        &dir.path()
            .join("reports")
            .join(format!("pipeline_report_{}.json", result.pipeline_id))
    );
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report_path).unwrap()).unwrap();
    for key in [
        "execution",
        "validation",
        "transformation",
        "quality",
        "anomalies",
        "output",
        "success",
        "quality_score",
    ] {
        assert!(report.get(key).is_some(), "report missing {key}");
    }
    assert!(report.get("error").is_none());

    let failed = manager.execute_pipeline(&dir.path().join("gone.csv"));
    assert_ne!(failed.pipeline_id, result.pipeline_id);
    let report: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(failed.report_path.as_ref().unwrap()).unwrap(),
    )
    .unwrap();
    assert_eq!(report["error"]["classification"]["category"], "file_io");
    assert_eq!(report["state"], "failed");
}

#[test]
fn identical_runs_produce_identical_statistics() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_input(dir.path(), DUPLICATE_AND_BAD_KEY);
    let mut first = PipelineManager::with_config(config_in(dir.path()));
    let mut second = PipelineManager::with_config(config_in(dir.path()));
    let a = first.execute_pipeline(&input);
    let b = second.execute_pipeline(&input);

    assert_ne!(a.pipeline_id, b.pipeline_id);
    assert_eq!(a.metrics.transformation, b.metrics.transformation);
    assert_eq!(a.metrics.quality, b.metrics.quality);
    assert_eq!(a.metrics.anomalies, b.metrics.anomalies);
    assert_eq!(a.metrics.validation, b.metrics.validation);
}

#[test]
fn config_errors_surface_from_new() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = PipelineManager::new(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, PipelineError::Config { .. }));
}

#[test]
fn new_resolves_paths_next_to_the_config() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config_path = dir.path().join("pipeline.toml");
    fs::write(
        &config_path,
        r#"
[paths]
output_dir = "out"

[cleaning]
primary_key = "transaction_id"
foreign_key = "customer_id"
foreign_key_pattern = "^CUST-\\d+$"
amount_column = "amount"
"#,
    )
    .unwrap();
    let manager = PipelineManager::new(&config_path).expect("load config");
    assert_eq!(manager.config().paths.output_dir, dir.path().join("out"));
    assert_eq!(manager.state(), PipelineState::Init);
    assert!(manager.pipeline_id().starts_with("pipeline_"));
}
