//! Pipeline orchestration with explicit phases.
//!
//! The manager runs the phases in order:
//! 1. **Extract**: read the delimited input and check the minimal columns
//! 2. **Validate**: advisory check against the declared column contract
//! 3. **Transform**: apply the cleaning rule set
//! 4. **Score**: completeness, uniqueness, validity and consistency
//! 5. **Detect**: anomaly checks over the cleaned frame
//! 6. **Load**: write the cleaned dataset and its summary
//!
//! Structural errors and panics are caught once, here, routed through the
//! [`ErrorHandler`] and turned into a failed [`PipelineResult`]. A run that
//! completes below the quality gate is also unsuccessful but is a normal
//! outcome, not an error.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use cleanse_ingest::{Extractor, compute_file_hash, missing_columns};
use cleanse_model::{
    AnomalyReport, CleaningStats, ExecutionMetrics, OutputPaths, PhaseMetrics, PipelineConfig,
    PipelineError, QualityMetrics, Result, ValidationResult,
};
use cleanse_output::{Loader, report_file_name, write_document};
use cleanse_quality::{AnomalyDetector, QualityScorer};
use cleanse_transform::Transformer;
use cleanse_validate::SchemaValidator;

use crate::error_handler::{ErrorHandler, HandledError};
use crate::panic::catch_panic;
use crate::state::PipelineState;

/// Everything measured during one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetrics {
    pub execution: ExecutionMetrics,
    pub validation: Option<ValidationResult>,
    pub transformation: Option<CleaningStats>,
    pub quality: Option<QualityMetrics>,
    pub anomalies: Option<AnomalyReport>,
}

/// Value returned by [`PipelineManager::execute_pipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub pipeline_id: String,
    pub success: bool,
    pub state: PipelineState,
    pub quality_score: f64,
    pub metrics: PipelineMetrics,
    pub output_paths: Option<OutputPaths>,
    pub error: Option<HandledError>,
    pub report_path: Option<PathBuf>,
}

/// Persisted execution report (`pipeline_report_{id}.json`).
#[derive(Debug, Serialize)]
struct ExecutionReport<'a> {
    pipeline_id: &'a str,
    state: PipelineState,
    success: bool,
    quality_score: f64,
    #[serde(flatten)]
    metrics: &'a PipelineMetrics,
    output: Option<&'a OutputPaths>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a HandledError>,
}

/// `pipeline_{YYYYmmdd_HHMMSS}_{8 hex}`
pub fn new_pipeline_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "pipeline_{}_{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        &suffix[..8]
    )
}

/// Orchestrates one pipeline run at a time.
#[derive(Debug)]
pub struct PipelineManager {
    config: PipelineConfig,
    pipeline_id: String,
    state: PipelineState,
    metrics: PipelineMetrics,
    output_paths: Option<OutputPaths>,
    error: Option<HandledError>,
    success: bool,
    quality_score: f64,
    error_handler: ErrorHandler,
}

impl PipelineManager {
    /// Load the configuration at `config_path`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] when the file is missing, malformed or
    /// fails validation. There is no run to report into yet, so this is the
    /// only error surfaced to callers.
    pub fn new(config_path: &Path) -> Result<Self> {
        let config = PipelineConfig::load(config_path)?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        let error_handler = ErrorHandler::new(&config.paths.error_log_dir);
        let pipeline_id = new_pipeline_id();
        debug!(pipeline_id = %pipeline_id, "pipeline created");
        Self {
            config,
            pipeline_id,
            state: PipelineState::Init,
            metrics: PipelineMetrics::default(),
            output_paths: None,
            error: None,
            success: false,
            quality_score: 0.0,
            error_handler,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Run every phase over `input`. Never returns an error and never
    /// panics outward; failures are reported in the result.
    pub fn execute_pipeline(&mut self, input: &Path) -> PipelineResult {
        self.execute_with(input, Self::run_phases)
    }

    fn execute_with<F>(&mut self, input: &Path, phases: F) -> PipelineResult
    where
        F: FnOnce(&mut Self, &Path) -> Result<f64>,
    {
        self.reset();
        let span = info_span!("pipeline", pipeline_id = %self.pipeline_id);
        let _guard = span.enter();
        let start = Instant::now();
        self.metrics.execution = ExecutionMetrics {
            pipeline_id: self.pipeline_id.clone(),
            input_file: input.display().to_string(),
            start_time: Utc::now().to_rfc3339(),
            ..ExecutionMetrics::default()
        };
        info!(input = %input.display(), "pipeline started");

        match catch_panic(|| phases(self, input)) {
            Ok(Ok(quality_score)) => self.finish(quality_score),
            Ok(Err(error)) => self.fail(&error, None),
            Err(caught) => self.fail(
                &PipelineError::Panic(caught.message),
                caught.backtrace.as_deref(),
            ),
        }

        self.finalize_execution_metrics(start);
        let report_path = match self.generate_report() {
            Ok(path) => Some(path),
            Err(error) => {
                warn!(error = %error, "failed to write execution report");
                None
            }
        };
        info!(
            success = self.success,
            state = %self.state,
            quality_score = self.quality_score,
            duration_seconds = self.metrics.execution.duration_seconds,
            "pipeline finished"
        );

        PipelineResult {
            pipeline_id: self.pipeline_id.clone(),
            success: self.success,
            state: self.state,
            quality_score: self.quality_score,
            metrics: self.metrics.clone(),
            output_paths: self.output_paths.clone(),
            error: self.error.clone(),
            report_path,
        }
    }

    /// Write the execution report for the current run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Storage`] when the report directory or file
    /// cannot be written.
    pub fn generate_report(&self) -> Result<PathBuf> {
        let report = ExecutionReport {
            pipeline_id: &self.pipeline_id,
            state: self.state,
            success: self.success,
            quality_score: self.quality_score,
            metrics: &self.metrics,
            output: self.output_paths.as_ref(),
            error: self.error.as_ref(),
        };
        write_document(
            &self.config.paths.report_dir,
            &report_file_name(&self.pipeline_id),
            &report,
        )
    }

    fn reset(&mut self) {
        if self.state != PipelineState::Init {
            self.pipeline_id = new_pipeline_id();
        }
        self.state = PipelineState::Init;
        self.metrics = PipelineMetrics::default();
        self.output_paths = None;
        self.error = None;
        self.success = false;
        self.quality_score = 0.0;
    }

    fn transition(&mut self, next: PipelineState) {
        info!(from = %self.state, to = %next, "state transition");
        self.state = next;
    }

    fn record_phase(&mut self, phase: PipelineState, metrics: PhaseMetrics) {
        if let Some(name) = phase.phase_name() {
            debug!(
                phase = name,
                records = metrics.records,
                duration_seconds = metrics.duration_seconds,
                "phase complete"
            );
            self.metrics
                .execution
                .phases
                .insert(name.to_string(), metrics);
        }
    }

    fn run_phases(&mut self, input: &Path) -> Result<f64> {
        let config = self.config.clone();
        let rules = &config.cleaning;

        let delimiter = config.input.delimiter_byte().ok_or_else(|| {
            PipelineError::config(
                "input.delimiter",
                format!("{:?} is not a single ASCII character", config.input.delimiter),
            )
        })?;

        // Extract
        self.transition(PipelineState::Extracting);
        let start = Instant::now();
        let extractor = Extractor::new(delimiter);
        let raw = extractor.extract(input)?;
        self.metrics.execution.input_sha256 = compute_file_hash(input).ok();
        let required = rules.required_columns();
        if !extractor.validate_schema(&raw, &required) {
            return Err(PipelineError::missing_columns(missing_columns(
                &raw, &required,
            )));
        }
        self.record_phase(
            PipelineState::Extracting,
            PhaseMetrics::new(start.elapsed().as_secs_f64(), raw.height())
                .with_extra("columns", raw.width() as f64),
        );

        // Validate
        self.transition(PipelineState::Validating);
        let start = Instant::now();
        let validation = SchemaValidator::new(&config.schema)
            .with_date_formats(&rules.date_formats)
            .validate(&raw);
        if !validation.overall_passed {
            warn!(
                issues = validation.issue_count(),
                "schema validation failed, continuing"
            );
        }
        self.record_phase(
            PipelineState::Validating,
            PhaseMetrics::new(start.elapsed().as_secs_f64(), raw.height())
                .with_extra("issues", validation.issue_count() as f64),
        );
        self.metrics.validation = Some(validation);

        // Transform
        self.transition(PipelineState::Transforming);
        let start = Instant::now();
        let transformed = Transformer::new(rules)?.transform(&raw)?;
        let cleaned = transformed.frame;
        self.record_phase(
            PipelineState::Transforming,
            PhaseMetrics::new(start.elapsed().as_secs_f64(), cleaned.height())
                .with_extra("rows_initial", raw.height() as f64),
        );
        self.metrics.transformation = Some(transformed.stats.clone());

        // Score
        self.transition(PipelineState::Scoring);
        let start = Instant::now();
        let quality = QualityScorer::new(rules)?.score(&cleaned)?;
        let quality_score = quality.overall_score;
        self.record_phase(
            PipelineState::Scoring,
            PhaseMetrics::new(start.elapsed().as_secs_f64(), cleaned.height())
                .with_extra("overall_score", quality_score),
        );
        self.metrics.quality = Some(quality);

        // Detect
        self.transition(PipelineState::DetectingAnomalies);
        let start = Instant::now();
        let anomalies = AnomalyDetector::new(rules, &config.anomaly).detect(&cleaned)?;
        self.record_phase(
            PipelineState::DetectingAnomalies,
            PhaseMetrics::new(start.elapsed().as_secs_f64(), cleaned.height()).with_extra(
                "anomalies",
                anomalies.summary.total_anomalies_detected as f64,
            ),
        );
        self.metrics.anomalies = Some(anomalies);

        // Load
        self.transition(PipelineState::Loading);
        let start = Instant::now();
        let paths = Loader::new(&config.paths.output_dir).load(
            &cleaned,
            &transformed.stats,
            &self.pipeline_id,
        )?;
        self.record_phase(
            PipelineState::Loading,
            PhaseMetrics::new(start.elapsed().as_secs_f64(), cleaned.height())
                .with_extra("files", paths.written().len() as f64),
        );
        self.output_paths = Some(paths);

        Ok(quality_score)
    }

    fn finish(&mut self, quality_score: f64) {
        let gate = self.config.quality.gate;
        self.quality_score = quality_score;
        self.success = quality_score >= gate;
        if self.success {
            self.transition(PipelineState::Success);
        } else {
            warn!(quality_score, gate, "quality gate not met");
            self.transition(PipelineState::Failed);
        }
    }

    fn fail(&mut self, error: &PipelineError, backtrace: Option<&str>) {
        let failed_in = self.state;
        self.transition(PipelineState::Failed);
        warn!(phase = %failed_in, "phase failed");
        self.success = false;
        self.error = Some(self.error_handler.handle_error_with_backtrace(
            error,
            &self.pipeline_id,
            backtrace,
        ));
    }

    fn finalize_execution_metrics(&mut self, start: Instant) {
        let execution = &mut self.metrics.execution;
        let duration = start.elapsed().as_secs_f64();
        execution.end_time = Some(Utc::now().to_rfc3339());
        execution.duration_seconds = duration;
        let rows = execution
            .phases
            .get("extraction")
            .map_or(0, |phase| phase.records);
        execution.rows_per_second = if duration > 0.0 {
            rows as f64 / duration
        } else {
            0.0
        };
    }
}
