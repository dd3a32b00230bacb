//! Classification and persistence of pipeline errors.
//!
//! Errors are classified by variant. Variants carrying an opaque payload
//! (dataframe errors, panics) fall back to keyword matching over their type
//! name and message. The recommended recovery action is data only: nothing
//! here retries or resumes a phase.

use std::error::Error as _;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use cleanse_model::{ErrorCategory, ErrorSeverity, PipelineError};
use cleanse_output::{error_file_name, write_document};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorClassification {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    pub severity: ErrorSeverity,
    pub category: ErrorCategory,
}

/// Recommended reaction to a classified error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    PipelineStopped,
    DefaultValuesApplied,
    RetryScheduled,
    LoggedAndContinued,
}

impl RecoveryAction {
    /// High severity stops; then data-type, then file I/O, else continue.
    pub fn recommend(classification: &ErrorClassification) -> Self {
        if classification.severity == ErrorSeverity::High {
            Self::PipelineStopped
        } else if classification.category == ErrorCategory::DataType {
            Self::DefaultValuesApplied
        } else if classification.category == ErrorCategory::FileIo {
            Self::RetryScheduled
        } else {
            Self::LoggedAndContinued
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PipelineStopped => "pipeline_stopped",
            Self::DefaultValuesApplied => "default_values_applied",
            Self::RetryScheduled => "retry_scheduled",
            Self::LoggedAndContinued => "logged_and_continued",
        }
    }
}

/// Persisted error record (`error_{pipeline_id}.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub timestamp: String,
    pub pipeline_id: String,
    pub error: ErrorClassification,
    pub action_taken: RecoveryAction,
    pub traceback: Vec<String>,
}

/// What the caller learns about a handled error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandledError {
    pub classification: ErrorClassification,
    pub action_taken: RecoveryAction,
    /// Location of the persisted record; `None` when persisting failed.
    pub error_log: Option<PathBuf>,
}

/// Category and severity from keywords in an error's text.
pub fn keyword_classification(text: &str) -> (ErrorCategory, ErrorSeverity) {
    let text = text.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|word| text.contains(word));
    if has(&["file", "not found"]) {
        (ErrorCategory::FileIo, ErrorSeverity::High)
    } else if has(&["memory", "size"]) {
        (ErrorCategory::Resource, ErrorSeverity::High)
    } else if has(&["type", "cast"]) {
        (ErrorCategory::DataType, ErrorSeverity::Medium)
    } else if has(&["key", "index"]) {
        (ErrorCategory::DataIntegrity, ErrorSeverity::Medium)
    } else {
        (ErrorCategory::Unknown, ErrorSeverity::Medium)
    }
}

pub fn classify_error(err: &PipelineError) -> ErrorClassification {
    let error_type = err.type_name().to_string();
    let message = err.to_string();
    let (category, severity) = err
        .tagged_classification()
        .unwrap_or_else(|| keyword_classification(&format!("{error_type} {message}")));
    ErrorClassification {
        error_type,
        message,
        severity,
        category,
    }
}

/// The error followed by each of its sources.
pub fn source_chain(err: &PipelineError) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}

/// Classifies errors and writes error records into a log directory.
#[derive(Debug, Clone)]
pub struct ErrorHandler {
    error_log_dir: PathBuf,
}

impl ErrorHandler {
    pub fn new(error_log_dir: impl Into<PathBuf>) -> Self {
        Self {
            error_log_dir: error_log_dir.into(),
        }
    }

    /// Classify `err`, persist its record and log it. Never fails: a record
    /// that cannot be written is logged and reported as `error_log: None`.
    pub fn handle_error(&self, err: &PipelineError, pipeline_id: &str) -> HandledError {
        self.handle_error_with_backtrace(err, pipeline_id, None)
    }

    /// Like [`ErrorHandler::handle_error`], with the captured backtrace
    /// frames appended to the record's traceback.
    pub fn handle_error_with_backtrace(
        &self,
        err: &PipelineError,
        pipeline_id: &str,
        backtrace: Option<&str>,
    ) -> HandledError {
        let classification = classify_error(err);
        let action_taken = RecoveryAction::recommend(&classification);
        let mut traceback = source_chain(err);
        if let Some(backtrace) = backtrace {
            traceback.extend(
                backtrace
                    .lines()
                    .map(str::trim_end)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string),
            );
        }
        let record = ErrorRecord {
            timestamp: Utc::now().to_rfc3339(),
            pipeline_id: pipeline_id.to_string(),
            error: classification.clone(),
            action_taken,
            traceback,
        };

        error!(
            pipeline_id,
            error_type = %classification.error_type,
            category = classification.category.as_str(),
            severity = classification.severity.as_str(),
            action = action_taken.as_str(),
            "{}",
            classification.message
        );

        let error_log = match write_document(
            &self.error_log_dir,
            &error_file_name(pipeline_id),
            &record,
        ) {
            Ok(path) => Some(path),
            Err(persist_error) => {
                warn!(
                    pipeline_id,
                    error = %persist_error,
                    "failed to persist error record"
                );
                None
            }
        };

        HandledError {
            classification,
            action_taken,
            error_log,
        }
    }
}
