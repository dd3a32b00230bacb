//! Data model for the cleansing pipeline.
//!
//! - **config**: typed rule set, column contract and thresholds
//! - **error**: the tagged error hierarchy raised by every phase
//! - **validation**, **quality**, **anomaly**, **metrics**: per-phase results
//! - **output**: artifact paths produced by the loader

pub mod anomaly;
pub mod config;
pub mod error;
pub mod metrics;
pub mod output;
pub mod quality;
pub mod validation;

pub use anomaly::{AnomalyCheck, AnomalyReport, AnomalySummary};
pub use config::{
    AnomalyConfig, CleaningRules, ColumnConstraint, ColumnContract, ConsistencyRule, DataSchema,
    DeclaredType, InputConfig, PathsConfig, PipelineConfig, QualityConfig, default_date_formats,
};
pub use error::{ErrorCategory, ErrorSeverity, PipelineError, Result};
pub use metrics::{CleaningStats, ExecutionMetrics, PhaseMetrics};
pub use output::OutputPaths;
pub use quality::{ConsistencyCheck, DimensionScore, QualityMetrics};
pub use validation::{ColumnErrors, ColumnPresence, ValidationResult};
