//! Scoring and detection phases.
//!
//! - **metrics**: completeness, uniqueness, validity and consistency scores
//! - **anomaly**: outlier, missing-pattern, duplicate-key and temporal checks

pub mod anomaly;
pub mod metrics;

pub use anomaly::AnomalyDetector;
pub use metrics::{QualityScorer, check_consistency, round_score};
