use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const STATISTICAL_OUTLIERS: &str = "statistical_outliers";
pub const MISSING_PATTERNS: &str = "missing_patterns";
pub const DUPLICATE_KEYS: &str = "duplicate_keys";
pub const TEMPORAL_ANOMALIES: &str = "temporal_anomalies";

/// Outcome of a single anomaly check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyCheck {
    pub count: usize,
    /// Check-specific breakdown, e.g. per-column counts or sub-check counts.
    pub details: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub total_anomalies_detected: usize,
    pub anomaly_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    #[serde(flatten)]
    pub checks: BTreeMap<String, AnomalyCheck>,
    pub summary: AnomalySummary,
}

impl AnomalyReport {
    pub fn check(&self, name: &str) -> Option<&AnomalyCheck> {
        self.checks.get(name)
    }

    /// Sum all check counts into the summary.
    pub fn summarize(mut self, row_count: usize) -> Self {
        let total: usize = self.checks.values().map(|check| check.count).sum();
        let rate = if row_count == 0 {
            0.0
        } else {
            total as f64 / row_count as f64 * 100.0
        };
        self.summary = AnomalySummary {
            total_anomalies_detected: total,
            anomaly_rate: rate,
        };
        self
    }
}
