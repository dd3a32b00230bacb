use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const ROWS_INITIAL: &str = "rows_initial";
pub const INVALID_TRANSACTION_IDS: &str = "invalid_transaction_ids";
pub const INVALID_CUSTOMER_IDS: &str = "invalid_customer_ids";
pub const AMOUNTS_SIGN_CORRECTED: &str = "amounts_sign_corrected";
pub const INVALID_AMOUNTS: &str = "invalid_amounts";
pub const OUTLIERS_CAPPED: &str = "outliers_capped";
pub const INVALID_DATES: &str = "invalid_dates";
pub const DUPLICATES_REMOVED: &str = "duplicates_removed";
pub const ROWS_DROPPED_NULL_KEYS: &str = "rows_dropped_null_keys";
pub const ROWS_FINAL: &str = "rows_final";

/// Named counters accumulated by the transformer.
///
/// Counters are only ever increased; the ordered map keeps serialized output
/// stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CleaningStats(BTreeMap<String, u64>);

impl CleaningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, amount: usize) {
        *self.0.entry(name.to_string()).or_insert(0) += amount as u64;
    }

    pub fn get(&self, name: &str) -> u64 {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Timing and size of one phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseMetrics {
    pub duration_seconds: f64,
    pub records: usize,
    /// Phase-specific extras (column counts, issue counts, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, f64>,
}

impl PhaseMetrics {
    pub fn new(duration_seconds: f64, records: usize) -> Self {
        Self {
            duration_seconds,
            records,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, name: &str, value: f64) -> Self {
        self.extra.insert(name.to_string(), value);
        self
    }
}

/// Pipeline-level execution metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    pub pipeline_id: String,
    pub input_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_sha256: Option<String>,
    pub start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub duration_seconds: f64,
    pub rows_per_second: f64,
    pub phases: BTreeMap<String, PhaseMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let mut stats = CleaningStats::new();
        stats.add(DUPLICATES_REMOVED, 1);
        stats.add(DUPLICATES_REMOVED, 2);
        assert_eq!(stats.get(DUPLICATES_REMOVED), 3);
        assert_eq!(stats.get(INVALID_DATES), 0);
    }

    #[test]
    fn stats_serialize_as_flat_map() {
        let mut stats = CleaningStats::new();
        stats.add(ROWS_FINAL, 2);
        stats.add(DUPLICATES_REMOVED, 1);
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(json, r#"{"duplicates_removed":1,"rows_final":2}"#);
    }
}
