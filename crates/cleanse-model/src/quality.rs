use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-dimension score: the mean over columns plus each column's score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub overall: f64,
    pub by_column: BTreeMap<String, f64>,
}

/// Result of one cross-column arithmetic check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyCheck {
    pub expression: String,
    pub rows_checked: usize,
    pub violations: usize,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub completeness: DimensionScore,
    pub uniqueness: DimensionScore,
    pub validity: DimensionScore,
    /// Reported only; not part of `overall_score`.
    pub consistency: BTreeMap<String, ConsistencyCheck>,
    pub overall_score: f64,
}
