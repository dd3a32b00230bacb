//! Quality scoring of a cleaned frame.
//!
//! Every column is scored on three dimensions, each a percentage of the
//! frame's rows:
//!
//! - **completeness**: non-null values
//! - **uniqueness**: distinct non-null values (a cardinality ratio, so
//!   low-cardinality columns legitimately score low)
//! - **validity**: values satisfying the column's business rule
//!
//! `overall_score` is the unweighted mean of the three dimension means.
//! The optional consistency check is reported alongside but does not feed
//! the aggregate.

use std::collections::BTreeMap;
use std::time::Instant;

use polars::prelude::DataFrame;
use regex::Regex;
use tracing::{debug, info, info_span};

use cleanse_common::{distinct_non_null, f64_values, has_column, parse_i64, string_values};
use cleanse_model::{
    CleaningRules, ConsistencyCheck, ConsistencyRule, DimensionScore, PipelineError,
    QualityMetrics, Result,
};

/// Round a percentage for reporting, clamped to `[0, 100]`.
pub fn round_score(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value.clamp(0.0, 100.0) * 100.0).round() / 100.0
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn dimension(by_column: BTreeMap<String, f64>) -> DimensionScore {
    let raw: Vec<f64> = by_column.values().copied().collect();
    DimensionScore {
        overall: round_score(mean(&raw)),
        by_column: by_column
            .into_iter()
            .map(|(name, score)| (name, round_score(score)))
            .collect(),
    }
}

/// Computes [`QualityMetrics`] using the validity rules of a rule set.
#[derive(Debug, Clone)]
pub struct QualityScorer<'a> {
    rules: &'a CleaningRules,
    foreign_key_pattern: Regex,
}

impl<'a> QualityScorer<'a> {
    /// # Errors
    ///
    /// Returns [`PipelineError::ColumnType`] when the foreign key pattern does
    /// not compile.
    pub fn new(rules: &'a CleaningRules) -> Result<Self> {
        let foreign_key_pattern =
            Regex::new(&rules.foreign_key_pattern).map_err(|error| PipelineError::ColumnType {
                column: rules.foreign_key.clone(),
                message: format!("invalid pattern: {error}"),
            })?;
        Ok(Self {
            rules,
            foreign_key_pattern,
        })
    }

    /// Score every column of `df`. An empty frame scores 0 everywhere.
    pub fn score(&self, df: &DataFrame) -> Result<QualityMetrics> {
        let span = info_span!("quality", rows = df.height(), columns = df.width());
        let _guard = span.enter();
        let start = Instant::now();
        let rows = df.height();

        let mut completeness = BTreeMap::new();
        let mut uniqueness = BTreeMap::new();
        let mut validity = BTreeMap::new();
        for column in df.get_columns() {
            let name = column.name().to_string();
            let present = rows - column.null_count();
            completeness.insert(name.clone(), percentage(present, rows));
            uniqueness.insert(name.clone(), percentage(distinct_non_null(df, &name)?, rows));
            let valid = self.valid_count(df, &name)?;
            debug!(column = %name, present, valid, "column scored");
            validity.insert(name, percentage(valid, rows));
        }

        let completeness = dimension(completeness);
        let uniqueness = dimension(uniqueness);
        let validity = dimension(validity);
        let overall_score =
            round_score(mean(&[completeness.overall, uniqueness.overall, validity.overall]));

        let mut consistency = BTreeMap::new();
        if let Some(rule) = &self.rules.consistency
            && let Some(check) = check_consistency(df, rule)?
        {
            consistency.insert(rule.total.clone(), check);
        }

        info!(
            overall_score,
            completeness = completeness.overall,
            uniqueness = uniqueness.overall,
            validity = validity.overall,
            duration_ms = start.elapsed().as_millis(),
            "quality scored"
        );
        Ok(QualityMetrics {
            completeness,
            uniqueness,
            validity,
            consistency,
            overall_score,
        })
    }

    fn valid_count(&self, df: &DataFrame, name: &str) -> Result<usize> {
        let rules = self.rules;
        if name == rules.primary_key {
            let [min, max] = rules.id_range;
            let valid = string_values(df, name)?
                .iter()
                .flatten()
                .filter_map(|value| parse_i64(value))
                .filter(|id| (min..=max).contains(id))
                .count();
            return Ok(valid);
        }
        if name == rules.foreign_key {
            let valid = string_values(df, name)?
                .iter()
                .flatten()
                .filter(|value| self.foreign_key_pattern.is_match(value))
                .count();
            return Ok(valid);
        }
        if name == rules.amount_column {
            let valid = f64_values(df, name)?
                .iter()
                .flatten()
                .filter(|amount| **amount > 0.0)
                .count();
            return Ok(valid);
        }
        Ok(string_values(df, name)?.iter().flatten().count())
    }
}

/// Evaluate `unit_price * quantity ≈ total` over rows where all three are
/// numeric. `None` when any referenced column is absent.
pub fn check_consistency(df: &DataFrame, rule: &ConsistencyRule) -> Result<Option<ConsistencyCheck>> {
    if ![&rule.unit_price, &rule.quantity, &rule.total]
        .iter()
        .all(|name| has_column(df, name))
    {
        return Ok(None);
    }
    let prices = f64_values(df, &rule.unit_price)?;
    let quantities = f64_values(df, &rule.quantity)?;
    let totals = f64_values(df, &rule.total)?;

    let mut rows_checked = 0;
    let mut violations = 0;
    for ((price, quantity), total) in prices.iter().zip(&quantities).zip(&totals) {
        let (Some(price), Some(quantity), Some(total)) = (price, quantity, total) else {
            continue;
        };
        rows_checked += 1;
        if (price * quantity - total).abs() > rule.epsilon {
            violations += 1;
        }
    }
    Ok(Some(ConsistencyCheck {
        expression: format!("{} * {} = {}", rule.unit_price, rule.quantity, rule.total),
        rows_checked,
        violations,
        score: round_score(percentage(rows_checked - violations, rows_checked)),
    }))
}
