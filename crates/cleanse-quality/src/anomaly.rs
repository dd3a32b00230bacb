//! Anomaly detection over a cleaned frame.

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use chrono::{NaiveDateTime, Utc};
use polars::prelude::{DataFrame, DataType, Float64Chunked, NewChunkedArray};
use tracing::{debug, info, info_span};

use cleanse_common::{
    f64_values, has_column, i64_values, is_datetime_dtype, is_numeric_dtype, median,
    median_absolute_deviation, modified_z_score, parse_any, parse_f64, string_values,
    to_epoch_millis,
};
use cleanse_model::anomaly::{
    DUPLICATE_KEYS, MISSING_PATTERNS, STATISTICAL_OUTLIERS, TEMPORAL_ANOMALIES,
};
use cleanse_model::{AnomalyCheck, AnomalyConfig, AnomalyReport, CleaningRules, Result};

/// Runs the outlier, missing-pattern, duplicate-key and temporal checks.
#[derive(Debug, Clone)]
pub struct AnomalyDetector<'a> {
    rules: &'a CleaningRules,
    config: &'a AnomalyConfig,
    reference_time: NaiveDateTime,
}

impl<'a> AnomalyDetector<'a> {
    pub fn new(rules: &'a CleaningRules, config: &'a AnomalyConfig) -> Self {
        Self {
            rules,
            config,
            reference_time: Utc::now().naive_utc(),
        }
    }

    /// Timestamps after `time` count as future timestamps.
    pub fn with_reference_time(mut self, time: NaiveDateTime) -> Self {
        self.reference_time = time;
        self
    }

    pub fn detect(&self, df: &DataFrame) -> Result<AnomalyReport> {
        let span = info_span!("anomaly_detection", rows = df.height());
        let _guard = span.enter();
        let start = Instant::now();

        let mut report = AnomalyReport::default();
        report
            .checks
            .insert(STATISTICAL_OUTLIERS.to_string(), self.statistical_outliers(df)?);
        report
            .checks
            .insert(MISSING_PATTERNS.to_string(), self.missing_patterns(df));
        if let Some(check) = self.duplicate_keys(df)? {
            report.checks.insert(DUPLICATE_KEYS.to_string(), check);
        }
        if let Some(check) = self.temporal_anomalies(df)? {
            report.checks.insert(TEMPORAL_ANOMALIES.to_string(), check);
        }
        let report = report.summarize(df.height());

        info!(
            total = report.summary.total_anomalies_detected,
            rate = report.summary.anomaly_rate,
            duration_ms = start.elapsed().as_millis(),
            "anomaly detection complete"
        );
        Ok(report)
    }

    fn is_identifier(&self, name: &str) -> bool {
        name == self.rules.primary_key || name == self.rules.foreign_key
    }

    /// Modified z-score outliers per numeric, non-identifier column.
    fn statistical_outliers(&self, df: &DataFrame) -> Result<AnomalyCheck> {
        let mut check = AnomalyCheck::default();
        for column in df.get_columns() {
            let name = column.name().as_str();
            if self.is_identifier(name) {
                continue;
            }
            let Some(values) = numeric_values(df, name, column.dtype())? else {
                continue;
            };
            let values = Float64Chunked::from_vec(name.into(), values);
            let Some(center) = median(&values) else {
                continue;
            };
            let Some(mad) = median_absolute_deviation(&values, center) else {
                continue;
            };
            if mad == 0.0 {
                debug!(column = name, "zero MAD, outlier check skipped");
                check.details.insert(format!("{name}.mad_zero"), 1.0);
                continue;
            }
            let flagged = values
                .into_no_null_iter()
                .filter(|value| {
                    modified_z_score(*value, center, mad).abs() > self.config.zscore_threshold
                })
                .count();
            if flagged > 0 {
                check.count += flagged;
                check.details.insert(name.to_string(), flagged as f64);
            }
        }
        Ok(check)
    }

    /// Columns whose null rate exceeds the threshold; details hold the rate.
    fn missing_patterns(&self, df: &DataFrame) -> AnomalyCheck {
        let mut check = AnomalyCheck::default();
        let rows = df.height();
        if rows == 0 {
            return check;
        }
        for column in df.get_columns() {
            let rate = column.null_count() as f64 / rows as f64;
            if rate > self.config.missing_threshold {
                check.count += 1;
                check.details.insert(column.name().to_string(), rate);
            }
        }
        check
    }

    /// Rows repeating an earlier row's primary key.
    fn duplicate_keys(&self, df: &DataFrame) -> Result<Option<AnomalyCheck>> {
        let key = &self.rules.primary_key;
        if !has_column(df, key) {
            return Ok(None);
        }
        let mut seen = HashSet::new();
        let mut repeated = HashSet::new();
        let mut check = AnomalyCheck::default();
        for value in string_values(df, key)?.into_iter().flatten() {
            if !seen.insert(value.clone()) {
                check.count += 1;
                repeated.insert(value);
            }
        }
        if check.count > 0 {
            check
                .details
                .insert("distinct_keys".to_string(), repeated.len() as f64);
        }
        Ok(Some(check))
    }

    /// Rapid succession between sorted timestamps and timestamps in the
    /// future. `None` without a timestamp column.
    fn temporal_anomalies(&self, df: &DataFrame) -> Result<Option<AnomalyCheck>> {
        let Some(name) = self.rules.date_column.as_deref() else {
            return Ok(None);
        };
        let Ok(column) = df.column(name) else {
            return Ok(None);
        };
        let mut millis: Vec<i64> = if is_datetime_dtype(column.dtype()) {
            i64_values(df, name)?.into_iter().flatten().collect()
        } else {
            string_values(df, name)?
                .iter()
                .flatten()
                .filter_map(|value| parse_any(value, &self.rules.date_formats))
                .map(to_epoch_millis)
                .collect()
        };
        millis.sort_unstable();

        let window = self.config.rapid_succession_seconds.saturating_mul(1000);
        let rapid = millis
            .windows(2)
            .filter(|pair| pair[1] - pair[0] < window)
            .count();
        let now = to_epoch_millis(self.reference_time);
        let future = millis.iter().filter(|ts| **ts > now).count();

        let mut details = BTreeMap::new();
        details.insert("rapid_succession".to_string(), rapid as f64);
        details.insert("future_timestamps".to_string(), future as f64);
        Ok(Some(AnomalyCheck {
            count: rapid + future,
            details,
        }))
    }
}

/// Present values of a numeric column. String columns count as numeric when
/// every present value parses as a number.
fn numeric_values(df: &DataFrame, name: &str, dtype: &DataType) -> Result<Option<Vec<f64>>> {
    if is_numeric_dtype(dtype) {
        let values: Vec<f64> = f64_values(df, name)?
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .collect();
        return Ok((!values.is_empty()).then_some(values));
    }
    if !matches!(dtype, DataType::String) {
        return Ok(None);
    }
    let raw = string_values(df, name)?;
    let mut values = Vec::with_capacity(raw.len());
    for value in raw.iter().flatten() {
        let Some(number) = parse_f64(value) else {
            return Ok(None);
        };
        values.push(number);
    }
    Ok((!values.is_empty()).then_some(values))
}
