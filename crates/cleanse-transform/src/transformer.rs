//! The ordered cleaning rule set.
//!
//! Steps run in a fixed order and each one takes the previous frame by
//! reference and returns a new one:
//!
//! 1. primary key coerced to `Int64`
//! 2. foreign key checked against its pattern
//! 3. amount made numeric, non-negative and capped
//! 4. timestamp parsed with format fallback (when the column exists)
//! 5. duplicates on the primary key removed, keeping the last row
//! 6. rows missing the primary key or amount dropped
//!
//! Per-value problems are counted in [`CleaningStats`]; only an absent
//! referenced column raises.

use std::time::Instant;

use polars::prelude::DataFrame;
use regex::Regex;
use tracing::{debug, info, info_span};

use cleanse_common::has_column;
use cleanse_model::metrics::{
    AMOUNTS_SIGN_CORRECTED, DUPLICATES_REMOVED, INVALID_AMOUNTS, INVALID_CUSTOMER_IDS,
    INVALID_DATES, INVALID_TRANSACTION_IDS, OUTLIERS_CAPPED, ROWS_DROPPED_NULL_KEYS, ROWS_FINAL,
    ROWS_INITIAL,
};
use cleanse_model::{CleaningRules, CleaningStats, PipelineError, Result};

use crate::amount::normalize_amount;
use crate::datetime::parse_dates;
use crate::dedupe::{dedupe_keep_last, drop_null_rows};
use crate::identifiers::{coerce_identifier, enforce_pattern};

/// Cleaned frame plus the counters describing what changed.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub frame: DataFrame,
    pub stats: CleaningStats,
}

/// Applies a [`CleaningRules`] set to frames.
#[derive(Debug, Clone)]
pub struct Transformer<'a> {
    rules: &'a CleaningRules,
    foreign_key_pattern: Regex,
}

impl<'a> Transformer<'a> {
    /// # Errors
    ///
    /// Returns [`PipelineError::ColumnType`] when the foreign key pattern does
    /// not compile. Loaded configurations are validated earlier, so this only
    /// triggers for hand-built rule sets.
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

    /// Run every cleaning step over `df`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingColumns`] when the primary key, foreign
    /// key or amount column is absent.
    pub fn transform(&self, df: &DataFrame) -> Result<TransformOutput> {
        let span = info_span!("transform", rows = df.height());
        let _guard = span.enter();
        let start = Instant::now();
        let rules = self.rules;

        let missing: Vec<&str> = [
            rules.primary_key.as_str(),
            rules.foreign_key.as_str(),
            rules.amount_column.as_str(),
        ]
        .into_iter()
        .filter(|name| !has_column(df, name))
        .collect();
        if !missing.is_empty() {
            return Err(PipelineError::missing_columns(missing));
        }

        let mut stats = CleaningStats::new();
        stats.add(ROWS_INITIAL, df.height());

        let (frame, invalid) = coerce_identifier(df, &rules.primary_key)?;
        stats.add(INVALID_TRANSACTION_IDS, invalid);
        debug!(column = %rules.primary_key, invalid, "identifiers coerced");

        let (frame, invalid) =
            enforce_pattern(&frame, &rules.foreign_key, &self.foreign_key_pattern)?;
        stats.add(INVALID_CUSTOMER_IDS, invalid);
        debug!(column = %rules.foreign_key, invalid, "foreign keys checked");

        let amount = normalize_amount(&frame, &rules.amount_column, rules.amount_cap_quantile)?;
        stats.add(AMOUNTS_SIGN_CORRECTED, amount.sign_corrected);
        stats.add(INVALID_AMOUNTS, amount.invalid);
        stats.add(OUTLIERS_CAPPED, amount.capped);
        debug!(
            column = %rules.amount_column,
            sign_corrected = amount.sign_corrected,
            invalid = amount.invalid,
            capped = amount.capped,
            cap = amount.cap,
            "amounts normalized"
        );
        let mut frame = amount.frame;

        if let Some(date_column) = rules.date_column.as_deref()
            && has_column(&frame, date_column)
        {
            let dates = parse_dates(&frame, date_column, &rules.date_formats)?;
            stats.add(INVALID_DATES, dates.invalid);
            frame = dates.frame;
        } else {
            debug!("no timestamp column, date parsing skipped");
        }

        let (frame, removed) = dedupe_keep_last(&frame, &rules.primary_key)?;
        stats.add(DUPLICATES_REMOVED, removed);

        let (frame, dropped) =
            drop_null_rows(&frame, &[rules.primary_key.as_str(), rules.amount_column.as_str()])?;
        stats.add(ROWS_DROPPED_NULL_KEYS, dropped);
        stats.add(ROWS_FINAL, frame.height());

        info!(
            rows_initial = df.height(),
            rows_final = frame.height(),
            duplicates_removed = removed,
            rows_dropped = dropped,
            duration_ms = start.elapsed().as_millis(),
            "transform complete"
        );
        Ok(TransformOutput { frame, stats })
    }
}
