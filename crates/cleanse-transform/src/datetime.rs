//! Timestamp parsing with an ordered format fallback.
//!
//! The first format that parses at least one value wins and is applied to
//! the whole column. Mixing formats inside one column is treated as a data
//! problem: the values the chosen format cannot read become null.

use polars::prelude::{DataFrame, DataType, IntoColumn, NamedFrom, Series, TimeUnit};
use tracing::debug;

use cleanse_common::{
    is_datetime_dtype, parse_with_format, require_column, string_values, to_epoch_millis,
    with_replaced_column,
};
use cleanse_model::Result;

/// Outcome of parsing a timestamp column.
#[derive(Debug, Clone)]
pub struct DateOutcome {
    pub frame: DataFrame,
    /// Present values left unparsed.
    pub invalid: usize,
    /// The format applied, `None` when none matched or the column was
    /// already temporal.
    pub format: Option<String>,
}

fn datetime_ms() -> DataType {
    DataType::Datetime(TimeUnit::Milliseconds, None)
}

/// Parse `column` into `Datetime(Milliseconds)`.
pub fn parse_dates(df: &DataFrame, column: &str, formats: &[String]) -> Result<DateOutcome> {
    let existing = require_column(df, column)?;
    if is_datetime_dtype(existing.dtype()) {
        let casted = existing.cast(&datetime_ms())?;
        return Ok(DateOutcome {
            frame: with_replaced_column(df, casted)?,
            invalid: 0,
            format: None,
        });
    }

    let raw = string_values(df, column)?;
    let chosen = formats.iter().find(|format| {
        raw.iter()
            .flatten()
            .any(|value| parse_with_format(value, format).is_some())
    });

    let mut invalid = 0;
    let millis: Vec<Option<i64>> = raw
        .iter()
        .map(|value| {
            let value = value.as_deref()?;
            let parsed = chosen
                .and_then(|format| parse_with_format(value, format))
                .map(to_epoch_millis);
            if parsed.is_none() {
                invalid += 1;
            }
            parsed
        })
        .collect();
    debug!(
        column,
        format = chosen.map(String::as_str),
        invalid,
        "dates parsed"
    );

    let parsed = Series::new(column.into(), millis).cast(&datetime_ms())?;
    Ok(DateOutcome {
        frame: with_replaced_column(df, parsed.into_column())?,
        invalid,
        format: chosen.cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats() -> Vec<String> {
        vec!["%Y-%m-%d %H:%M:%S".to_string(), "%Y-%m-%d".to_string()]
    }

    fn dates(values: &[Option<&str>]) -> DataFrame {
        DataFrame::new(vec![Series::new("ts".into(), values.to_vec()).into()]).unwrap()
    }

    #[test]
    fn first_matching_format_applies_to_whole_column() {
        let df = dates(&[Some("2024-01-01 10:00:00"), Some("2024-01-02"), None]);
        let outcome = parse_dates(&df, "ts", &formats()).unwrap();
        assert_eq!(outcome.format.as_deref(), Some("%Y-%m-%d %H:%M:%S"));
        assert_eq!(outcome.invalid, 1);
        let column = outcome.frame.column("ts").unwrap();
        assert_eq!(column.dtype(), &datetime_ms());
        assert_eq!(column.null_count(), 2);
    }

    #[test]
    fn falls_back_to_later_formats() {
        let df = dates(&[Some("2024-01-02"), Some("nope")]);
        let outcome = parse_dates(&df, "ts", &formats()).unwrap();
        assert_eq!(outcome.format.as_deref(), Some("%Y-%m-%d"));
        assert_eq!(outcome.invalid, 1);
        let millis: Vec<Option<i64>> = outcome
            .frame
            .column("ts")
            .unwrap()
            .cast(&DataType::Int64)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(millis, vec![Some(1_704_153_600_000), None]);
    }

    #[test]
    fn nothing_parses() {
        let df = dates(&[Some("a"), Some("b"), None]);
        let outcome = parse_dates(&df, "ts", &formats()).unwrap();
        assert_eq!(outcome.format, None);
        assert_eq!(outcome.invalid, 2);
    }
}
