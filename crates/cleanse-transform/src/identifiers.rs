//! Identifier coercion and foreign-key pattern enforcement.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use regex::Regex;

use cleanse_common::{parse_i64, string_values, with_replaced_column};
use cleanse_model::Result;

/// Coerce `column` to `Int64`.
///
/// Returns the new frame and the number of present values that could not
/// be read as integers (those become null).
pub fn coerce_identifier(df: &DataFrame, column: &str) -> Result<(DataFrame, usize)> {
    let raw = string_values(df, column)?;
    let mut invalid = 0;
    let coerced: Vec<Option<i64>> = raw
        .iter()
        .map(|value| {
            let value = value.as_deref()?;
            let parsed = parse_i64(value);
            if parsed.is_none() {
                invalid += 1;
            }
            parsed
        })
        .collect();
    let series = Series::new(column.into(), coerced);
    let out = with_replaced_column(df, series.into_column())?;
    Ok((out, invalid))
}

/// Null out values of `column` that do not match `pattern`.
///
/// Returns the new frame and the number of present values nulled.
pub fn enforce_pattern(
    df: &DataFrame,
    column: &str,
    pattern: &Regex,
) -> Result<(DataFrame, usize)> {
    let raw = string_values(df, column)?;
    let mut invalid = 0;
    let checked: Vec<Option<String>> = raw
        .into_iter()
        .map(|value| {
            let value = value?;
            if pattern.is_match(&value) {
                Some(value)
            } else {
                invalid += 1;
                None
            }
        })
        .collect();
    let series = Series::new(column.into(), checked);
    let out = with_replaced_column(df, series.into_column())?;
    Ok((out, invalid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;

    fn frame(values: &[Option<&str>]) -> DataFrame {
        DataFrame::new(vec![Series::new("id".into(), values.to_vec()).into()]).unwrap()
    }

    #[test]
    fn identifiers_become_int64() {
        let df = frame(&[Some("1001"), Some("1002.0"), Some("x"), None]);
        let (out, invalid) = coerce_identifier(&df, "id").unwrap();
        assert_eq!(invalid, 1);
        let column = out.column("id").unwrap();
        assert_eq!(column.dtype(), &DataType::Int64);
        let values: Vec<Option<i64>> = column.i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1001), Some(1002), None, None]);
    }

    #[test]
    fn pattern_failures_are_nulled() {
        let df = frame(&[Some("CUST-1"), Some("BADID"), None]);
        let pattern = Regex::new(r"^CUST-\d+$").unwrap();
        let (out, invalid) = enforce_pattern(&df, "id", &pattern).unwrap();
        assert_eq!(invalid, 1);
        assert_eq!(out.column("id").unwrap().null_count(), 2);
    }
}
