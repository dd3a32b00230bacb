//! Polars frame and column helpers.
//!
//! Phases read columns into plain vectors of optional values, work on them,
//! and build replacement columns. These helpers keep that conversion in one
//! place and map missing columns onto the pipeline's structural error.

use ::polars::prelude::*;

use cleanse_model::{PipelineError, Result};

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
///
/// Non-finite results (`NaN`, `inf`) are rejected.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a string as `i64`, returning `None` for invalid or empty strings.
///
/// Integral floats such as `"1001.0"` are accepted.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(parsed);
    }
    let float = parse_f64(trimmed)?;
    if float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
        Some(float as i64)
    } else {
        None
    }
}

/// True for integer and floating-point dtypes.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Look up a column, reporting an absent one as a structural error.
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| PipelineError::missing_columns([name]))
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Read any column as optional strings; empty strings read as null.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = require_column(df, name)?;
    let casted = column.cast(&DataType::String)?;
    let values = casted
        .str()?
        .into_iter()
        .map(|value| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
        .collect();
    Ok(values)
}

/// Read a column as optional floats, parsing string columns leniently.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = require_column(df, name)?;
    if is_numeric_dtype(column.dtype()) {
        let casted = column.cast(&DataType::Float64)?;
        return Ok(casted.f64()?.into_iter().collect());
    }
    Ok(string_values(df, name)?
        .into_iter()
        .map(|value| value.as_deref().and_then(parse_f64))
        .collect())
}

/// Read an integer or datetime column through its `Int64` physical values.
pub fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let column = require_column(df, name)?;
    let casted = column.cast(&DataType::Int64)?;
    Ok(casted.i64()?.into_iter().collect())
}

/// Replace (or append) a column, returning a new frame.
pub fn with_replaced_column(df: &DataFrame, column: Column) -> Result<DataFrame> {
    let mut out = df.clone();
    out.with_column(column)?;
    Ok(out)
}

/// Number of distinct non-null values in a column.
pub fn distinct_non_null(df: &DataFrame, name: &str) -> Result<usize> {
    let column = require_column(df, name)?;
    Ok(column.as_materialized_series().drop_nulls().n_unique()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_i64_accepts_integral_floats() {
        assert_eq!(parse_i64("1001"), Some(1001));
        assert_eq!(parse_i64(" 1001.0 "), Some(1001));
        assert_eq!(parse_i64("1001.5"), None);
        assert_eq!(parse_i64("abc"), None);
        assert_eq!(parse_i64(""), None);
    }

    #[test]
    fn parse_f64_rejects_non_finite() {
        assert_eq!(parse_f64("12.5"), Some(12.5));
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("inf"), None);
    }

    #[test]
    fn string_values_treat_blank_as_null() {
        let df = DataFrame::new(vec![
            Series::new("a".into(), vec![Some("x"), Some("  "), None]).into(),
        ])
        .unwrap();
        let values = string_values(&df, "a").unwrap();
        assert_eq!(values, vec![Some("x".to_string()), None, None]);
    }

    #[test]
    fn f64_values_parse_strings_and_cast_numbers() {
        let df = DataFrame::new(vec![
            Series::new("s".into(), vec!["1.5", "bad", ""]).into(),
            Series::new("n".into(), vec![Some(2i64), None, Some(4)]).into(),
        ])
        .unwrap();
        assert_eq!(f64_values(&df, "s").unwrap(), vec![Some(1.5), None, None]);
        assert_eq!(
            f64_values(&df, "n").unwrap(),
            vec![Some(2.0), None, Some(4.0)]
        );
    }

    #[test]
    fn distinct_count_skips_nulls() {
        let df = DataFrame::new(vec![
            Series::new("a".into(), vec![Some("x"), None, Some("y"), Some("x"), None]).into(),
            Series::new("n".into(), vec![Some(1i64), Some(1), None, None, Some(3)]).into(),
        ])
        .unwrap();
        assert_eq!(distinct_non_null(&df, "a").unwrap(), 2);
        assert_eq!(distinct_non_null(&df, "n").unwrap(), 2);
    }

    #[test]
    fn missing_column_is_structural() {
        let df = DataFrame::new(vec![Series::new("a".into(), vec!["x"]).into()]).unwrap();
        let err = require_column(&df, "b").unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumns { .. }));
    }
}
