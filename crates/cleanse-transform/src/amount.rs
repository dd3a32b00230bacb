//! Amount normalization: numeric coercion, sign correction and quantile cap.

use polars::prelude::{DataFrame, Float64Chunked, IntoColumn, NamedFrom, Series};

use cleanse_common::{
    f64_values, is_numeric_dtype, parse_f64, quantile, require_column, string_values,
    with_replaced_column,
};
use cleanse_model::Result;

/// Result of normalizing an amount column.
#[derive(Debug, Clone)]
pub struct AmountOutcome {
    pub frame: DataFrame,
    /// Negative values made positive.
    pub sign_corrected: usize,
    /// Present values that were not numbers.
    pub invalid: usize,
    /// Values strictly above the cap, clamped to it.
    pub capped: usize,
    /// Quantile of the absolute values; `None` when no value was numeric.
    pub cap: Option<f64>,
}

/// Normalize `column` to non-negative `Float64` values capped at the
/// `cap_quantile` quantile of the absolute values.
pub fn normalize_amount(df: &DataFrame, column: &str, cap_quantile: f64) -> Result<AmountOutcome> {
    let (values, invalid) = read_amounts(df, column)?;

    let sign_corrected = values.iter().flatten().filter(|v| **v < 0.0).count();
    let absolute: Float64Chunked = values.iter().map(|v| v.map(f64::abs)).collect();

    let cap = quantile(&absolute, cap_quantile)?;
    let mut capped = 0;
    let normalized: Vec<Option<f64>> = absolute
        .into_iter()
        .map(|value| match (value, cap) {
            (Some(v), Some(cap)) if v > cap => {
                capped += 1;
                Some(cap)
            }
            _ => value,
        })
        .collect();

    let series = Series::new(column.into(), normalized);
    let frame = with_replaced_column(df, series.into_column())?;
    Ok(AmountOutcome {
        frame,
        sign_corrected,
        invalid,
        capped,
        cap,
    })
}

fn read_amounts(df: &DataFrame, column: &str) -> Result<(Vec<Option<f64>>, usize)> {
    if is_numeric_dtype(require_column(df, column)?.dtype()) {
        let values = f64_values(df, column)?;
        let invalid = values
            .iter()
            .filter(|v| v.is_some_and(|v| !v.is_finite()))
            .count();
        let values = values
            .into_iter()
            .map(|v| v.filter(|v| v.is_finite()))
            .collect();
        return Ok((values, invalid));
    }
    let mut invalid = 0;
    let values = string_values(df, column)?
        .iter()
        .map(|value| {
            let value = value.as_deref()?;
            let parsed = parse_f64(value);
            if parsed.is_none() {
                invalid += 1;
            }
            parsed
        })
        .collect();
    Ok((values, invalid))
}
