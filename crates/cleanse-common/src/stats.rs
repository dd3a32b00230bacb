//! Order statistics used by amount capping and outlier detection.
//!
//! Values travel as `Float64Chunked`; nulls are ignored by every statistic.

use ::polars::prelude::*;

use cleanse_model::Result;

/// Scale factor of the modified z-score (`0.6745 ≈ Φ⁻¹(0.75)`).
pub const MODIFIED_Z_SCALE: f64 = 0.6745;

/// Linearly interpolated quantile (`q` in `[0, 1]`), `None` when no value is
/// present.
pub fn quantile(values: &Float64Chunked, q: f64) -> Result<Option<f64>> {
    Ok(values.quantile(q, QuantileMethod::Linear)?)
}

pub fn median(values: &Float64Chunked) -> Option<f64> {
    values.median()
}

/// Median absolute deviation around `center`.
pub fn median_absolute_deviation(values: &Float64Chunked, center: f64) -> Option<f64> {
    let deviations: Float64Chunked = values
        .into_iter()
        .map(|value| value.map(|v| (v - center).abs()))
        .collect();
    deviations.median()
}

/// Modified z-score of `value`; callers must skip a zero MAD.
pub fn modified_z_score(value: f64, median: f64, mad: f64) -> f64 {
    MODIFIED_Z_SCALE * (value - median) / mad
}
