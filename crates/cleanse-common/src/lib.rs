//! Shared utilities for the cleansing crates.
//!
//! Polars frame helpers, date parsing and the order statistics used by
//! more than one phase.

pub mod datetime;
pub mod polars;
pub mod stats;

pub use self::polars::{
    distinct_non_null, f64_values, has_column, i64_values, is_datetime_dtype, is_numeric_dtype,
    parse_f64, parse_i64, require_column, string_values, with_replaced_column,
};
pub use datetime::{parse_any, parse_with_format, to_epoch_millis};
pub use stats::{median, median_absolute_deviation, modified_z_score, quantile};
