//! Declared-type coercion rules.

use polars::prelude::DataType;

use cleanse_common::{is_datetime_dtype, is_numeric_dtype, parse_any, parse_f64, parse_i64};
use cleanse_model::DeclaredType;

/// Parse the boolean spellings accepted in source files.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// True when a raw string value can be read as `declared`.
pub fn coerces(value: &str, declared: DeclaredType, date_formats: &[String]) -> bool {
    match declared {
        DeclaredType::Integer => parse_i64(value).is_some(),
        DeclaredType::Float => parse_f64(value).is_some(),
        DeclaredType::String => true,
        DeclaredType::Datetime => parse_any(value, date_formats).is_some(),
        DeclaredType::Boolean => parse_bool(value).is_some(),
    }
}

/// True when an already-typed column satisfies `declared`.
///
/// Every dtype renders as a string, and integers widen to floats.
pub fn dtype_compatible(dtype: &DataType, declared: DeclaredType) -> bool {
    match declared {
        DeclaredType::Integer => dtype.is_integer(),
        DeclaredType::Float => is_numeric_dtype(dtype),
        DeclaredType::String => true,
        DeclaredType::Datetime => is_datetime_dtype(dtype),
        DeclaredType::Boolean => matches!(dtype, DataType::Boolean),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_spellings() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool(" n "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn integer_accepts_integral_floats_only() {
        assert!(coerces("1001.0", DeclaredType::Integer, &[]));
        assert!(!coerces("1001.5", DeclaredType::Integer, &[]));
        assert!(coerces("1001.5", DeclaredType::Float, &[]));
    }

    #[test]
    fn datetime_uses_format_list() {
        let formats = vec!["%Y-%m-%d".to_string()];
        assert!(coerces("2024-01-31", DeclaredType::Datetime, &formats));
        assert!(!coerces("31/01/2024", DeclaredType::Datetime, &formats));
    }

    #[test]
    fn typed_columns() {
        assert!(dtype_compatible(&DataType::Int64, DeclaredType::Float));
        assert!(!dtype_compatible(&DataType::Float64, DeclaredType::Integer));
        assert!(dtype_compatible(&DataType::Float64, DeclaredType::String));
        assert!(!dtype_compatible(&DataType::Int64, DeclaredType::Datetime));
    }
}
