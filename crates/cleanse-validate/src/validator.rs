//! Schema validation against the declared column contract.
//!
//! Three independent checks run over every declared column:
//!
//! - **presence**: the column exists in the frame
//! - **data types**: raw values coerce to the declared type, or the typed
//!   column's dtype is compatible with it
//! - **constraints**: nullability, `[min, max]`, full-match `pattern` and
//!   `allowed` values
//!
//! Validation is advisory. Data problems become messages in the result and
//! never abort the run.

use std::collections::BTreeSet;
use std::time::Instant;

use polars::prelude::{DataFrame, DataType};
use regex::Regex;
use tracing::{debug, info, info_span, warn};

use cleanse_common::{f64_values, string_values};
use cleanse_model::{
    ColumnConstraint, ColumnContract, ColumnPresence, DataSchema, ValidationResult,
    default_date_formats,
};

use crate::types::{coerces, dtype_compatible};

/// Checks a frame against a [`DataSchema`].
pub struct SchemaValidator<'a> {
    schema: &'a DataSchema,
    date_formats: Vec<String>,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(schema: &'a DataSchema) -> Self {
        Self {
            schema,
            date_formats: default_date_formats(),
        }
    }

    /// Use the rule set's ordered format list for datetime columns.
    pub fn with_date_formats(mut self, formats: &[String]) -> Self {
        if !formats.is_empty() {
            self.date_formats = formats.to_vec();
        }
        self
    }

    /// Validate `df`. Never fails.
    pub fn validate(&self, df: &DataFrame) -> ValidationResult {
        let span = info_span!("schema_validation", columns = self.schema.columns.len());
        let _guard = span.enter();
        let start = Instant::now();

        let mut result = ValidationResult {
            column_presence: self.check_presence(df),
            ..ValidationResult::default()
        };

        for (name, contract) in &self.schema.columns {
            if df.column(name).is_err() {
                continue;
            }
            if let Some(message) = self.check_type(df, name, contract) {
                result.data_types.push(name, message);
            }
            for message in self.check_constraints(df, name, contract) {
                result.constraints.push(name, message);
            }
        }

        let result = result.finalize();
        if result.overall_passed {
            info!(
                duration_ms = start.elapsed().as_millis(),
                "schema validation passed"
            );
        } else {
            warn!(
                missing = result.column_presence.missing.len(),
                type_errors = result.data_types.message_count(),
                constraint_errors = result.constraints.message_count(),
                duration_ms = start.elapsed().as_millis(),
                "schema validation found issues"
            );
        }
        result
    }

    fn check_presence(&self, df: &DataFrame) -> ColumnPresence {
        let missing: Vec<String> = self
            .schema
            .columns
            .keys()
            .filter(|name| df.column(name).is_err())
            .cloned()
            .collect();
        ColumnPresence {
            passed: missing.is_empty(),
            missing,
        }
    }

    fn check_type(&self, df: &DataFrame, name: &str, contract: &ColumnContract) -> Option<String> {
        let column = df.column(name).ok()?;
        let declared = contract.data_type;
        if !matches!(column.dtype(), DataType::String) {
            if dtype_compatible(column.dtype(), declared) {
                return None;
            }
            return Some(format!(
                "column has dtype {}, expected {}",
                column.dtype(),
                declared.as_str()
            ));
        }

        let values = match string_values(df, name) {
            Ok(values) => values,
            Err(error) => return Some(format!("column could not be read: {error}")),
        };
        let failures: Vec<&str> = values
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|value| !coerces(value, declared, &self.date_formats))
            .collect();
        debug!(
            column = name,
            declared = declared.as_str(),
            failures = failures.len(),
            "type check"
        );
        let sample = failures.first()?;
        Some(format!(
            "{} value(s) cannot be read as {} (e.g. \"{}\")",
            failures.len(),
            declared.as_str(),
            sample
        ))
    }

    fn check_constraints(
        &self,
        df: &DataFrame,
        name: &str,
        contract: &ColumnContract,
    ) -> Vec<String> {
        let mut messages = Vec::new();
        let values = match string_values(df, name) {
            Ok(values) => values,
            Err(error) => {
                messages.push(format!("column could not be read: {error}"));
                return messages;
            }
        };

        if !contract.nullable {
            let nulls = values.iter().filter(|value| value.is_none()).count();
            if nulls > 0 {
                messages.push(format!("{nulls} null value(s) in non-nullable column"));
            }
        }

        let Some(constraint) = &contract.validation else {
            return messages;
        };
        if constraint.min.is_some() || constraint.max.is_some() {
            messages.extend(check_range(df, name, constraint));
        }
        if let Some(pattern) = &constraint.pattern {
            messages.extend(check_pattern(&values, pattern));
        }
        if let Some(allowed) = &constraint.allowed {
            let allowed: BTreeSet<&str> = allowed.iter().map(String::as_str).collect();
            let outside = values
                .iter()
                .flatten()
                .filter(|value| !allowed.contains(value.as_str()))
                .count();
            if outside > 0 {
                messages.push(format!("{outside} value(s) outside the allowed set"));
            }
        }
        messages
    }
}

fn check_range(df: &DataFrame, name: &str, constraint: &ColumnConstraint) -> Vec<String> {
    let mut messages = Vec::new();
    let numbers = match f64_values(df, name) {
        Ok(numbers) => numbers,
        Err(error) => {
            messages.push(format!("column could not be read as numbers: {error}"));
            return messages;
        }
    };
    if let Some(min) = constraint.min {
        let below = numbers.iter().flatten().filter(|v| **v < min).count();
        if below > 0 {
            messages.push(format!("{below} value(s) below minimum {min}"));
        }
    }
    if let Some(max) = constraint.max {
        let above = numbers.iter().flatten().filter(|v| **v > max).count();
        if above > 0 {
            messages.push(format!("{above} value(s) above maximum {max}"));
        }
    }
    messages
}

fn check_pattern(values: &[Option<String>], pattern: &str) -> Option<String> {
    let regex = match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(regex) => regex,
        Err(error) => return Some(format!("invalid pattern {pattern}: {error}")),
    };
    let mismatched = values
        .iter()
        .flatten()
        .filter(|value| !regex.is_match(value))
        .count();
    (mismatched > 0).then(|| format!("{mismatched} value(s) do not match pattern {pattern}"))
}
