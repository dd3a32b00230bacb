use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Advisory outcome of checking a frame against the declared column contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub column_presence: ColumnPresence,
    pub data_types: ColumnErrors,
    pub constraints: ColumnErrors,
    pub overall_passed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPresence {
    pub passed: bool,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnErrors {
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ColumnErrors {
    pub fn push(&mut self, column: &str, message: String) {
        self.errors
            .entry(column.to_string())
            .or_default()
            .push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }
}

impl ValidationResult {
    /// Recompute `overall_passed` from the individual sections.
    pub fn finalize(mut self) -> Self {
        self.overall_passed =
            self.column_presence.passed && self.data_types.is_empty() && self.constraints.is_empty();
        self
    }

    pub fn issue_count(&self) -> usize {
        self.column_presence.missing.len()
            + self.data_types.message_count()
            + self.constraints.message_count()
    }
}
