use std::path::Path;
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{debug, info};

use cleanse_common::has_column;
use cleanse_model::Result;

use crate::csv_table::read_csv_table;
use crate::frame::build_frame;

/// Loads a delimited source file into a frame of string columns.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    delimiter: u8,
}

impl Default for Extractor {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl Extractor {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Read `path` into a frame.
    ///
    /// # Errors
    ///
    /// Propagates the structural errors of [`read_csv_table`].
    pub fn extract(&self, path: &Path) -> Result<DataFrame> {
        let start = Instant::now();
        let table = read_csv_table(path, self.delimiter)?;
        debug!(
            source_file = %path.display(),
            columns = table.headers.len(),
            "csv parsed"
        );
        let df = build_frame(&table)?;
        info!(
            source_file = %path.display(),
            rows = df.height(),
            columns = df.width(),
            duration_ms = start.elapsed().as_millis(),
            "extraction complete"
        );
        Ok(df)
    }

    /// True when every required column is present. Never fails; the caller
    /// decides whether absence is fatal.
    pub fn validate_schema(&self, df: &DataFrame, required: &[String]) -> bool {
        missing_columns(df, required).is_empty()
    }
}

/// Required columns absent from `df`, in the order given.
pub fn missing_columns(df: &DataFrame, required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|name| !has_column(df, name))
        .cloned()
        .collect()
}
