use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use polars::prelude::{CsvWriter, DataFrame, ParquetCompression, ParquetWriter, SerWriter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use cleanse_common::distinct_non_null;
use cleanse_model::{CleaningStats, OutputPaths, Result};

use crate::atomic::{ensure_dir, write_atomically, write_json};

/// Per-column profile in the dataset summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub dtype: String,
    pub null_count: usize,
    pub unique_count: usize,
}

/// Machine-readable companion of the cleaned dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub timestamp: String,
    pub rows_processed: usize,
    pub cleaning_stats: CleaningStats,
    pub column_summary: BTreeMap<String, ColumnProfile>,
}

/// Profile every column of `df`.
pub fn summarize(df: &DataFrame, stats: &CleaningStats) -> Result<DatasetSummary> {
    let mut column_summary = BTreeMap::new();
    for column in df.get_columns() {
        let name = column.name().to_string();
        let profile = ColumnProfile {
            dtype: column.dtype().to_string(),
            null_count: column.null_count(),
            unique_count: distinct_non_null(df, &name)?,
        };
        column_summary.insert(name, profile);
    }
    Ok(DatasetSummary {
        timestamp: Utc::now().to_rfc3339(),
        rows_processed: df.height(),
        cleaning_stats: stats.clone(),
        column_summary,
    })
}

/// Persists cleaned frames into an output directory.
#[derive(Debug, Clone)]
pub struct Loader {
    output_dir: PathBuf,
}

impl Loader {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write `cleaned_{id}.parquet`, `cleaned_{id}.csv` and
    /// `summary_{id}.json`.
    ///
    /// # Errors
    ///
    /// Returns [`cleanse_model::PipelineError::Storage`] when the directory
    /// or a file cannot be written.
    pub fn load(
        &self,
        df: &DataFrame,
        stats: &CleaningStats,
        pipeline_id: &str,
    ) -> Result<OutputPaths> {
        let span = info_span!("load", rows = df.height(), output_dir = %self.output_dir.display());
        let _guard = span.enter();
        let start = Instant::now();
        ensure_dir(&self.output_dir)?;

        let parquet = self.output_dir.join(format!("cleaned_{pipeline_id}.parquet"));
        write_atomically(&parquet, |file| {
            let mut frame = df.clone();
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut frame)?;
            Ok(())
        })?;
        debug!(path = %parquet.display(), "parquet written");

        let csv = self.output_dir.join(format!("cleaned_{pipeline_id}.csv"));
        write_atomically(&csv, |file| {
            let mut frame = df.clone();
            CsvWriter::new(file).include_header(true).finish(&mut frame)?;
            Ok(())
        })?;
        debug!(path = %csv.display(), "csv written");

        let summary_path = self.output_dir.join(format!("summary_{pipeline_id}.json"));
        write_json(&summary_path, &summarize(df, stats)?)?;

        info!(
            files = 3,
            duration_ms = start.elapsed().as_millis(),
            "load complete"
        );
        Ok(OutputPaths {
            parquet: Some(parquet),
            csv: Some(csv),
            summary: Some(summary_path),
        })
    }
}
