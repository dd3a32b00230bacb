use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;

use cleanse_model::{PipelineError, Result};

/// Raw delimited table: normalized header names and string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// All values of one column, by header position.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a delimited file whose first non-blank row is the header.
///
/// Blank lines are skipped, short rows are padded with empty cells and
/// cells beyond the header width are dropped.
///
/// # Errors
///
/// [`PipelineError::InputNotFound`] when the file does not exist,
/// [`PipelineError::Read`] when it cannot be opened, and
/// [`PipelineError::Parse`] for malformed records or an unusable header.
pub fn read_csv_table(path: &Path, delimiter: u8) -> Result<CsvTable> {
    let file = File::open(path).map_err(|error| PipelineError::read(path, error))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(file);

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|error| PipelineError::Parse {
            path: path.to_path_buf(),
            message: format!("record {}: {error}", line + 1),
        })?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }

    let mut raw_rows = raw_rows.into_iter();
    let Some(header_row) = raw_rows.next() else {
        return Err(PipelineError::Parse {
            path: path.to_path_buf(),
            message: "file has no header row".to_string(),
        });
    };
    let headers: Vec<String> = header_row.iter().map(|value| normalize_header(value)).collect();
    check_headers(path, &headers)?;

    let rows = raw_rows
        .map(|record| {
            (0..headers.len())
                .map(|idx| record.get(idx).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    Ok(CsvTable { headers, rows })
}

fn check_headers(path: &Path, headers: &[String]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for (idx, header) in headers.iter().enumerate() {
        if header.is_empty() {
            return Err(PipelineError::Parse {
                path: path.to_path_buf(),
                message: format!("header column {} is empty", idx + 1),
            });
        }
        if !seen.insert(header.as_str()) {
            return Err(PipelineError::Parse {
                path: path.to_path_buf(),
                message: format!("duplicate header {header}"),
            });
        }
    }
    Ok(())
}
