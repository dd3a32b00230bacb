use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use cleanse_model::Result;

use crate::atomic::write_json;

/// `pipeline_report_{id}.json`
pub fn report_file_name(pipeline_id: &str) -> String {
    format!("pipeline_report_{pipeline_id}.json")
}

/// `error_{id}.json`
pub fn error_file_name(pipeline_id: &str) -> String {
    format!("error_{pipeline_id}.json")
}

/// Write a JSON document into `dir` and return its path.
pub fn write_document<T: Serialize>(dir: &Path, file_name: &str, document: &T) -> Result<PathBuf> {
    let path = dir.join(file_name);
    write_json(&path, document)?;
    info!(path = %path.display(), "document written");
    Ok(path)
}
