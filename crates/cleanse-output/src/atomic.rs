//! Write-then-rename file output.
//!
//! Content goes to a uniquely named temporary file in the destination
//! directory, is synced, and is renamed over the final path. Readers never
//! observe a partially written artifact, and concurrent runs writing into
//! the same directory cannot collide on temporary names.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use cleanse_model::{PipelineError, Result};

/// Create `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|error| PipelineError::storage(dir, error))
}

/// Write `path` atomically, filling the temporary file with `fill`.
pub fn write_atomically<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(dir)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|error| PipelineError::storage(dir, error))?;
    fill(temp.as_file_mut())?;
    temp.as_file_mut()
        .sync_all()
        .map_err(|error| PipelineError::storage(temp.path(), error))?;
    temp.persist(path)
        .map_err(|error| PipelineError::storage(path, error.error))?;
    Ok(())
}

/// Pretty-printed JSON with a trailing newline.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomically(path, |file| {
        writeln!(file, "{json}").map_err(|error| PipelineError::storage(path, error))
    })
}
