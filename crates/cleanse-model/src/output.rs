use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Artifacts written by the loader for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPaths {
    pub parquet: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    pub summary: Option<PathBuf>,
}

impl OutputPaths {
    pub fn written(&self) -> Vec<&PathBuf> {
        [&self.parquet, &self.csv, &self.summary]
            .into_iter()
            .flatten()
            .collect()
    }
}
