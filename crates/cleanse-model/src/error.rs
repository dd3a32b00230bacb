//! Error taxonomy shared by every pipeline phase.
//!
//! Each phase raises a specific variant for structural failures; per-value
//! data problems never become errors. Classification into a category and
//! severity is done by variant, with a keyword heuristic reserved for
//! variants that wrap opaque library errors.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to read file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("column {column} has an unsupported type: {message}")]
    ColumnType { column: String, message: String },

    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("failed to write file {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataframe operation failed: {0}")]
    Frame(#[from] PolarsError),

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("phase panicked: {0}")]
    Panic(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::InputNotFound { path }
        } else {
            Self::Read { path, source }
        }
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn missing_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingColumns {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Variant name reported as the error `type` in error records.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::InputNotFound { .. } => "InputNotFound",
            Self::Read { .. } => "ReadError",
            Self::Parse { .. } => "ParseError",
            Self::MissingColumns { .. } => "MissingColumns",
            Self::ColumnType { .. } => "ColumnTypeError",
            Self::Config { .. } => "ConfigError",
            Self::Storage { .. } => "StorageError",
            Self::Frame(_) => "FrameError",
            Self::Serialize(_) => "SerializeError",
            Self::Panic(_) => "Panic",
        }
    }

    /// Category and severity derived from the variant.
    ///
    /// Returns `None` for variants whose payload is opaque and must be
    /// classified from its text.
    pub fn tagged_classification(&self) -> Option<(ErrorCategory, ErrorSeverity)> {
        match self {
            Self::InputNotFound { .. }
            | Self::Read { .. }
            | Self::Parse { .. }
            | Self::Config { .. }
            | Self::Storage { .. } => Some((ErrorCategory::FileIo, ErrorSeverity::High)),
            Self::MissingColumns { .. } => {
                Some((ErrorCategory::DataIntegrity, ErrorSeverity::Medium))
            }
            Self::ColumnType { .. } | Self::Serialize(_) => {
                Some((ErrorCategory::DataType, ErrorSeverity::Medium))
            }
            Self::Frame(_) | Self::Panic(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    FileIo,
    Resource,
    DataType,
    DataIntegrity,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FileIo => "file_io",
            Self::Resource => "resource",
            Self::DataType => "data_type",
            Self::DataIntegrity => "data_integrity",
            Self::Unknown => "unknown",
        }
    }
}

impl ErrorSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}
