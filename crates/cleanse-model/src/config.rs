//! Typed pipeline configuration.
//!
//! A single TOML document carries the cleaning rule set, the declared column
//! contract and the thresholds used by scoring and anomaly detection.
//! Unknown keys are rejected and missing required keys fail at load time
//! with the offending file named in the error.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

pub const DEFAULT_QUALITY_GATE: f64 = 95.0;
pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 3.5;
pub const DEFAULT_MISSING_THRESHOLD: f64 = 0.30;
pub const DEFAULT_RAPID_SUCCESSION_SECONDS: i64 = 60;
pub const DEFAULT_AMOUNT_CAP_QUANTILE: f64 = 0.99;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub input: InputConfig,
    pub cleaning: CleaningRules,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub anomaly: AnomalyConfig,
    #[serde(default)]
    pub schema: DataSchema,
}

/// Output locations shared by concurrent runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_error_log_dir")]
    pub error_log_dir: PathBuf,
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

/// Column-scoped repair rules applied by the transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleaningRules {
    pub primary_key: String,
    pub foreign_key: String,
    pub foreign_key_pattern: String,
    pub amount_column: String,
    #[serde(default = "default_amount_cap_quantile")]
    pub amount_cap_quantile: f64,
    #[serde(default)]
    pub date_column: Option<String>,
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
    #[serde(default = "default_id_range")]
    pub id_range: [i64; 2],
    #[serde(default)]
    pub consistency: Option<ConsistencyRule>,
}

/// Cross-column arithmetic check: `unit_price * quantity ≈ total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsistencyRule {
    pub unit_price: String,
    pub quantity: String,
    pub total: String,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QualityConfig {
    #[serde(default = "default_quality_gate")]
    pub gate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnomalyConfig {
    #[serde(default = "default_zscore_threshold")]
    pub zscore_threshold: f64,
    #[serde(default = "default_missing_threshold")]
    pub missing_threshold: f64,
    #[serde(default = "default_rapid_succession_seconds")]
    pub rapid_succession_seconds: i64,
}

/// Declared column contract checked by the schema validator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSchema {
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnContract>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnContract {
    pub data_type: DeclaredType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub validation: Option<ColumnConstraint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConstraint {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclaredType {
    #[serde(alias = "int", alias = "int64")]
    Integer,
    #[serde(alias = "float64", alias = "number")]
    Float,
    #[serde(alias = "str", alias = "text", alias = "object")]
    String,
    #[serde(alias = "date", alias = "timestamp", alias = "datetime64")]
    Datetime,
    #[serde(alias = "bool")]
    Boolean,
}

impl DeclaredType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Datetime => "datetime",
            Self::Boolean => "boolean",
        }
    }
}

impl PipelineConfig {
    /// Load, validate and resolve a configuration document.
    ///
    /// Relative paths in `[paths]` are resolved against the directory that
    /// holds the configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] when the file cannot be read, is not
    /// valid TOML for this schema, or fails semantic validation.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|error| PipelineError::config(path, format!("read failed: {error}")))?;
        let mut config: Self = toml::from_str(&contents)
            .map_err(|error| PipelineError::config(path, error.to_string()))?;
        config
            .validate()
            .map_err(|message| PipelineError::config(path, message))?;
        if let Some(base) = path.parent() {
            config.paths = config.paths.resolved_against(base);
        }
        Ok(config)
    }

    /// Reference configuration for the transactions dataset.
    pub fn reference() -> Self {
        Self {
            paths: PathsConfig::default(),
            input: InputConfig::default(),
            cleaning: CleaningRules::reference(),
            quality: QualityConfig::default(),
            anomaly: AnomalyConfig::default(),
            schema: DataSchema::reference(),
        }
    }

    /// Check semantic constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns every problem found, joined with `"; "`.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut problems = Vec::new();
        let rules = &self.cleaning;

        if self.input.delimiter_byte().is_none() {
            problems.push("input.delimiter must be a single ASCII character".to_string());
        }
        for (name, value) in [
            ("cleaning.primary_key", &rules.primary_key),
            ("cleaning.foreign_key", &rules.foreign_key),
            ("cleaning.amount_column", &rules.amount_column),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{name} must not be empty"));
            }
        }
        if let Err(error) = Regex::new(&rules.foreign_key_pattern) {
            problems.push(format!("cleaning.foreign_key_pattern is invalid: {error}"));
        }
        if !(rules.amount_cap_quantile > 0.0 && rules.amount_cap_quantile <= 1.0) {
            problems.push("cleaning.amount_cap_quantile must be in (0, 1]".to_string());
        }
        if rules.date_column.is_some() && rules.date_formats.is_empty() {
            problems.push("cleaning.date_formats must list at least one format".to_string());
        }
        if rules.id_range[0] > rules.id_range[1] {
            problems.push("cleaning.id_range must be [min, max] with min <= max".to_string());
        }
        if let Some(rule) = &rules.consistency
            && (!rule.epsilon.is_finite() || rule.epsilon < 0.0)
        {
            problems
                .push("cleaning.consistency.epsilon must be finite and not negative".to_string());
        }
        if !(0.0..=100.0).contains(&self.quality.gate) {
            problems.push("quality.gate must be in [0, 100]".to_string());
        }
        let threshold = self.anomaly.zscore_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            problems.push("anomaly.zscore_threshold must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.anomaly.missing_threshold) {
            problems.push("anomaly.missing_threshold must be in [0, 1]".to_string());
        }
        if self.anomaly.rapid_succession_seconds < 0 {
            problems.push("anomaly.rapid_succession_seconds must not be negative".to_string());
        }
        for (column, contract) in &self.schema.columns {
            let Some(constraint) = &contract.validation else {
                continue;
            };
            if let Some(pattern) = &constraint.pattern
                && let Err(error) = Regex::new(pattern)
            {
                problems.push(format!("schema.columns.{column}.validation.pattern: {error}"));
            }
            if let (Some(min), Some(max)) = (constraint.min, constraint.max)
                && min > max
            {
                problems.push(format!("schema.columns.{column}.validation: min > max"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }

    /// Serialize back to TOML (used to print the effective configuration).
    ///
    /// # Errors
    ///
    /// Returns an error message when serialization fails.
    pub fn to_toml(&self) -> std::result::Result<String, String> {
        toml::to_string_pretty(self).map_err(|error| error.to_string())
    }
}

impl CleaningRules {
    pub fn reference() -> Self {
        Self {
            primary_key: "transaction_id".to_string(),
            foreign_key: "customer_id".to_string(),
            foreign_key_pattern: r"^CUST-\d+$".to_string(),
            amount_column: "amount".to_string(),
            amount_cap_quantile: DEFAULT_AMOUNT_CAP_QUANTILE,
            date_column: Some("transaction_date".to_string()),
            date_formats: default_date_formats(),
            id_range: default_id_range(),
            consistency: Some(ConsistencyRule {
                unit_price: "unit_price".to_string(),
                quantity: "quantity".to_string(),
                total: "amount".to_string(),
                epsilon: default_epsilon(),
            }),
        }
    }

    /// Columns the extractor insists on before any other phase runs.
    pub fn required_columns(&self) -> Vec<String> {
        vec![
            self.primary_key.clone(),
            self.foreign_key.clone(),
            self.amount_column.clone(),
        ]
    }
}

impl DataSchema {
    pub fn reference() -> Self {
        let mut columns = BTreeMap::new();
        columns.insert(
            "transaction_id".to_string(),
            ColumnContract {
                data_type: DeclaredType::Integer,
                nullable: false,
                validation: Some(ColumnConstraint {
                    min: Some(1.0),
                    ..ColumnConstraint::default()
                }),
            },
        );
        columns.insert(
            "customer_id".to_string(),
            ColumnContract {
                data_type: DeclaredType::String,
                nullable: false,
                validation: Some(ColumnConstraint {
                    pattern: Some(r"^CUST-\d+$".to_string()),
                    ..ColumnConstraint::default()
                }),
            },
        );
        columns.insert(
            "amount".to_string(),
            ColumnContract {
                data_type: DeclaredType::Float,
                nullable: false,
                validation: Some(ColumnConstraint {
                    min: Some(0.0),
                    ..ColumnConstraint::default()
                }),
            },
        );
        columns.insert(
            "transaction_date".to_string(),
            ColumnContract {
                data_type: DeclaredType::Datetime,
                nullable: true,
                validation: None,
            },
        );
        Self { columns }
    }
}

impl PathsConfig {
    fn resolved_against(self, base: &Path) -> Self {
        let resolve = |path: PathBuf| {
            if path.is_relative() {
                base.join(path)
            } else {
                path
            }
        };
        Self {
            output_dir: resolve(self.output_dir),
            error_log_dir: resolve(self.error_log_dir),
            report_dir: resolve(self.report_dir),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            error_log_dir: default_error_log_dir(),
            report_dir: default_report_dir(),
        }
    }
}

impl InputConfig {
    /// The delimiter as a byte, `None` unless it is a single ASCII character.
    pub fn delimiter_byte(&self) -> Option<u8> {
        u8::try_from(self.delimiter).ok().filter(u8::is_ascii)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            gate: default_quality_gate(),
        }
    }
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            zscore_threshold: default_zscore_threshold(),
            missing_threshold: default_missing_threshold(),
            rapid_succession_seconds: default_rapid_succession_seconds(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/processed")
}

fn default_error_log_dir() -> PathBuf {
    PathBuf::from("logs/errors")
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_delimiter() -> char {
    ','
}

fn default_amount_cap_quantile() -> f64 {
    DEFAULT_AMOUNT_CAP_QUANTILE
}

/// Ordered fallback list used when a rule set names no formats.
pub fn default_date_formats() -> Vec<String> {
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"]
        .iter()
        .map(|format| (*format).to_string())
        .collect()
}

fn default_id_range() -> [i64; 2] {
    [1, 999_999_999]
}

fn default_epsilon() -> f64 {
    0.01
}

fn default_quality_gate() -> f64 {
    DEFAULT_QUALITY_GATE
}

fn default_zscore_threshold() -> f64 {
    DEFAULT_ZSCORE_THRESHOLD
}

fn default_missing_threshold() -> f64 {
    DEFAULT_MISSING_THRESHOLD
}

fn default_rapid_succession_seconds() -> i64 {
    DEFAULT_RAPID_SUCCESSION_SECONDS
}

fn default_nullable() -> bool {
    true
}
