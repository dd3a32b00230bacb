use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of one pipeline run.
///
/// `Init` moves through the phases in order; any failure jumps straight to
/// `Failed`. `Success` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Init,
    Extracting,
    Validating,
    Transforming,
    Scoring,
    DetectingAnomalies,
    Loading,
    Success,
    Failed,
}

impl PipelineState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Extracting => "extracting",
            Self::Validating => "validating",
            Self::Transforming => "transforming",
            Self::Scoring => "scoring",
            Self::DetectingAnomalies => "detecting_anomalies",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    /// Phase key used in execution metrics, `None` outside the phases.
    pub fn phase_name(self) -> Option<&'static str> {
        match self {
            Self::Extracting => Some("extraction"),
            Self::Validating => Some("validation"),
            Self::Transforming => Some("transformation"),
            Self::Scoring => Some("quality"),
            Self::DetectingAnomalies => Some("anomaly_detection"),
            Self::Loading => Some("loading"),
            Self::Init | Self::Success | Self::Failed => None,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
