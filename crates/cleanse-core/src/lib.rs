//! Pipeline orchestration.
//!
//! - **pipeline**: the [`PipelineManager`] and its run result
//! - **state**: the phase state machine
//! - **error_handler**: classification, recovery recommendation and error
//!   records
//! - **panic**: panic capture with backtraces at the phase boundary

pub mod error_handler;
mod panic;
pub mod pipeline;
pub mod state;

pub use error_handler::{
    ErrorClassification, ErrorHandler, ErrorRecord, HandledError, RecoveryAction, classify_error,
    keyword_classification,
};
pub use pipeline::{PipelineManager, PipelineMetrics, PipelineResult, new_pipeline_id};
pub use state::PipelineState;
