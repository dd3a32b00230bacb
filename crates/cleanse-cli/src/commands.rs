use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{info, info_span};

use cleanse_core::{PipelineManager, PipelineResult};
use cleanse_model::PipelineConfig;

/// Exit code of a run that met the quality gate.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code of a run that completed but fell below the quality gate.
pub const EXIT_GATE_FAILED: i32 = 1;
/// Exit code of a run stopped by an error.
pub const EXIT_ERROR: i32 = 2;

/// Load the configuration and run the pipeline once over `input`.
pub fn run_pipeline(input: &Path, config_path: &Path) -> Result<PipelineResult> {
    let span = info_span!("run", input = %input.display());
    let _guard = span.enter();
    let mut manager = PipelineManager::new(config_path)
        .with_context(|| format!("load configuration {}", config_path.display()))?;
    let result = manager.execute_pipeline(input);
    info!(
        pipeline_id = %result.pipeline_id,
        success = result.success,
        "run complete"
    );
    Ok(result)
}

/// Gate failures and handled errors get distinct exit codes.
pub fn exit_code(result: &PipelineResult) -> i32 {
    if result.success {
        EXIT_SUCCESS
    } else if result.error.is_some() {
        EXIT_ERROR
    } else {
        EXIT_GATE_FAILED
    }
}

/// Load and validate `config_path`, returning the resolved configuration as
/// TOML.
pub fn check_config(config_path: &Path) -> Result<String> {
    let config = PipelineConfig::load(config_path)
        .with_context(|| format!("load configuration {}", config_path.display()))?;
    config
        .to_toml()
        .map_err(|message| anyhow!("render configuration: {message}"))
}

pub fn reference_config() -> Result<String> {
    PipelineConfig::reference()
        .to_toml()
        .map_err(|message| anyhow!("render configuration: {message}"))
}
