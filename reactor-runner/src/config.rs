use reactor_config::load_config;
use reactor_config::shared::RunnerConfig;

use crate::error::{RunnerError, RunnerResult};

/// Loads and validates the runner configuration.
pub fn load_runner_config() -> RunnerResult<RunnerConfig> {
    let config = load_config::<RunnerConfig>().map_err(RunnerError::config)?;
    config.validate().map_err(RunnerError::config)?;

    Ok(config)
}
