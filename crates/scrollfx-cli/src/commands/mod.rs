pub mod config;
pub mod easings;
pub mod interpolate;
pub mod play;
pub mod simulate;
pub mod view;

use std::path::Path;

use anyhow::{Context, Result};
use scrollfx_core::{AppConfig, Scenario, ScenarioRuntime};

/// Load a scenario file and build it against the configured engine defaults
pub fn load_runtime(config: &AppConfig, path: &Path) -> Result<ScenarioRuntime> {
    let scenario = Scenario::load(path)
        .with_context(|| format!("Failed to load scenario {}", path.display()))?;
    Ok(scenario.build(&config.engine)?)
}
