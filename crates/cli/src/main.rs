//! Scenario runner for the manufacturing engine.
//!
//! Reads a JSON scenario (see [`scenario`]), plays it against an in-memory
//! store and prints the resulting report as JSON on stdout.

mod config;
mod scenario;

use anyhow::{Context, Result};

use crate::config::CliConfig;
use crate::scenario::Scenario;

fn main() -> Result<()> {
    atelier_observability::init();

    let config = CliConfig::from_env()?;
    let raw = std::fs::read_to_string(&config.scenario_path)
        .with_context(|| format!("failed to read {}", config.scenario_path.display()))?;
    let scenario = Scenario::from_json(&raw)?;

    tracing::info!(
        path = %config.scenario_path.display(),
        materials = scenario.materials.len(),
        steps = scenario.steps.len(),
        "running scenario"
    );
    let report = scenario::run(scenario)?;

    let out = if config.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{out}");
    Ok(())
}
