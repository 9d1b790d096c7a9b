use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use ember_core::config::{ScriptConfig, SystemConfig};

#[derive(Serialize, Default)]
struct FullConfig {
    system: SystemConfig,
    script: ScriptConfig,
}

/// Writes a config file with every default filled in. Returns whether a
/// file was created.
pub fn ensure_config_exists(path: &Path) -> anyhow::Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    println!("Creating default configuration at {:?}...", path);
    let toml_str = default_config()?;
    fs::write(path, toml_str).with_context(|| format!("Failed to write config file {:?}", path))?;
    Ok(true)
}

fn default_config() -> anyhow::Result<String> {
    toml::to_string_pretty(&FullConfig::default()).context("Failed to serialize default config")
}
