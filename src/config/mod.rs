//! Configuration loading for qualhook-report

mod schema;

pub use schema::{ChartConfig, Config, DEFAULT_OUTPUT_DIR};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".qualhookrc.json";

/// Find and load the config file. Searches current directory then parents.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if path.exists() {
            Some(path)
        } else {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    } else {
        find_config_in_parents(work_dir)
    };

    let Some(path) = path else {
        log::debug!("No {} found, using defaults", CONFIG_FILENAME);
        return Ok(Config::default());
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", path.display()))?;
    config
        .validate()
        .map_err(|msg| anyhow::anyhow!("Invalid config {}: {}", path.display(), msg))?;

    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Search for .qualhookrc.json in directory and its parents
fn find_config_in_parents(mut dir: &Path) -> Option<PathBuf> {
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}
