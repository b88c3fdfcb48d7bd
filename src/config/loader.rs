//! Configuration loading from the file system

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use super::types::ResolverConfig;
use crate::error::{BindingError, ConfigSource, ResultExt};

/// Read and parse a JSON config file.
pub fn try_load_config(path: &Path) -> crate::error::Result<ResolverConfig> {
    let content = fs::read_to_string(path).map_err(|e| BindingError::Config {
        path: path.to_path_buf(),
        source: ConfigSource::from(e),
    })?;

    serde_json::from_str(&content).map_err(|e| BindingError::Config {
        path: path.to_path_buf(),
        source: ConfigSource::from(e),
    })
}

/// Load configuration, returning defaults if the file is missing or invalid.
#[instrument(name = "load_config", skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> ResolverConfig {
    if !path.exists() {
        info!("Config file not found, using defaults");
        return ResolverConfig::default();
    }

    try_load_config(path).warn_on_err().unwrap_or_default()
}

/// Default location of the config file (~/.kit/keybindings.json).
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".kit")
        .join("keybindings.json")
}
