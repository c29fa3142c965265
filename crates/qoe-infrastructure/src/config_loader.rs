//! Configuration file loading.
//!
//! Reads `QoeConfig` from `~/.config/qoe-probe/config.toml` or an explicit path.

use qoe_core::config::QoeConfig;
use qoe_core::error::{QoeError, Result};
use std::path::{Path, PathBuf};

/// Returns the path to the configuration file: ~/.config/qoe-probe/config.toml
pub fn default_config_path() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| QoeError::config("Could not determine home directory"))?;
    Ok(home.join(".config").join("qoe-probe").join("config.toml"))
}

/// Loads the configuration at `path`.
///
/// # Errors
///
/// Returns `QoeError::Io` if the file cannot be read and a serialization or
/// config error if its content is invalid.
pub async fn load_config(path: &Path) -> Result<QoeConfig> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        QoeError::io(format!(
            "Failed to read configuration file at {}: {}",
            path.display(),
            e
        ))
    })?;
    let config = QoeConfig::from_toml_str(&content)?;
    tracing::debug!("[ConfigLoader] Loaded configuration from {}", path.display());
    Ok(config)
}

/// Loads the configuration at `path`, or the defaults if the file is absent.
pub async fn load_config_or_default(path: &Path) -> Result<QoeConfig> {
    if !tokio::fs::try_exists(path).await? {
        tracing::debug!(
            "[ConfigLoader] No configuration at {}, using defaults",
            path.display()
        );
        return Ok(QoeConfig::default());
    }
    load_config(path).await
}
