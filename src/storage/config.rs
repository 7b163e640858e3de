//! Configuration management

use crate::core::youtube::MAX_RESULTS;
use crate::error::{DashError, Result};
use crate::types::Config;
use crate::utils::paths::{config_path, ensure_dir};
use std::path::Path;
use tokio::fs;
use tokio::process::Command;

/// Load configuration from file, falling back to defaults
pub async fn load_config() -> Result<Config> {
    load_config_from(&config_path()).await
}

/// Load configuration from an explicit path
pub async fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).await?;
    let config: Config = serde_json::from_str(&content)?;
    normalize(config)
}

/// Clamp limits the upstream API enforces and reject unusable values
fn normalize(mut config: Config) -> Result<Config> {
    if config.api_base_url.trim().is_empty() {
        return Err(DashError::InvalidConfig("api_base_url is empty".into()));
    }
    config.page_size = config.page_size.clamp(1, MAX_RESULTS as u32);
    config.batch_size = config.batch_size.clamp(1, MAX_RESULTS);
    if config.log_level.trim().is_empty() {
        config.log_level = Config::default().log_level;
    }
    Ok(config)
}

/// Write `config` as pretty JSON, creating the parent directory
pub async fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }
    fs::write(path, serde_json::to_string_pretty(config)?).await?;
    Ok(())
}

/// Open the config file in `editor`, seeding it with defaults first
pub async fn edit_config(editor: &str) -> Result<()> {
    edit_config_at(editor, &config_path()).await
}

pub async fn edit_config_at(editor: &str, path: &Path) -> Result<()> {
    if !path.exists() {
        save_config_to(&Config::default(), path).await?;
    }

    let status = Command::new(editor)
        .arg(path)
        .status()
        .await
        .map_err(|e| DashError::Editor(format!("could not start '{}': {}", editor, e)))?;

    if !status.success() {
        return Err(DashError::Editor(format!("'{}' exited with {}", editor, status)));
    }

    // The edited file must still parse
    load_config_from(path).await?;
    Ok(())
}
