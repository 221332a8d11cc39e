//! Locating and reading the config file.

use crate::schema::StepflowConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

const CONFIG_FILE_NAME: &str = "config.yaml";

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "STEPFLOW_CONFIG_DIR";

/// Resolve the config directory: `STEPFLOW_CONFIG_DIR`, else `~/.stepflow`.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".stepflow"))
        .unwrap_or_else(|| PathBuf::from(".stepflow"))
}

pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read and parse the config. A missing file yields the empty config.
pub async fn load_config(path: &Path) -> Result<StepflowConfig> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "No config file; using defaults");
        return Ok(StepflowConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

pub fn parse_config(raw: &str) -> Result<StepflowConfig> {
    if raw.trim().is_empty() {
        return Ok(StepflowConfig::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml")).await.unwrap();
        assert_eq!(config, StepflowConfig::default());
    }

    #[tokio::test]
    async fn reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        fs::write(&path, "session:\n  idleTimeoutSecs: 90\n").await.unwrap();
        let config = load_config(&path).await.unwrap();
        assert_eq!(config.idle_timeout_secs(), Some(90));
    }

    #[tokio::test]
    async fn malformed_yaml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        fs::write(&path, "menu: [unclosed").await.unwrap();
        let err = load_config(&path).await.unwrap_err();
        assert!(format!("{err}").contains("config.yaml"));
    }

    #[test]
    fn blank_document_parses() {
        assert_eq!(parse_config("  \n").unwrap(), StepflowConfig::default());
    }
}
