use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use stepflow_commands::{InMemorySessionStore, MenuSettings};
use stepflow_config::StepflowConfig;
use stepflow_logging::{init_logger, LoggerGuard};

/// `--config` when given, else `$STEPFLOW_CONFIG_DIR/config.yaml` or
/// `~/.stepflow/config.yaml`.
pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| stepflow_config::config_file_path(&stepflow_config::config_dir()))
}

/// Runtime config plus the logger guard that must outlive it.
pub struct Loaded {
    pub config: StepflowConfig,
    pub _logger: LoggerGuard,
}

/// Read the file, start logging with its settings, then prepare it.
///
/// Logging comes up before validation so config warnings are not lost.
pub async fn load(path: &Path, require_token: bool) -> Result<Loaded> {
    let raw = stepflow_config::load_config(path).await?;
    let logger = init_logger(raw.log_dir().map(Path::new), raw.log_level());
    let env: HashMap<String, String> = std::env::vars().collect();
    let config = stepflow_config::prepare(raw, &env, require_token)?;
    Ok(Loaded { config, _logger: logger })
}

pub fn menu_settings(config: &StepflowConfig) -> MenuSettings {
    MenuSettings {
        prompt: config.menu_prompt().to_string(),
        cancel_prompt: config.cancel_prompt().to_string(),
        cancel_label: config.cancel_label().to_string(),
    }
}

pub fn session_store(config: &StepflowConfig) -> Arc<InMemorySessionStore> {
    match config.idle_timeout() {
        Some(timeout) => Arc::new(InMemorySessionStore::with_idle_timeout(timeout)),
        None => Arc::new(InMemorySessionStore::new()),
    }
}
