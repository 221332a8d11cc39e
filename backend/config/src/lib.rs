//! `stepflow-config`: runtime configuration for the Stepflow bot.
//!
//! Loads `config.yaml`, expands `${ENV_VAR}` references, applies defaults
//! and validates the result before anything else starts.

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, parse_config, CONFIG_DIR_ENV};
pub use redact::{mask_secret, redact};
pub use schema::{LoggingConfig, MenuConfig, SessionConfig, StepflowConfig, TelegramConfig};
pub use validation::{validate, validate_for_serving, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::time::Duration;

/// Environment variable that overrides `telegram.botToken`.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Make a config read by [`load_config`] ready for the runtime: apply the
/// bot token override, expand `${VAR}` references from `env`, fill in
/// defaults and validate.
///
/// `require_token` is set by commands that connect to Telegram; they fail
/// here rather than at the first API call.
pub fn prepare(
    raw: StepflowConfig,
    env: &HashMap<String, String>,
    require_token: bool,
) -> Result<StepflowConfig> {
    let mut raw = raw;
    // The variable wins over the file, which also lets the file reference an unset one.
    if let Some(token) = env.get(BOT_TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
        raw.telegram.get_or_insert_with(TelegramConfig::default).bot_token = Some(token.clone());
    }

    let value = serde_json::to_value(&raw).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars_with(&value, env)?;
    let config: StepflowConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;
    let config = apply_all_defaults(config);

    let report = if require_token { validate_for_serving(&config) } else { validate(&config) };
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.into_iter().next() {
        bail!(first);
    }
    Ok(config)
}

impl StepflowConfig {
    /// Idle expiry as a duration, when configured.
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs().map(Duration::from_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        let secs = self
            .session
            .as_ref()
            .and_then(|s| s.sweep_interval_secs)
            .unwrap_or(defaults::DEFAULT_SWEEP_INTERVAL_SECS);
        Duration::from_secs(secs)
    }

    pub fn menu_prompt(&self) -> &str {
        self.menu.as_ref().and_then(|m| m.prompt.as_deref()).unwrap_or(defaults::DEFAULT_PROMPT)
    }

    pub fn cancel_prompt(&self) -> &str {
        self.menu
            .as_ref()
            .and_then(|m| m.cancel_prompt.as_deref())
            .unwrap_or(defaults::DEFAULT_CANCEL_PROMPT)
    }

    pub fn cancel_label(&self) -> &str {
        self.menu
            .as_ref()
            .and_then(|m| m.cancel_label.as_deref())
            .unwrap_or(defaults::DEFAULT_CANCEL_LABEL)
    }
}
