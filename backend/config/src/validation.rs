//! Config checks run once at startup.

use crate::schema::StepflowConfig;
use thiserror::Error;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Error)]
#[error("invalid config at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.to_string(), message: message.into() });
    }

    fn warn(&mut self, path: &str, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.to_string(), message: message.into() });
    }
}

/// Validate everything except the bot token.
pub fn validate(config: &StepflowConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_menu(config, &mut report);
    validate_session(config, &mut report);
    validate_logging(config, &mut report);
    report
}

/// Validate for a process that will connect to Telegram.
pub fn validate_for_serving(config: &StepflowConfig) -> ValidationReport {
    let mut report = validate(config);
    if config.bot_token().is_none() {
        report.error("telegram.botToken", "a bot token is required (set TELEGRAM_BOT_TOKEN)");
    }
    report
}

fn validate_menu(config: &StepflowConfig, report: &mut ValidationReport) {
    let Some(menu) = &config.menu else { return };
    let fields = [
        ("menu.prompt", &menu.prompt),
        ("menu.cancelPrompt", &menu.cancel_prompt),
        ("menu.cancelLabel", &menu.cancel_label),
    ];
    for (path, value) in fields {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            report.error(path, "must not be empty");
        }
    }
}

fn validate_session(config: &StepflowConfig, report: &mut ValidationReport) {
    let Some(session) = &config.session else { return };
    if session.idle_timeout_secs == Some(0) {
        report.error("session.idleTimeoutSecs", "must be greater than zero; omit it to disable expiry");
    }
    if session.sweep_interval_secs == Some(0) {
        report.error("session.sweepIntervalSecs", "must be greater than zero");
    }
    if session.sweep_interval_secs.is_some() && session.idle_timeout_secs.is_none() {
        report.warn("session.sweepIntervalSecs", "ignored without session.idleTimeoutSecs");
    }
}

fn validate_logging(config: &StepflowConfig, report: &mut ValidationReport) {
    let Some(level) = config.logging.as_ref().and_then(|l| l.level.as_deref()) else { return };
    if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        report.warn("logging.level", format!("unknown level '{level}', falling back to info"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LoggingConfig, MenuConfig, SessionConfig, TelegramConfig};

    #[test]
    fn default_config_is_valid_offline() {
        assert!(validate(&StepflowConfig::default()).is_valid());
    }

    #[test]
    fn serving_requires_token() {
        let report = validate_for_serving(&StepflowConfig::default());
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "telegram.botToken");

        let config = StepflowConfig {
            telegram: Some(TelegramConfig { bot_token: Some("1:abc".into()) }),
            ..Default::default()
        };
        assert!(validate_for_serving(&config).is_valid());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = StepflowConfig {
            session: Some(SessionConfig { idle_timeout_secs: Some(0), sweep_interval_secs: None }),
            ..Default::default()
        };
        let report = validate(&config);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "session.idleTimeoutSecs");
    }

    #[test]
    fn blank_cancel_label_is_rejected() {
        let config = StepflowConfig {
            menu: Some(MenuConfig { cancel_label: Some(" ".into()), ..Default::default() }),
            ..Default::default()
        };
        assert!(!validate(&config).is_valid());
    }

    #[test]
    fn unknown_level_only_warns() {
        let config = StepflowConfig {
            logging: Some(LoggingConfig { level: Some("chatty".into()), dir: None }),
            ..Default::default()
        };
        let report = validate(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }
}
