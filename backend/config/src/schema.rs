//! Stepflow runtime configuration schema.
//!
//! Every field is optional on disk; `defaults::apply_all_defaults` fills in
//! what the runtime needs and `validation::validate` rejects what it cannot
//! run with.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepflowConfig {
    /// Telegram transport credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramConfig>,

    /// Texts shown by the dispatcher itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<MenuConfig>,

    /// Session store behaviour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Telegram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuConfig {
    /// Text above the command menu
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Text above the cancel button
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_label: Option<String>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Abandon an unanswered interaction after this many idle seconds.
    /// Absent means interactions wait forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,
    /// How often expired sessions are swept from memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep_interval_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling NDJSON logs; console only when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl StepflowConfig {
    pub fn bot_token(&self) -> Option<&str> {
        self.telegram
            .as_ref()
            .and_then(|t| t.bot_token.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn idle_timeout_secs(&self) -> Option<u64> {
        self.session.as_ref().and_then(|s| s.idle_timeout_secs)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(crate::defaults::DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.dir.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_yaml() {
        let yaml = r#"
telegram:
  botToken: "123:abc"
menu:
  prompt: "Pick one"
  cancelLabel: "Stop"
session:
  idleTimeoutSecs: 600
logging:
  level: debug
  dir: logs
"#;
        let config: StepflowConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.bot_token(), Some("123:abc"));
        assert_eq!(config.menu.as_ref().unwrap().prompt.as_deref(), Some("Pick one"));
        assert_eq!(config.idle_timeout_secs(), Some(600));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_dir(), Some("logs"));
    }

    #[test]
    fn empty_document_is_default() {
        let config: StepflowConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, StepflowConfig::default());
        assert_eq!(config.bot_token(), None);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let config = StepflowConfig {
            telegram: Some(TelegramConfig { bot_token: Some("  ".into()) }),
            ..Default::default()
        };
        assert_eq!(config.bot_token(), None);
    }
}
