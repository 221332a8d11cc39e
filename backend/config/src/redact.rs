//! Printable view of a config with secrets masked.

use crate::schema::StepflowConfig;

const VISIBLE_PREFIX: usize = 4;

/// Keep the first few characters of a secret and hide the rest. Secrets too
/// short to spare a prefix are hidden entirely.
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= VISIBLE_PREFIX {
        return "***".to_string();
    }
    let prefix: String = secret.chars().take(VISIBLE_PREFIX).collect();
    format!("{prefix}***")
}

/// Clone the config with the bot token masked.
pub fn redact(config: &StepflowConfig) -> StepflowConfig {
    let mut out = config.clone();
    if let Some(token) = out.telegram.as_mut().and_then(|t| t.bot_token.as_mut()) {
        *token = mask_secret(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TelegramConfig;

    #[test]
    fn token_is_masked() {
        let config = StepflowConfig {
            telegram: Some(TelegramConfig { bot_token: Some("123456789:AAHdqTcv".into()) }),
            ..Default::default()
        };
        let redacted = redact(&config);
        assert_eq!(redacted.bot_token(), Some("1234***"));
        assert_eq!(config.bot_token(), Some("123456789:AAHdqTcv"));
    }

    #[test]
    fn short_secrets_are_fully_hidden() {
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret("abcd"), "***");
        assert_eq!(mask_secret(""), "***");
        assert_eq!(mask_secret("abcde"), "abcd***");
    }

    #[test]
    fn config_without_token_is_unchanged() {
        let config = StepflowConfig::default();
        assert_eq!(redact(&config), config);
    }
}
