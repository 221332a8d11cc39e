//! Fill in values the runtime needs when the file leaves them out.

use crate::schema::{LoggingConfig, MenuConfig, SessionConfig, StepflowConfig};

pub const DEFAULT_PROMPT: &str = "Please select a command:";
pub const DEFAULT_CANCEL_PROMPT: &str = "Please select a command:";
pub const DEFAULT_CANCEL_LABEL: &str = "❌";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

pub fn apply_all_defaults(mut config: StepflowConfig) -> StepflowConfig {
    apply_menu_defaults(&mut config);
    apply_session_defaults(&mut config);
    apply_logging_defaults(&mut config);
    config
}

fn apply_menu_defaults(config: &mut StepflowConfig) {
    let menu = config.menu.get_or_insert_with(MenuConfig::default);
    menu.prompt.get_or_insert_with(|| DEFAULT_PROMPT.to_string());
    menu.cancel_prompt.get_or_insert_with(|| DEFAULT_CANCEL_PROMPT.to_string());
    menu.cancel_label.get_or_insert_with(|| DEFAULT_CANCEL_LABEL.to_string());
}

// The sweep interval only matters once an idle timeout is configured.
fn apply_session_defaults(config: &mut StepflowConfig) {
    let session = config.session.get_or_insert_with(SessionConfig::default);
    if session.idle_timeout_secs.is_some() {
        session.sweep_interval_secs.get_or_insert(DEFAULT_SWEEP_INTERVAL_SECS);
    }
}

fn apply_logging_defaults(config: &mut StepflowConfig) {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
}
