use thiserror::Error;

/// Raised while building the command graph. Always fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("duplicate command name: {0}")]
    DuplicateName(String),

    #[error("command name is reserved: {0}")]
    ReservedName(String),

    #[error("command name cannot be blank")]
    BlankName,
}

/// Raised while handling one inbound event.
///
/// The session transition for the event has already been committed when
/// either variant is returned.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("action for command '{command}' failed: {error}")]
    Action { command: String, error: anyhow::Error },

    #[error("transport send failed: {0}")]
    Transport(anyhow::Error),
}
