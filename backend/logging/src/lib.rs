//! Structured logging for Stepflow.
//!
//! Console and rolling NDJSON output, redaction of secrets, and one
//! structured record per dispatched chat event.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{DispatchLogEntry, DispatchLogEvent, EventLogger};
pub use logger::{init_logger, LoggerGuard};
pub use redact::redact_sensitive_data;
