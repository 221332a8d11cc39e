//! Dispatch Event Logger
//!
//! One structured record per handled chat event, written through `tracing`
//! under the `dispatch_events` target so it can be filtered on its own.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum DispatchLogEvent {
    /// A raw event arrived from the transport.
    Inbound {
        kind: String,
        payload: String,
    },
    /// The dispatcher finished handling an event.
    Outcome {
        summary: String,
    },
    Failure {
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct DispatchLogEntry {
    pub user_id: i64,
    pub timestamp: DateTime<Utc>,
    pub event: DispatchLogEvent,
}

impl DispatchLogEntry {
    /// Build an entry with all free text redacted.
    pub fn new(user_id: i64, mut event: DispatchLogEvent) -> Self {
        match &mut event {
            DispatchLogEvent::Inbound { payload, .. } => {
                *payload = redact_sensitive_data(payload);
            }
            DispatchLogEvent::Outcome { summary } => {
                *summary = redact_sensitive_data(summary);
            }
            DispatchLogEvent::Failure { error_msg } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
        }
        Self { user_id, timestamp: Utc::now(), event }
    }
}

pub struct EventLogger;

impl EventLogger {
    pub fn log_event(user_id: i64, event: DispatchLogEvent) {
        let entry = DispatchLogEntry::new(user_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "dispatch_events", user_id, entry = %json, "Dispatch event");
    }
}
