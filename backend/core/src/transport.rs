use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::types::{OutboundMessage, UserId};

/// Outbound half of the chat transport.
///
/// Implementations may block on network I/O; callers never hold session
/// state locks across `send`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Human-readable transport name for logging.
    fn name(&self) -> &str;

    async fn send(&self, message: OutboundMessage) -> Result<()>;
}

/// In-memory transport that keeps every message it is asked to send.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages sent so far, oldest first.
    pub async fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Messages sent to one user, oldest first.
    pub async fn sent_to(&self, user_id: UserId) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, message: OutboundMessage) -> Result<()> {
        debug!(user_id = message.user_id, text = %message.text, "Recorded outbound message");
        self.sent.lock().await.push(message);
        Ok(())
    }
}
