use async_trait::async_trait;

pub mod console;
pub mod telegram;

pub use console::ConsoleTransport;
pub use telegram::{TelegramAdapter, TelegramTransport};

/// Inbound side of a chat platform: receives events and feeds them to the
/// dispatcher until the platform connection ends.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;

    /// Run the receive loop.
    async fn start(&self) -> anyhow::Result<()>;
}
