use std::io::Write;

use async_trait::async_trait;
use stepflow_core::{OutboundMessage, Transport};

/// Prints outbound messages to stdout, keyboard rows as `[label|data]`.
#[derive(Debug, Default, Clone)]
pub struct ConsoleTransport;

impl ConsoleTransport {
    pub fn new() -> Self {
        Self
    }
}

/// Render a message the way the console shows it.
pub fn render(message: &OutboundMessage) -> String {
    let mut out = format!("[{}] {}", message.user_id, message.text);
    for row in message.keyboard.iter().flatten() {
        let buttons: Vec<String> = row
            .iter()
            .map(|b| format!("[{}|{}]", b.label, b.callback_data))
            .collect();
        out.push_str("\n    ");
        out.push_str(&buttons.join(" "));
    }
    out
}

#[async_trait]
impl Transport for ConsoleTransport {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, message: OutboundMessage) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", render(&message))?;
        Ok(())
    }
}
