//! `stepflow simulate`: drive the dispatcher from stdin.
//!
//! A line starting with `@` presses the button with that callback data
//! (`@FirstCommand`, `@cancel`); any other line is sent as text.

use anyhow::Result;
use stepflow_commands::CommandDispatcher;
use stepflow_core::{DispatchError, InboundEvent, UserId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

pub fn parse_line(user_id: UserId, line: &str) -> Option<InboundEvent> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }
    match line.strip_prefix('@') {
        Some(data) => Some(InboundEvent::callback(user_id, data.trim())),
        None => Some(InboundEvent::text(user_id, line)),
    }
}

pub async fn run(dispatcher: &CommandDispatcher, user_id: UserId) -> Result<()> {
    println!("Simulating user {user_id}. Type /start to begin, @Name to press a button, Ctrl-D to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(event) = parse_line(user_id, &line) else { continue };
        match dispatcher.handle(event).await {
            Ok(outcome) => println!("  -> {outcome:?}"),
            Err(DispatchError::Action { command, error }) => {
                warn!(command = %command, error = %error, "Action failed");
                println!("  !! {command} failed: {error}");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
