//! Reusable command actions.
//!
//! Applications may implement `CommandAction` directly; these cover the
//! common cases of replying with fixed text or running a closure.

use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;
use stepflow_core::OutboundMessage;
use tracing::debug;

use crate::types::{ActionContext, CommandAction};

// ---------------------------------------------------------------------------
// Fixed reply
// ---------------------------------------------------------------------------

/// Sends one fixed message to the user.
pub struct SendText {
    pub text: String,
}

impl SendText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl CommandAction for SendText {
    async fn execute(&self, ctx: &ActionContext) -> Result<()> {
        debug!(user_id = ctx.user_id, command = %ctx.command, "Sending fixed reply");
        ctx.transport
            .send(OutboundMessage::text(ctx.user_id, self.text.clone()))
            .await
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Echoes the replies collected so far, one `name: value` line each.
pub struct SendSummary {
    pub heading: String,
}

#[async_trait]
impl CommandAction for SendSummary {
    async fn execute(&self, ctx: &ActionContext) -> Result<()> {
        let mut lines = vec![self.heading.clone()];
        for (name, value) in &ctx.accumulated_data {
            lines.push(format!("• {name}: {value}"));
        }
        ctx.transport
            .send(OutboundMessage::text(ctx.user_id, lines.join("\n")))
            .await
    }
}

// ---------------------------------------------------------------------------
// Closure
// ---------------------------------------------------------------------------

/// Adapts an async closure into a `CommandAction`.
pub struct FnAction<F>(F);

pub fn action_fn<F, Fut>(f: F) -> FnAction<F>
where
    F: Fn(ActionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    FnAction(f)
}

#[async_trait]
impl<F, Fut> CommandAction for FnAction<F>
where
    F: Fn(ActionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn execute(&self, ctx: &ActionContext) -> Result<()> {
        (self.0)(ctx.clone()).await
    }
}

// ---------------------------------------------------------------------------
// No-op
// ---------------------------------------------------------------------------

pub struct Noop;

#[async_trait]
impl CommandAction for Noop {
    async fn execute(&self, _ctx: &ActionContext) -> Result<()> {
        Ok(())
    }
}
