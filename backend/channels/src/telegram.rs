use std::sync::Arc;

use async_trait::async_trait;
use stepflow_commands::{CommandDispatcher, DispatchOutcome};
use stepflow_core::{DispatchError, InboundEvent, Keyboard, OutboundMessage, Transport, UserId};
use stepflow_logging::{DispatchLogEvent, EventLogger};
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message};
use tracing::{error, info, warn};

use crate::ChannelAdapter;

/// Sends dispatcher output to Telegram chats. The user id is the chat id.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        Self::new(Bot::new(token))
    }

    /// The underlying client, shared with [`TelegramAdapter`].
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

/// One inline row per keyboard row; each button carries its callback data.
pub fn inline_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.callback_data.clone()))
            .collect::<Vec<_>>()
    }))
}

#[async_trait]
impl Transport for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, message: OutboundMessage) -> anyhow::Result<()> {
        let request = self.bot.send_message(ChatId(message.user_id), message.text);
        match message.keyboard {
            Some(keyboard) => request.reply_markup(inline_markup(&keyboard)).await?,
            None => request.await?,
        };
        Ok(())
    }
}

/// Long-polls Telegram and hands every text message and button press to the
/// dispatcher.
pub struct TelegramAdapter {
    bot: Bot,
    dispatcher: Arc<CommandDispatcher>,
}

impl TelegramAdapter {
    pub fn new(bot: Bot, dispatcher: Arc<CommandDispatcher>) -> Self {
        Self { bot, dispatcher }
    }
}

#[async_trait]
impl ChannelAdapter for TelegramAdapter {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> anyhow::Result<()> {
        info!(commands = self.dispatcher.graph().len(), "Starting Telegram adapter");

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(on_message))
            .branch(Update::filter_callback_query().endpoint(on_callback));

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![self.dispatcher.clone()])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram adapter stopped");
        Ok(())
    }
}

async fn on_message(msg: Message, dispatcher: Arc<CommandDispatcher>) -> ResponseResult<()> {
    // Stickers, photos and the like carry no text and are not part of any flow.
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let event = InboundEvent::text(msg.chat.id.0, text);
    forward(&dispatcher, event, "text").await;
    Ok(())
}

async fn on_callback(bot: Bot, q: CallbackQuery, dispatcher: Arc<CommandDispatcher>) -> ResponseResult<()> {
    // Stop the client-side spinner before doing any work.
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(error = %e, "Failed to answer callback query");
    }

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let user_id: UserId = q
        .message
        .as_ref()
        .map(|m| m.chat().id.0)
        .unwrap_or(q.from.id.0 as i64);
    forward(&dispatcher, InboundEvent::callback(user_id, data), "callback").await;
    Ok(())
}

/// Dispatch one event and log how it went. Failures stay inside this
/// update so one bad action never stops the polling loop.
async fn forward(dispatcher: &CommandDispatcher, event: InboundEvent, kind: &str) {
    let user_id = event.user_id();
    let payload = match &event {
        InboundEvent::Callback { data, .. } => data.clone(),
        InboundEvent::Text { text, .. } => text.clone(),
    };
    EventLogger::log_event(user_id, DispatchLogEvent::Inbound { kind: kind.to_string(), payload });

    match dispatcher.handle(event).await {
        Ok(outcome) => {
            EventLogger::log_event(user_id, DispatchLogEvent::Outcome { summary: summarize(&outcome) });
        }
        Err(err) => {
            match &err {
                DispatchError::Action { command, .. } => error!(user_id, command = %command, "Command action failed"),
                DispatchError::Transport(_) => error!(user_id, "Failed to deliver message"),
            }
            EventLogger::log_event(user_id, DispatchLogEvent::Failure { error_msg: err.to_string() });
        }
    }
}

pub(crate) fn summarize(outcome: &DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::MenuShown => "menu_shown".to_string(),
        DispatchOutcome::Cancelled { menu_shown } => format!("cancelled menu_shown={menu_shown}"),
        DispatchOutcome::CommandStarted { command } => format!("command_started {command}"),
        DispatchOutcome::ReplyRecorded { step, next, completed } => match next {
            Some(next) => format!("reply_recorded {step} -> {next} completed={completed}"),
            None => format!("reply_recorded {step} completed={completed}"),
        },
        DispatchOutcome::Ignored { reason } => format!("ignored {reason:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepflow_commands::IgnoreReason;
    use stepflow_core::KeyboardButton;

    #[test]
    fn markup_keeps_rows_and_callback_data() {
        let keyboard = vec![
            vec![KeyboardButton::new("A", "A"), KeyboardButton::new("B", "B")],
            vec![KeyboardButton::new("❌", "cancel")],
        ];
        let markup = inline_markup(&keyboard);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert_eq!(markup.inline_keyboard[1][0].text, "❌");
    }

    #[test]
    fn outcome_summaries() {
        assert_eq!(summarize(&DispatchOutcome::MenuShown), "menu_shown");
        assert_eq!(
            summarize(&DispatchOutcome::ReplyRecorded { step: "A".into(), next: Some("B".into()), completed: false }),
            "reply_recorded A -> B completed=false"
        );
        assert_eq!(
            summarize(&DispatchOutcome::Ignored { reason: IgnoreReason::NotAwaitingReply }),
            "ignored NotAwaitingReply"
        );
    }
}
