use serde::{Deserialize, Serialize};

/// Stable numeric identity of a conversation, as given by the transport.
pub type UserId = i64;

/// An event delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A keyboard button was pressed; `data` is its callback payload.
    Callback { user_id: UserId, data: String },
    /// A free-text message was received.
    Text { user_id: UserId, text: String },
}

impl InboundEvent {
    pub fn callback(user_id: UserId, data: impl Into<String>) -> Self {
        Self::Callback { user_id, data: data.into() }
    }

    pub fn text(user_id: UserId, text: impl Into<String>) -> Self {
        Self::Text { user_id, text: text.into() }
    }

    pub fn user_id(&self) -> UserId {
        match self {
            Self::Callback { user_id, .. } | Self::Text { user_id, .. } => *user_id,
        }
    }
}

/// A single inline button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardButton {
    pub label: String,
    pub callback_data: String,
}

impl KeyboardButton {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self { label: label.into(), callback_data: callback_data.into() }
    }
}

/// Rows of inline buttons attached to a message.
pub type Keyboard = Vec<Vec<KeyboardButton>>;

/// A "send message" request handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub user_id: UserId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Keyboard>,
}

impl OutboundMessage {
    pub fn text(user_id: UserId, text: impl Into<String>) -> Self {
        Self { user_id, text: text.into(), keyboard: None }
    }

    pub fn with_keyboard(user_id: UserId, text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self { user_id, text: text.into(), keyboard: Some(keyboard) }
    }

    /// Callback payloads of every button, row by row.
    pub fn callback_data(&self) -> Vec<&str> {
        self.keyboard
            .iter()
            .flatten()
            .flatten()
            .map(|b| b.callback_data.as_str())
            .collect()
    }
}
