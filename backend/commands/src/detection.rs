//! Reserved-word detection. Turns raw inbound events into dispatcher events.

use stepflow_core::InboundEvent;

use crate::dispatch::DispatchEvent;

/// Text (or callback payload) that opens the menu.
pub const START_COMMAND: &str = "/start";

/// Text (or callback payload) that abandons the current interaction.
pub const CANCEL_COMMAND: &str = "cancel";

/// A reserved word recognised before any accumulation logic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlWord {
    Start,
    Cancel,
}

/// Detect a reserved word.
///
/// `/start` may carry a deep-link payload (`/start ref123`); `cancel` must
/// be the whole message.
pub fn detect_control(text: &str) -> Option<ControlWord> {
    let trimmed = text.trim();
    if trimmed == CANCEL_COMMAND {
        return Some(ControlWord::Cancel);
    }
    let head = trimmed.split_whitespace().next()?;
    (head == START_COMMAND).then_some(ControlWord::Start)
}

/// Whether a command name would be shadowed by a reserved word.
pub fn is_reserved(name: &str) -> bool {
    name == START_COMMAND || name == CANCEL_COMMAND
}

/// Classify an inbound event into the event the state machine handles.
pub fn classify(event: InboundEvent) -> DispatchEvent {
    match event {
        InboundEvent::Text { user_id, text } => match detect_control(&text) {
            Some(ControlWord::Start) => DispatchEvent::StartRequested { user_id },
            Some(ControlWord::Cancel) => DispatchEvent::CancelRequested { user_id },
            None => DispatchEvent::TextReceived { user_id, text },
        },
        InboundEvent::Callback { user_id, data } => match data.as_str() {
            START_COMMAND => DispatchEvent::StartRequested { user_id },
            CANCEL_COMMAND => DispatchEvent::CancelRequested { user_id },
            _ => DispatchEvent::CallbackSelected { user_id, name: data },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_reserved_words() {
        assert_eq!(detect_control("/start"), Some(ControlWord::Start));
        assert_eq!(detect_control("  /start  "), Some(ControlWord::Start));
        assert_eq!(detect_control("/start ref-42"), Some(ControlWord::Start));
        assert_eq!(detect_control("cancel"), Some(ControlWord::Cancel));
    }

    #[test]
    fn ordinary_text_is_not_reserved() {
        assert_eq!(detect_control("hello"), None);
        assert_eq!(detect_control("please cancel"), None);
        assert_eq!(detect_control("/started"), None);
        assert_eq!(detect_control("Cancel"), None);
        assert_eq!(detect_control(""), None);
    }

    #[test]
    fn classifies_text_events() {
        assert_eq!(
            classify(InboundEvent::text(1, "/start")),
            DispatchEvent::StartRequested { user_id: 1 }
        );
        assert_eq!(
            classify(InboundEvent::text(1, "cancel")),
            DispatchEvent::CancelRequested { user_id: 1 }
        );
        assert_eq!(
            classify(InboundEvent::text(1, "Ada")),
            DispatchEvent::TextReceived { user_id: 1, text: "Ada".into() }
        );
    }

    #[test]
    fn classifies_callback_events() {
        assert_eq!(
            classify(InboundEvent::callback(2, "cancel")),
            DispatchEvent::CancelRequested { user_id: 2 }
        );
        assert_eq!(
            classify(InboundEvent::callback(2, "FirstCommand")),
            DispatchEvent::CallbackSelected { user_id: 2, name: "FirstCommand".into() }
        );
    }

    #[test]
    fn reserved_names() {
        assert!(is_reserved("cancel"));
        assert!(is_reserved("/start"));
        assert!(!is_reserved("start"));
    }
}
