//! Menu and cancel-affordance keyboards.

use stepflow_core::{Keyboard, KeyboardButton, OutboundMessage, UserId};

use crate::detection::CANCEL_COMMAND;
use crate::registry::CommandGraph;

/// Texts shown by the dispatcher itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSettings {
    /// Message above the command menu.
    pub prompt: String,
    /// Message above the cancel button.
    pub cancel_prompt: String,
    pub cancel_label: String,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            prompt: "Please select a command:".to_string(),
            cancel_prompt: "Please select a command:".to_string(),
            cancel_label: "❌".to_string(),
        }
    }
}

/// One row per category, holding only chain heads. Empty rows are dropped.
pub fn menu_keyboard(graph: &CommandGraph) -> Keyboard {
    graph
        .categories()
        .into_iter()
        .map(|(_, entries)| {
            entries
                .into_iter()
                .filter(|e| e.step.is_head())
                .map(|e| KeyboardButton::new(&e.descriptor.name, &e.descriptor.name))
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect()
}

/// The menu message, or `None` when there is nothing to show.
pub fn menu_message(graph: &CommandGraph, settings: &MenuSettings, user_id: UserId) -> Option<OutboundMessage> {
    let keyboard = menu_keyboard(graph);
    if keyboard.is_empty() {
        return None;
    }
    Some(OutboundMessage::with_keyboard(user_id, settings.prompt.clone(), keyboard))
}

/// Single-button message offering to abandon the interaction.
pub fn cancel_message(settings: &MenuSettings, user_id: UserId) -> OutboundMessage {
    OutboundMessage::with_keyboard(
        user_id,
        settings.cancel_prompt.clone(),
        vec![vec![KeyboardButton::new(&settings.cancel_label, CANCEL_COMMAND)]],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::Noop;
    use crate::types::CommandDescriptor;

    fn cmd(name: &str) -> CommandDescriptor {
        CommandDescriptor::new(name, Noop)
    }

    fn labels(keyboard: &Keyboard) -> Vec<Vec<&str>> {
        keyboard
            .iter()
            .map(|row| row.iter().map(|b| b.label.as_str()).collect())
            .collect()
    }

    #[test]
    fn one_row_per_category_with_heads_only() {
        let graph = CommandGraph::build(vec![
            cmd("Register").category("profile").next("Name"),
            cmd("Name").category("profile").next("Age"),
            cmd("Age").category("profile"),
            cmd("Help"),
            cmd("About"),
            cmd("Edit").category("profile"),
        ])
        .unwrap();

        let keyboard = menu_keyboard(&graph);
        assert_eq!(labels(&keyboard), vec![vec!["Register", "Edit"], vec!["Help", "About"]]);
        assert_eq!(keyboard[0][0].callback_data, "Register");
    }

    #[test]
    fn categories_without_heads_are_skipped() {
        let graph = CommandGraph::build(vec![
            cmd("Start").next("Follow"),
            cmd("Follow").category("hidden"),
        ])
        .unwrap();
        assert_eq!(labels(&menu_keyboard(&graph)), vec![vec!["Start"]]);
    }

    #[test]
    fn empty_graph_has_no_menu() {
        let graph = CommandGraph::build(vec![]).unwrap();
        assert!(menu_message(&graph, &MenuSettings::default(), 1).is_none());
    }

    #[test]
    fn menu_message_uses_prompt() {
        let graph = CommandGraph::build(vec![cmd("Help")]).unwrap();
        let msg = menu_message(&graph, &MenuSettings::default(), 5).unwrap();
        assert_eq!(msg.user_id, 5);
        assert_eq!(msg.text, "Please select a command:");
        assert_eq!(msg.callback_data(), vec!["Help"]);
    }

    #[test]
    fn cancel_button_posts_reserved_word() {
        let msg = cancel_message(&MenuSettings::default(), 9);
        assert_eq!(msg.callback_data(), vec![CANCEL_COMMAND]);
        assert_eq!(msg.keyboard.unwrap()[0][0].label, "❌");
    }
}
