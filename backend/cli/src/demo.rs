//! Built-in registration table served by `stepflow serve`.

use stepflow_commands::{action_fn, ActionContext, CommandDescriptor, SendSummary, SendText};
use stepflow_core::OutboundMessage;

pub fn demo_commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new("FirstCommand", SendText::new("Executing First Command"))
            .cancellable(true)
            .order(1)
            .next("SecondCommand"),
        CommandDescriptor::new("SecondCommand", SendText::new("Executing Second Command")).order(2),
        CommandDescriptor::new("Register", SendText::new("What is your name?"))
            .category("account")
            .cancellable(true)
            .next("Age"),
        CommandDescriptor::new("Age", SendText::new("How old are you?"))
            .category("account")
            .next("Welcome"),
        CommandDescriptor::new("Welcome", action_fn(welcome)).category("account"),
        CommandDescriptor::new("Feedback", SendText::new("What should we improve?"))
            .category("support")
            .cancellable(true)
            .next("FeedbackReceived"),
        CommandDescriptor::new(
            "FeedbackReceived",
            SendSummary { heading: "Thanks! We recorded:".to_string() },
        )
        .category("support"),
    ]
}

async fn welcome(ctx: ActionContext) -> anyhow::Result<()> {
    let name = ctx.accumulated_data.get("Register").map(String::as_str).unwrap_or("there");
    let text = match ctx.accumulated_data.get("Age") {
        Some(age) => format!("Welcome, {name} ({age})!"),
        None => format!("Welcome, {name}!"),
    };
    ctx.transport.send(OutboundMessage::text(ctx.user_id, text)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stepflow_commands::{CommandDispatcher, CommandGraph, DispatchOutcome, InMemorySessionStore};
    use stepflow_core::{InboundEvent, RecordingTransport};

    #[test]
    fn demo_table_builds() {
        let graph = CommandGraph::build(demo_commands()).unwrap();
        let heads: Vec<&str> = graph.heads().map(|e| e.descriptor.name.as_str()).collect();
        assert_eq!(heads, vec!["FirstCommand", "Register", "Feedback"]);
        assert_eq!(graph.step("Register").unwrap().chain_names(), vec!["Register", "Age", "Welcome"]);
    }

    #[tokio::test]
    async fn registration_flow_greets_user() {
        let graph = Arc::new(CommandGraph::build(demo_commands()).unwrap());
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher =
            CommandDispatcher::new(graph, Arc::new(InMemorySessionStore::new()), transport.clone());

        dispatcher.handle(InboundEvent::callback(9, "Register")).await.unwrap();
        dispatcher.handle(InboundEvent::text(9, "Ada")).await.unwrap();
        let outcome = dispatcher.handle(InboundEvent::text(9, "36")).await.unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::ReplyRecorded { step: "Age".into(), next: Some("Welcome".into()), completed: true }
        );
        let texts: Vec<String> = transport.sent_to(9).await.into_iter().map(|m| m.text).collect();
        assert_eq!(texts.last().map(String::as_str), Some("Welcome, Ada (36)!"));
    }
}
