//! Command dispatch: the per-user session state machine.
//!
//! Every inbound event is classified, routed against the user's session and
//! the command graph, and the resulting session is written back whole.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use stepflow_core::{DispatchError, InboundEvent, Transport, UserId};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::detection::classify;
use crate::menu::{cancel_message, menu_message, MenuSettings};
use crate::registry::CommandGraph;
use crate::session::{Session, SessionStore};
use crate::types::{ActionContext, Step};

// ---------------------------------------------------------------------------
// Events and outcomes
// ---------------------------------------------------------------------------

/// An inbound event after reserved-word classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DispatchEvent {
    CallbackSelected { user_id: UserId, name: String },
    TextReceived { user_id: UserId, text: String },
    StartRequested { user_id: UserId },
    CancelRequested { user_id: UserId },
}

impl DispatchEvent {
    pub fn user_id(&self) -> UserId {
        match self {
            Self::CallbackSelected { user_id, .. }
            | Self::TextReceived { user_id, .. }
            | Self::StartRequested { user_id }
            | Self::CancelRequested { user_id } => *user_id,
        }
    }
}

/// Why an event left the session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    UnknownCommand,
    NotAwaitingReply,
    EmptyMenu,
}

/// What handling one event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    MenuShown,
    Cancelled { menu_shown: bool },
    CommandStarted { command: String },
    ReplyRecorded { step: String, next: Option<String>, completed: bool },
    Ignored { reason: IgnoreReason },
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct CommandDispatcher {
    graph: Arc<CommandGraph>,
    sessions: Arc<dyn SessionStore>,
    transport: Arc<dyn Transport>,
    settings: MenuSettings,
    /// Serializes events of the same user; different users run in parallel.
    user_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl CommandDispatcher {
    pub fn new(
        graph: Arc<CommandGraph>,
        sessions: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::with_settings(graph, sessions, transport, MenuSettings::default())
    }

    pub fn with_settings(
        graph: Arc<CommandGraph>,
        sessions: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
        settings: MenuSettings,
    ) -> Self {
        Self {
            graph,
            sessions,
            transport,
            settings,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn graph(&self) -> &CommandGraph {
        &self.graph
    }

    /// Classify and handle one transport event.
    pub async fn handle(&self, event: InboundEvent) -> Result<DispatchOutcome, DispatchError> {
        self.dispatch(classify(event)).await
    }

    /// Handle one classified event. Events of the same user never interleave.
    pub async fn dispatch(&self, event: DispatchEvent) -> Result<DispatchOutcome, DispatchError> {
        let user_id = event.user_id();
        let lock = self.user_lock(user_id).await;

        let result = {
            let _guard = lock.lock().await;
            match event {
                DispatchEvent::StartRequested { user_id } => self.show_menu(user_id).await,
                DispatchEvent::CancelRequested { user_id } => self.cancel(user_id).await,
                DispatchEvent::CallbackSelected { user_id, name } => self.select(user_id, &name).await,
                DispatchEvent::TextReceived { user_id, text } => self.reply(user_id, text).await,
            }
        };

        self.release_user_lock(user_id, lock).await;
        result
    }

    async fn user_lock(&self, user_id: UserId) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks.entry(user_id).or_default().clone()
    }

    /// Forget the user's lock once no other event holds or waits on it.
    ///
    /// Clones are only handed out under the map lock, so a count of one seen
    /// here cannot grow before the entry is removed.
    async fn release_user_lock(&self, user_id: UserId, lock: Arc<Mutex<()>>) {
        let mut locks = self.user_locks.lock().await;
        drop(lock);
        if locks.get(&user_id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(&user_id);
        }
    }

    async fn show_menu(&self, user_id: UserId) -> Result<DispatchOutcome, DispatchError> {
        let Some(message) = menu_message(&self.graph, &self.settings, user_id) else {
            debug!(user_id, "No commands registered; menu skipped");
            return Ok(DispatchOutcome::Ignored { reason: IgnoreReason::EmptyMenu });
        };
        self.transport.send(message).await.map_err(DispatchError::Transport)?;
        debug!(user_id, "Menu shown");
        Ok(DispatchOutcome::MenuShown)
    }

    async fn cancel(&self, user_id: UserId) -> Result<DispatchOutcome, DispatchError> {
        self.sessions.put(user_id, Session::default()).await;
        info!(user_id, "Interaction cancelled");
        let menu = self.show_menu(user_id).await?;
        Ok(DispatchOutcome::Cancelled { menu_shown: menu == DispatchOutcome::MenuShown })
    }

    async fn select(&self, user_id: UserId, name: &str) -> Result<DispatchOutcome, DispatchError> {
        let Some(entry) = self.graph.get(name) else {
            debug!(user_id, command = %name, "Callback for unknown command ignored");
            return Ok(DispatchOutcome::Ignored { reason: IgnoreReason::UnknownCommand });
        };

        info!(user_id, command = %name, "Command selected");
        let action = self.execute(&entry.step, user_id, IndexMap::new()).await;

        let cancel = if entry.descriptor.cancellable {
            self.transport
                .send(cancel_message(&self.settings, user_id))
                .await
                .map_err(DispatchError::Transport)
        } else {
            Ok(())
        };

        // The transition commits even when the action failed.
        self.sessions.put(user_id, Session::awaiting(entry.step.clone())).await;

        action?;
        cancel?;
        Ok(DispatchOutcome::CommandStarted { command: name.to_string() })
    }

    async fn reply(&self, user_id: UserId, text: String) -> Result<DispatchOutcome, DispatchError> {
        let mut session = self.sessions.get(user_id).await;
        let Some(step) = session.current_step().cloned() else {
            debug!(user_id, "Text outside an interaction ignored");
            return Ok(DispatchOutcome::Ignored { reason: IgnoreReason::NotAwaitingReply });
        };

        session.accumulated_data.insert(step.name.clone(), text);

        let (action, outcome) = match step.next.clone() {
            Some(next) => {
                let action = self
                    .execute(&next, user_id, session.accumulated_data.clone())
                    .await;
                session.completed = next.next.is_none();
                let outcome = DispatchOutcome::ReplyRecorded {
                    step: step.name.clone(),
                    next: Some(next.name.clone()),
                    completed: session.completed,
                };
                session.awaiting_step = Some(next);
                (action, outcome)
            }
            None => {
                session.completed = true;
                let outcome = DispatchOutcome::ReplyRecorded {
                    step: step.name.clone(),
                    next: None,
                    completed: true,
                };
                (Ok(()), outcome)
            }
        };

        info!(
            user_id,
            step = %step.name,
            completed = session.completed,
            "Reply recorded"
        );
        self.sessions.put(user_id, session).await;

        action?;
        Ok(outcome)
    }

    async fn execute(
        &self,
        step: &Step,
        user_id: UserId,
        accumulated_data: IndexMap<String, String>,
    ) -> Result<(), DispatchError> {
        let ctx = ActionContext {
            user_id,
            command: step.name.clone(),
            auxiliary_data: step.auxiliary_data.clone(),
            accumulated_data,
            transport: self.transport.clone(),
        };
        debug!(user_id, command = %step.name, "Executing action");
        step.action.execute(&ctx).await.map_err(|error| DispatchError::Action {
            command: step.name.clone(),
            error,
        })
    }
}
