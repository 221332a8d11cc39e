//! Command descriptor and step types.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use stepflow_core::{Transport, UserId};

/// Category used when a descriptor does not name one.
pub const DEFAULT_CATEGORY: &str = "default";

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Everything an action can see when it fires.
#[derive(Clone)]
pub struct ActionContext {
    pub user_id: UserId,
    /// Name of the step whose action is running.
    pub command: String,
    pub auxiliary_data: Option<String>,
    /// Replies collected so far in the current interaction, in the order given.
    pub accumulated_data: IndexMap<String, String>,
    pub transport: Arc<dyn Transport>,
}

/// The side effect performed when a command fires.
#[async_trait]
pub trait CommandAction: Send + Sync {
    async fn execute(&self, ctx: &ActionContext) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Static metadata and action for one user-invocable command.
#[derive(Clone)]
pub struct CommandDescriptor {
    /// Unique key; also the button label and callback payload.
    pub name: String,
    pub category: String,
    pub action: Arc<dyn CommandAction>,
    pub auxiliary_data: Option<String>,
    /// Offer a cancel button after the command fires.
    pub cancellable: bool,
    pub order: i32,
    /// Command that follows this one in a guided sequence.
    pub next_name: Option<String>,
}

impl CommandDescriptor {
    pub fn new(name: impl Into<String>, action: impl CommandAction + 'static) -> Self {
        Self::with_action(name, Arc::new(action))
    }

    pub fn with_action(name: impl Into<String>, action: Arc<dyn CommandAction>) -> Self {
        Self {
            name: name.into(),
            category: DEFAULT_CATEGORY.to_string(),
            action,
            auxiliary_data: None,
            cancellable: false,
            order: 0,
            next_name: None,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.auxiliary_data = Some(data.into());
        self
    }

    pub fn cancellable(mut self, cancellable: bool) -> Self {
        self.cancellable = cancellable;
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn next(mut self, name: impl Into<String>) -> Self {
        self.next_name = Some(name.into());
        self
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("auxiliary_data", &self.auxiliary_data)
            .field("cancellable", &self.cancellable)
            .field("order", &self.order)
            .field("next_name", &self.next_name)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// Rebuilt copy of the step that links to another one.
///
/// Only consulted to decide whether a step is a chain head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrevLink {
    pub name: String,
    pub order: i32,
}

/// A resolved, executable node of a chain.
#[derive(Clone)]
pub struct Step {
    pub name: String,
    pub action: Arc<dyn CommandAction>,
    pub auxiliary_data: Option<String>,
    pub next: Option<Arc<Step>>,
    pub prev: Option<PrevLink>,
    pub order: i32,
}

impl Step {
    /// A step with no back-reference is shown in the menu.
    pub fn is_head(&self) -> bool {
        self.prev.is_none()
    }

    /// Names along the chain starting at this step.
    pub fn chain_names(&self) -> Vec<&str> {
        let mut names = vec![self.name.as_str()];
        let mut cursor = self.next.as_deref();
        while let Some(step) = cursor {
            names.push(step.name.as_str());
            cursor = step.next.as_deref();
        }
        names
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("auxiliary_data", &self.auxiliary_data)
            .field("next", &self.next)
            .field("prev", &self.prev)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

// Actions carry no identity, so equality is structural over the rest.
impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.auxiliary_data == other.auxiliary_data
            && self.order == other.order
            && self.prev == other.prev
            && self.next == other.next
    }
}

impl Eq for Step {}
