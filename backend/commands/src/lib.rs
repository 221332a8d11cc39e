pub mod detection;
pub mod dispatch;
pub mod handlers;
pub mod menu;
pub mod registry;
pub mod sequence;
pub mod session;
pub mod types;

pub use detection::{classify, detect_control, ControlWord, CANCEL_COMMAND, START_COMMAND};
pub use dispatch::{CommandDispatcher, DispatchEvent, DispatchOutcome, IgnoreReason};
pub use handlers::{action_fn, FnAction, Noop, SendSummary, SendText};
pub use menu::{cancel_message, menu_keyboard, menu_message, MenuSettings};
pub use registry::{CommandGraph, GraphEntry};
pub use sequence::{StepSequence, StepSequenceBuilder};
pub use session::{InMemorySessionStore, Session, SessionState, SessionStore};
pub use types::{ActionContext, CommandAction, CommandDescriptor, PrevLink, Step, DEFAULT_CATEGORY};
