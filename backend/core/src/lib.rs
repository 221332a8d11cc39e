pub mod error;
pub mod transport;
pub mod types;

pub use error::{DispatchError, RegistrationError};
pub use transport::{RecordingTransport, Transport};
pub use types::{InboundEvent, Keyboard, KeyboardButton, OutboundMessage, UserId};
