//! Application layer: controllers and interpretation logic that wire the
//! domain to the ports.

mod controller;
mod interpreter;
mod polling;

pub use controller::{ConversationController, SendError};
pub use interpreter::{interpret, EntityAffordance, RenderDecision};
pub use polling::{PollingAgent, DEFAULT_POLL_INTERVAL};
