//! Domain layer: pure protocol and state-machine logic.

pub mod artifact;
pub mod chat;
pub mod confirmation;
pub mod foundation;
pub mod schema;
