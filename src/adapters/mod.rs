//! Adapters: concrete implementations of the port traits.

pub mod events;
pub mod http;
