//! HTTP adapters for the backend and transcription ports.

mod backend;
mod transcriber;

pub use backend::{BackendHttpConfig, HttpBackendClient};
pub use transcriber::{HttpTranscriber, TranscriberHttpConfig};
