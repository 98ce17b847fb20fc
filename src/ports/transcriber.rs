//! AudioTranscriber port - external speech-to-text collaborator.
//!
//! Invoked only from the voice-input affordance; the transcription result
//! is fed into the normal send path as ordinary text and is never
//! special-cased downstream.

use async_trait::async_trait;

use super::BackendError;

/// Port for transcribing recorded audio to text.
#[async_trait]
pub trait AudioTranscriber: Send + Sync {
    /// Transcribes an audio recording.
    async fn transcribe(&self, audio: Vec<u8>, mime_type: &str) -> Result<String, BackendError>;
}
