//! HTTP implementation of the `AudioTranscriber` port.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::ports::{AudioTranscriber, BackendError};

/// Configuration for the HTTP transcriber.
#[derive(Debug, Clone)]
pub struct TranscriberHttpConfig {
    api_key: Secret<String>,
    /// Base URL of the transcription endpoint (no trailing slash).
    pub base_url: String,
    /// Request timeout. Audio uploads are slower than JSON calls.
    pub timeout: Duration,
}

impl TranscriberHttpConfig {
    /// Creates a new configuration.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: base_url.into(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// HTTP speech-to-text client.
///
/// Posts the raw recording bytes with their mime type and returns the
/// transcribed text. The caller feeds that text into the ordinary send
/// path; nothing downstream distinguishes voice from typed input.
pub struct HttpTranscriber {
    config: TranscriberHttpConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct TranscriptionWire {
    text: String,
}

impl HttpTranscriber {
    /// Creates a new transcriber with the given configuration.
    pub fn new(config: TranscriberHttpConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl AudioTranscriber for HttpTranscriber {
    async fn transcribe(&self, audio: Vec<u8>, mime_type: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(format!("{}/api/transcribe", self.config.base_url))
            .bearer_auth(self.config.api_key())
            .header("Content-Type", mime_type)
            .body(audio)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let wire: TranscriptionWire = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(wire.text)
    }
}
