//! HTTP implementation of the `BackendClient` port.
//!
//! Talks to the assistant backend's REST API with `reqwest`. Wire payloads
//! arrive as loosely-shaped JSON; action results in particular are parsed
//! through the domain's tag classifier rather than serde derives, so an
//! unknown `entity_type` degrades to `Unsupported` instead of a decode error.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::chat::{
    ActionButton, ActionResult, ChatMessage, ConversationSummary, Role,
};
use crate::domain::foundation::{ConversationId, MessageId, NotificationId, Timestamp};
use crate::ports::{
    AssistantTurn, BackendClient, BackendError, ConversationDetail, Notification,
    SendMessageRequest, Suggestion, UsageSummary,
};

/// Configuration for the HTTP backend client.
#[derive(Debug, Clone)]
pub struct BackendHttpConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Base URL of the backend (no trailing slash).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl BackendHttpConfig {
    /// Creates a new configuration.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: base_url.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// HTTP backend client.
pub struct HttpBackendClient {
    config: BackendHttpConfig,
    client: Client,
}

impl HttpBackendClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: BackendHttpConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<Response, BackendError> {
        self.client
            .get(self.url(path))
            .bearer_auth(self.config.api_key())
            .send()
            .await
            .map_err(map_transport_error)
    }

    async fn post_json(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<Response, BackendError> {
        self.client
            .post(self.url(path))
            .bearer_auth(self.config.api_key())
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, BackendError> {
        let response = handle_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

fn map_transport_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Transport(format!("Request timed out: {}", e))
    } else if e.is_connect() {
        BackendError::Transport(format!("Connection failed: {}", e))
    } else {
        BackendError::Transport(e.to_string())
    }
}

/// Maps non-success statuses to `BackendError::Status` with the body text
/// as the message (truncated body beats a silent code).
async fn handle_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<JsonValue>(&body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(JsonValue::as_str)
                .map(str::to_string)
        })
        .unwrap_or(body);

    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl BackendClient for HttpBackendClient {
    async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<AssistantTurn, BackendError> {
        let response = self.post_json("/api/chat/send", &request).await?;
        let wire: SendResponseWire = self.decode(response).await?;
        Ok(wire.into_turn())
    }

    async fn get_history(&self) -> Result<Vec<ConversationSummary>, BackendError> {
        let response = self.get("/api/conversations").await?;
        let wire: Vec<ConversationSummaryWire> = self.decode(response).await?;
        Ok(wire.into_iter().map(ConversationSummaryWire::into_summary).collect())
    }

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<ConversationDetail, BackendError> {
        let response = self.get(&format!("/api/conversations/{}", id)).await?;
        let wire: ConversationDetailWire = self.decode(response).await?;
        Ok(wire.into_detail())
    }

    async fn delete_conversation(&self, id: ConversationId) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/conversations/{}", id)))
            .bearer_auth(self.config.api_key())
            .send()
            .await
            .map_err(map_transport_error)?;
        handle_status(response).await?;
        Ok(())
    }

    async fn get_usage_summary(&self) -> Result<UsageSummary, BackendError> {
        let response = self.get("/api/usage/summary").await?;
        self.decode(response).await
    }

    async fn get_suggestions(&self) -> Result<Vec<Suggestion>, BackendError> {
        let response = self.get("/api/chat/suggestions").await?;
        self.decode(response).await
    }

    async fn get_notifications(
        &self,
        unread_only: bool,
    ) -> Result<Vec<Notification>, BackendError> {
        let path = if unread_only {
            "/api/notifications?unread=true"
        } else {
            "/api/notifications"
        };
        let response = self.get(path).await?;
        self.decode(response).await
    }

    async fn mark_notification_read(&self, id: NotificationId) -> Result<(), BackendError> {
        let response = self
            .post_json(&format!("/api/notifications/{}/read", id), &JsonValue::Null)
            .await?;
        handle_status(response).await?;
        Ok(())
    }
}

// ----- Wire Types -----

#[derive(Debug, Deserialize)]
struct SendResponseWire {
    conversation_id: Uuid,
    response: String,
    #[serde(default)]
    action_results: Vec<JsonValue>,
    #[serde(default)]
    action_buttons: Vec<ActionButtonWire>,
}

impl SendResponseWire {
    fn into_turn(self) -> AssistantTurn {
        AssistantTurn {
            conversation_id: ConversationId::from_uuid(self.conversation_id),
            content: self.response,
            action_results: self
                .action_results
                .iter()
                .map(ActionResult::from_value)
                .collect(),
            action_buttons: self
                .action_buttons
                .into_iter()
                .map(|b| ActionButton::new(b.label))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ActionButtonWire {
    label: String,
}

#[derive(Debug, Deserialize)]
struct ConversationSummaryWire {
    id: Uuid,
    title: String,
    #[serde(default)]
    summary: Option<String>,
    message_count: u32,
    last_message_at: chrono::DateTime<chrono::Utc>,
}

impl ConversationSummaryWire {
    fn into_summary(self) -> ConversationSummary {
        ConversationSummary {
            id: ConversationId::from_uuid(self.id),
            title: self.title,
            summary: self.summary,
            message_count: self.message_count,
            last_message_at: Timestamp::from_datetime(self.last_message_at),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConversationDetailWire {
    #[serde(flatten)]
    summary: ConversationSummaryWire,
    #[serde(default)]
    messages: Vec<MessageWire>,
}

impl ConversationDetailWire {
    fn into_detail(self) -> ConversationDetail {
        ConversationDetail {
            conversation: self.summary.into_summary(),
            messages: self.messages.into_iter().map(MessageWire::into_message).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageWire {
    id: Uuid,
    role: Role,
    content: String,
    created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    action_results: Vec<JsonValue>,
    #[serde(default)]
    action_buttons: Vec<ActionButtonWire>,
}

impl MessageWire {
    fn into_message(self) -> ChatMessage {
        ChatMessage::reconstitute(
            MessageId::from_uuid(self.id),
            self.role,
            self.content,
            Timestamp::from_datetime(self.created_at),
            self.action_results.iter().map(ActionResult::from_value).collect(),
            self.action_buttons
                .into_iter()
                .map(|b| ActionButton::new(b.label))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_exposes_key_only_through_accessor() {
        let config = BackendHttpConfig::new("secret-key", "https://api.gestia.fr")
            .with_timeout(Duration::from_secs(30));
        assert_eq!(config.api_key(), "secret-key");
        assert_eq!(config.timeout, Duration::from_secs(30));
        // Debug output must not leak the key
        assert!(!format!("{:?}", config).contains("secret-key"));
    }

    #[test]
    fn send_response_wire_maps_to_turn() {
        let wire: SendResponseWire = serde_json::from_value(json!({
            "conversation_id": "6f9a2f64-1d3c-4a5e-9b7f-0c8d1e2f3a4b",
            "response": "Voici votre analyse",
            "action_results": [
                {"success": true, "data": {"entity_type": "visualization",
                 "chart_type": "bar", "chart_title": "Revenus Mensuels",
                 "chart_data": {}}}
            ],
            "action_buttons": [{"label": "Oui"}, {"label": "Non"}]
        }))
        .unwrap();

        let turn = wire.into_turn();
        assert_eq!(turn.content, "Voici votre analyse");
        assert_eq!(turn.action_results.len(), 1);
        assert!(turn.action_results[0].success);
        assert_eq!(turn.action_buttons.len(), 2);
        assert_eq!(turn.action_buttons[0].label, "Oui");
    }

    #[test]
    fn send_response_wire_defaults_empty_collections() {
        let wire: SendResponseWire = serde_json::from_value(json!({
            "conversation_id": "6f9a2f64-1d3c-4a5e-9b7f-0c8d1e2f3a4b",
            "response": "Bonjour !"
        }))
        .unwrap();

        let turn = wire.into_turn();
        assert!(turn.action_results.is_empty());
        assert!(turn.action_buttons.is_empty());
    }

    #[test]
    fn conversation_detail_wire_reconstitutes_messages() {
        let wire: ConversationDetailWire = serde_json::from_value(json!({
            "id": "6f9a2f64-1d3c-4a5e-9b7f-0c8d1e2f3a4b",
            "title": "Factures de mars",
            "message_count": 2,
            "last_message_at": "2026-03-10T09:30:00Z",
            "messages": [
                {"id": "11111111-1111-4111-8111-111111111111", "role": "user",
                 "content": "Crée une facture", "created_at": "2026-03-10T09:29:00Z"},
                {"id": "22222222-2222-4222-8222-222222222222", "role": "assistant",
                 "content": "Voici la proposition", "created_at": "2026-03-10T09:30:00Z",
                 "action_results": [{"success": true, "needs_confirmation": true,
                  "data": {"entity_type": "invoice"},
                  "draft_data": {"client_name": "Jean Dupont"}}]}
            ]
        }))
        .unwrap();

        let detail = wire.into_detail();
        assert_eq!(detail.conversation.title, "Factures de mars");
        assert_eq!(detail.messages.len(), 2);
        assert!(detail.messages[0].is_user());
        assert!(detail.messages[1].action_results()[0].needs_confirmation);
    }
}
