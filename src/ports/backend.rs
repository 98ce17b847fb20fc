//! BackendClient port - interface to the remote AI assistant backend.
//!
//! The backend accepts one outbound message per turn and answers with an
//! assistant turn carrying zero or more action results and optional
//! quick-reply buttons. Side-channel endpoints (usage, suggestions,
//! notifications) are independent of the chat protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::domain::chat::{
    ActionButton, ActionResult, ChatMessage, ConfirmationPayload, ConversationSummary,
};
use crate::domain::foundation::{ConversationId, NotificationId, Timestamp};

/// Errors from the assistant backend.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The request never completed (connection refused, timeout, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Response decoding failed: {0}")]
    Decode(String),
}

/// Outbound request for one conversation turn.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    /// The operator's message, or the fixed confirmation phrase.
    pub message: String,
    /// Absent on the very first turn of a conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
    /// Present only when confirming a proposed entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_data: Option<ConfirmationPayload>,
}

impl SendMessageRequest {
    /// Creates a plain message request.
    pub fn new(message: impl Into<String>, conversation_id: Option<ConversationId>) -> Self {
        Self {
            message: message.into(),
            conversation_id,
            confirmation_data: None,
        }
    }

    /// Attaches a confirmation payload.
    pub fn with_confirmation(mut self, payload: ConfirmationPayload) -> Self {
        self.confirmation_data = Some(payload);
        self
    }
}

/// One assistant turn as returned by the backend.
#[derive(Debug, Clone)]
pub struct AssistantTurn {
    /// Conversation id; assigns the conversation on the first turn.
    pub conversation_id: ConversationId,
    /// Assistant reply text.
    pub content: String,
    /// Structured outcomes attached to the turn.
    pub action_results: Vec<ActionResult>,
    /// Optional quick-reply buttons.
    pub action_buttons: Vec<ActionButton>,
}

/// A full stored conversation.
#[derive(Debug, Clone)]
pub struct ConversationDetail {
    pub conversation: ConversationSummary,
    pub messages: Vec<ChatMessage>,
}

/// Account-level quota/feature consumption snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    /// Messages consumed in the current period.
    pub messages_used: u32,
    /// Message allowance for the period, when the plan is capped.
    #[serde(default)]
    pub messages_limit: Option<u32>,
    /// Per-feature usage counters, passed through for display.
    #[serde(default)]
    pub features: JsonValue,
}

impl UsageSummary {
    /// Returns true when a capped plan has been exhausted.
    pub fn is_exhausted(&self) -> bool {
        match self.messages_limit {
            Some(limit) => self.messages_used >= limit,
            None => false,
        }
    }
}

/// A prompt suggestion offered on an empty conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Short display label.
    pub label: String,
    /// Full prompt text sent when the suggestion is picked.
    pub prompt: String,
}

/// A backend notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub read: bool,
    pub created_at: Timestamp,
}

/// Port for the remote assistant backend.
///
/// Implementations must not retry on their own: a failed send unwinds via
/// the controller's optimistic rollback, and the operator retries by
/// resending.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Sends one conversation turn and returns the assistant's reply.
    async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<AssistantTurn, BackendError>;

    /// Lists stored conversations.
    async fn get_history(&self) -> Result<Vec<ConversationSummary>, BackendError>;

    /// Fetches a full conversation with its messages.
    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<ConversationDetail, BackendError>;

    /// Deletes a stored conversation.
    async fn delete_conversation(&self, id: ConversationId) -> Result<(), BackendError>;

    /// Fetches the quota/feature usage snapshot.
    async fn get_usage_summary(&self) -> Result<UsageSummary, BackendError>;

    /// Fetches prompt suggestions.
    async fn get_suggestions(&self) -> Result<Vec<Suggestion>, BackendError>;

    /// Fetches notifications, optionally unread only.
    async fn get_notifications(
        &self,
        unread_only: bool,
    ) -> Result<Vec<Notification>, BackendError>;

    /// Marks one notification as read.
    async fn mark_notification_read(&self, id: NotificationId) -> Result<(), BackendError>;
}
