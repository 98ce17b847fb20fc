//! Message entity for conversations.
//!
//! Messages are immutable records of user/assistant exchanges. The only
//! permitted mutation of a transcript is removing an optimistic user turn
//! whose send failed, which happens at the controller level by id.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, MessageId, Timestamp};

use super::ActionResult;

/// Role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Operator input.
    User,
    /// AI assistant response.
    Assistant,
}

/// A quick-reply button attached to an assistant turn.
///
/// Buttons map by ordinal position to a canonical reply text: the first
/// button answers "1", the second "2", and so on. Once any button in a
/// turn's set is used, the whole set is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    /// Display label for the button.
    pub label: String,
}

impl ActionButton {
    /// Creates a new action button.
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }

    /// Canonical reply text for the button at `index` within its set.
    pub fn canonical_reply(index: usize) -> String {
        (index + 1).to_string()
    }
}

/// One turn in a conversation.
///
/// # Invariants
///
/// - `content` is non-empty for user turns (validated at construction)
/// - `created_at` is set at construction and never changes
/// - only assistant turns carry action results and buttons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    id: MessageId,
    role: Role,
    content: String,
    created_at: Timestamp,
    #[serde(default)]
    action_results: Vec<ActionResult>,
    #[serde(default)]
    action_buttons: Vec<ActionButton>,
}

impl ChatMessage {
    /// Creates a user message.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if content is empty after trimming
    pub fn user(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::validation(
                "content",
                "Message content cannot be empty",
            ));
        }
        Ok(Self {
            id: MessageId::new(),
            role: Role::User,
            content,
            created_at: Timestamp::now(),
            action_results: Vec::new(),
            action_buttons: Vec::new(),
        })
    }

    /// Creates an assistant message with its attached results and buttons.
    pub fn assistant(
        content: impl Into<String>,
        action_results: Vec<ActionResult>,
        action_buttons: Vec<ActionButton>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            role: Role::Assistant,
            content: content.into(),
            created_at: Timestamp::now(),
            action_results,
            action_buttons,
        }
    }

    /// Reconstitutes a message from backend storage (no validation).
    pub fn reconstitute(
        id: MessageId,
        role: Role,
        content: String,
        created_at: Timestamp,
        action_results: Vec<ActionResult>,
        action_buttons: Vec<ActionButton>,
    ) -> Self {
        Self {
            id,
            role,
            content,
            created_at,
            action_results,
            action_buttons,
        }
    }

    /// Returns the message ID.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns the role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns when the message was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns the action results attached to this turn.
    pub fn action_results(&self) -> &[ActionResult] {
        &self.action_results
    }

    /// Returns the quick-reply buttons attached to this turn.
    pub fn action_buttons(&self) -> &[ActionButton] {
        &self.action_buttons
    }

    /// Returns true if this message is from the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Returns true if this message is from the assistant.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }

    /// Returns true if this turn offers quick-reply buttons.
    pub fn has_buttons(&self) -> bool {
        !self.action_buttons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_rejects_empty_content() {
        assert!(ChatMessage::user("").is_err());
        assert!(ChatMessage::user("   \n\t ").is_err());
    }

    #[test]
    fn user_message_keeps_content() {
        let msg = ChatMessage::user("Bonjour").unwrap();
        assert!(msg.is_user());
        assert_eq!(msg.content(), "Bonjour");
        assert!(msg.action_results().is_empty());
    }

    #[test]
    fn assistant_message_carries_buttons() {
        let msg = ChatMessage::assistant(
            "Que souhaitez-vous faire ?",
            Vec::new(),
            vec![ActionButton::new("Créer une facture"), ActionButton::new("Voir les stats")],
        );
        assert!(msg.is_assistant());
        assert!(msg.has_buttons());
        assert_eq!(msg.action_buttons().len(), 2);
    }

    #[test]
    fn canonical_reply_is_one_based_ordinal() {
        assert_eq!(ActionButton::canonical_reply(0), "1");
        assert_eq!(ActionButton::canonical_reply(1), "2");
        assert_eq!(ActionButton::canonical_reply(2), "3");
    }

    #[test]
    fn role_serializes_to_snake_case() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn reconstitute_preserves_all_fields() {
        let id = MessageId::new();
        let created_at = Timestamp::now();
        let msg = ChatMessage::reconstitute(
            id,
            Role::Assistant,
            "Voici".to_string(),
            created_at,
            Vec::new(),
            vec![ActionButton::new("Oui")],
        );
        assert_eq!(msg.id(), &id);
        assert_eq!(msg.created_at(), &created_at);
        assert_eq!(msg.action_buttons().len(), 1);
    }
}
