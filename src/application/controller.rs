//! Conversation controller.
//!
//! Owns the live transcript and drives the send cycle against the backend
//! port. The transcript is append-only except for one sanctioned mutation:
//! undoing an optimistic user turn whose send failed, by message id.

use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::domain::chat::{ActionButton, ChatMessage, ConfirmationPayload, ConversationSummary};
use crate::domain::foundation::{ConversationId, DomainError, MessageId, NotificationId};
use crate::ports::{
    AppEvent, BackendClient, BackendError, EventPublisher, SendMessageRequest,
};

/// Errors from the send cycle.
#[derive(Debug, Error)]
pub enum SendError {
    /// A send is already awaiting its reply.
    #[error("A message is already being sent")]
    SendInFlight,

    /// The outgoing message failed domain validation.
    #[error("Invalid message: {0}")]
    Invalid(#[from] DomainError),

    /// This turn's quick-reply buttons were already used.
    #[error("Quick-reply buttons for this turn were already used")]
    ButtonsAlreadyUsed,

    /// No button exists at the requested position.
    #[error("No quick-reply button at index {0}")]
    UnknownButton(usize),

    /// The backend call failed; the optimistic turn has been rolled back.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// An optimistic transcript insertion, held as an explicit undoable command.
///
/// `apply` appends the user turn before the network call; `undo` removes
/// exactly that turn (by id) if the call fails. Messages appended by other
/// means are never touched.
struct OptimisticTurn {
    message: ChatMessage,
}

impl OptimisticTurn {
    fn new(message: ChatMessage) -> Self {
        Self { message }
    }

    fn id(&self) -> MessageId {
        *self.message.id()
    }

    fn apply(&self, transcript: &mut Vec<ChatMessage>) {
        transcript.push(self.message.clone());
    }

    fn undo(&self, transcript: &mut Vec<ChatMessage>) {
        let id = self.id();
        transcript.retain(|m| *m.id() != id);
    }
}

/// Drives one conversation view.
///
/// Single logical owner: all methods take `&mut self`. Overlapping sends
/// are rejected rather than queued, so the transcript order always matches
/// the backend's view of the exchange.
pub struct ConversationController<B, P> {
    backend: Arc<B>,
    events: Arc<P>,
    conversation_id: Option<ConversationId>,
    messages: Vec<ChatMessage>,
    sending: bool,
    /// Assistant turns whose quick-reply button set has been consumed.
    used_button_turns: HashSet<MessageId>,
}

impl<B, P> ConversationController<B, P>
where
    B: BackendClient,
    P: EventPublisher,
{
    /// Creates a controller with an empty transcript.
    pub fn new(backend: Arc<B>, events: Arc<P>) -> Self {
        Self {
            backend,
            events,
            conversation_id: None,
            messages: Vec::new(),
            sending: false,
            used_button_turns: HashSet::new(),
        }
    }

    /// Returns the current conversation id, if one has been assigned.
    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.conversation_id
    }

    /// Returns the transcript.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Returns true while a send is awaiting its reply.
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Returns true if the given assistant turn's buttons are still usable.
    pub fn buttons_enabled(&self, message_id: &MessageId) -> bool {
        !self.used_button_turns.contains(message_id)
    }

    /// Sends one message and appends the assistant's reply.
    ///
    /// The user turn is appended optimistically before the network call and
    /// rolled back (by id) if the call fails, leaving the transcript exactly
    /// as it was. The first successful turn of a fresh conversation assigns
    /// the conversation id.
    ///
    /// # Errors
    ///
    /// - `SendInFlight` if another send is awaiting its reply
    /// - `Invalid` if the message is empty
    /// - `Backend` if the call fails (transcript already restored)
    pub async fn send(
        &mut self,
        text: impl Into<String>,
        confirmation: Option<ConfirmationPayload>,
    ) -> Result<(), SendError> {
        if self.sending {
            return Err(SendError::SendInFlight);
        }

        let user_turn = OptimisticTurn::new(ChatMessage::user(text)?);
        let mut request =
            SendMessageRequest::new(user_turn.message.content(), self.conversation_id);
        if let Some(payload) = confirmation {
            request = request.with_confirmation(payload);
        }

        user_turn.apply(&mut self.messages);
        self.sending = true;

        let outcome = self.backend.send_message(request).await;
        self.sending = false;

        let turn = match outcome {
            Ok(turn) => turn,
            Err(err) => {
                user_turn.undo(&mut self.messages);
                return Err(err.into());
            }
        };

        if self.conversation_id.is_none() {
            self.conversation_id = Some(turn.conversation_id);
        }
        self.messages.push(ChatMessage::assistant(
            turn.content,
            turn.action_results,
            turn.action_buttons,
        ));

        self.publish(AppEvent::ConversationUpdated(turn.conversation_id))
            .await;
        self.refresh_side_channels().await;

        Ok(())
    }

    /// Answers an assistant turn's quick-reply button by ordinal position.
    ///
    /// The reply text is the canonical "1"/"2"/"3" form, and the whole
    /// button set of that turn is disabled after the first use.
    pub async fn quick_reply(
        &mut self,
        message_id: MessageId,
        button_index: usize,
    ) -> Result<(), SendError> {
        if self.sending {
            return Err(SendError::SendInFlight);
        }
        if self.used_button_turns.contains(&message_id) {
            return Err(SendError::ButtonsAlreadyUsed);
        }
        let button_count = self
            .messages
            .iter()
            .find(|m| *m.id() == message_id)
            .map(|m| m.action_buttons().len())
            .unwrap_or(0);
        if button_index >= button_count {
            return Err(SendError::UnknownButton(button_index));
        }

        self.used_button_turns.insert(message_id);
        let reply = ActionButton::canonical_reply(button_index);
        let result = self.send(reply, None).await;
        if result.is_err() {
            // A failed send consumes nothing; the buttons stay usable.
            self.used_button_turns.remove(&message_id);
        }
        result
    }

    /// Replaces the transcript with a stored conversation.
    ///
    /// Atomic: on any fetch error the current transcript is left untouched.
    pub async fn load_conversation(&mut self, id: ConversationId) -> Result<(), SendError> {
        if self.sending {
            return Err(SendError::SendInFlight);
        }
        let detail = self.backend.get_conversation(id).await?;

        self.conversation_id = Some(detail.conversation.id);
        self.messages = detail.messages;
        self.used_button_turns.clear();

        self.publish(AppEvent::ConversationUpdated(id)).await;
        Ok(())
    }

    /// Resets to an empty, unassigned conversation.
    pub fn start_new_conversation(&mut self) {
        self.conversation_id = None;
        self.messages.clear();
        self.used_button_turns.clear();
    }

    /// Lists stored conversations for the history panel.
    pub async fn history(&self) -> Result<Vec<ConversationSummary>, BackendError> {
        self.backend.get_history().await
    }

    /// Deletes a stored conversation.
    ///
    /// If it is the one currently loaded, the local view resets too.
    pub async fn delete_conversation(&mut self, id: ConversationId) -> Result<(), BackendError> {
        self.backend.delete_conversation(id).await?;
        if self.conversation_id == Some(id) {
            self.start_new_conversation();
        }
        Ok(())
    }

    /// Marks one notification as read.
    pub async fn mark_notification_read(
        &self,
        id: NotificationId,
    ) -> Result<(), BackendError> {
        self.backend.mark_notification_read(id).await
    }

    /// Refreshes the side channels after a successful exchange.
    ///
    /// Each fetch is independent; a failure is logged and skipped, never
    /// surfaced to the send path.
    async fn refresh_side_channels(&self) {
        let (usage, notifications, suggestions) = futures::join!(
            self.backend.get_usage_summary(),
            self.backend.get_notifications(true),
            self.backend.get_suggestions(),
        );

        match usage {
            Ok(summary) => self.publish(AppEvent::UsageRefreshed(summary)).await,
            Err(err) => warn!(error = %err, "usage refresh failed, skipping"),
        }
        match notifications {
            Ok(list) => self.publish(AppEvent::NotificationsRefreshed(list)).await,
            Err(err) => warn!(error = %err, "notification refresh failed, skipping"),
        }
        match suggestions {
            Ok(list) => self.publish(AppEvent::SuggestionsRefreshed(list)).await,
            Err(err) => warn!(error = %err, "suggestion refresh failed, skipping"),
        }
    }

    async fn publish(&self, event: AppEvent) {
        if let Err(err) = self.events.publish(event).await {
            warn!(error = %err, "event publication failed");
        }
    }
}
