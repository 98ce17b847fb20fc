//! Typed publish/subscribe bus for cross-component signaling.
//!
//! Sibling UI regions observe refreshed side-channel data and open-panel
//! intents without direct coupling. The event set is a closed sum: adding a
//! kind is a compile-time change, not a new ambient string.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{ConversationId, DomainError};

use super::{Notification, Suggestion, UsageSummary};

/// Panels a component may ask to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Usage,
    Notifications,
    Artifacts,
    History,
}

/// Closed set of application events.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A fresh usage snapshot arrived from the side channel.
    UsageRefreshed(UsageSummary),
    /// Fresh notifications arrived from the side channel.
    NotificationsRefreshed(Vec<Notification>),
    /// Fresh prompt suggestions arrived from the side channel.
    SuggestionsRefreshed(Vec<Suggestion>),
    /// A component requests that a sibling panel opens.
    PanelOpenRequested(PanelKind),
    /// A conversation's transcript changed (turn appended or reloaded).
    ConversationUpdated(ConversationId),
}

/// Event discriminant used for subscription routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    UsageRefreshed,
    NotificationsRefreshed,
    SuggestionsRefreshed,
    PanelOpenRequested,
    ConversationUpdated,
}

impl AppEvent {
    /// Returns this event's routing discriminant.
    pub fn kind(&self) -> EventKind {
        match self {
            AppEvent::UsageRefreshed(_) => EventKind::UsageRefreshed,
            AppEvent::NotificationsRefreshed(_) => EventKind::NotificationsRefreshed,
            AppEvent::SuggestionsRefreshed(_) => EventKind::SuggestionsRefreshed,
            AppEvent::PanelOpenRequested(_) => EventKind::PanelOpenRequested,
            AppEvent::ConversationUpdated(_) => EventKind::ConversationUpdated,
        }
    }
}

/// Handler invoked for each delivered event.
///
/// Handlers must be idempotent to repeated delivery.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handles one event.
    async fn handle(&self, event: AppEvent) -> Result<(), DomainError>;

    /// Handler name, for diagnostics.
    fn name(&self) -> &'static str;
}

/// Token returned by `subscribe`, used to unsubscribe on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Port for publishing application events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes a single event to current subscribers of its kind.
    async fn publish(&self, event: AppEvent) -> Result<(), DomainError>;
}

/// Port for subscribing to application events.
pub trait EventSubscriber: Send + Sync {
    /// Registers a handler for one event kind.
    fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>) -> SubscriptionId;

    /// Removes a previously registered handler.
    ///
    /// Idempotent: unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that traits are object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn EventPublisher, _: &dyn EventSubscriber) {}

    #[test]
    fn every_event_maps_to_its_kind() {
        assert_eq!(
            AppEvent::PanelOpenRequested(PanelKind::Usage).kind(),
            EventKind::PanelOpenRequested
        );
        assert_eq!(
            AppEvent::ConversationUpdated(ConversationId::new()).kind(),
            EventKind::ConversationUpdated
        );
        assert_eq!(
            AppEvent::SuggestionsRefreshed(Vec::new()).kind(),
            EventKind::SuggestionsRefreshed
        );
    }
}
