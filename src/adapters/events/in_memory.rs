//! In-memory event bus.
//!
//! Single-process bus with synchronous, deterministic delivery. This is
//! the production bus for the orchestration layer (all subscribers live
//! in the same process) and doubles as the test bus.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{
    AppEvent, EventHandler, EventKind, EventPublisher, EventSubscriber, SubscriptionId,
};

type HandlerEntry = (SubscriptionId, Arc<dyn EventHandler>);

/// In-process event bus.
///
/// Delivery is synchronous: `publish` awaits every matching handler in
/// subscription order before returning, so tests can assert effects
/// immediately after publishing.
///
/// # Panics
///
/// Methods panic if an internal lock is poisoned. Handlers run outside
/// the locks, so a panicking handler cannot poison them.
pub struct InMemoryEventBus {
    handlers: RwLock<HashMap<EventKind, Vec<HandlerEntry>>>,
    published: RwLock<Vec<AppEvent>>,
    next_id: AtomicU64,
}

impl InMemoryEventBus {
    /// Creates a new empty event bus.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            published: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    // === Test Helpers ===

    /// Returns all published events (for test assertions).
    pub fn published_events(&self) -> Vec<AppEvent> {
        self.published
            .read()
            .expect("InMemoryEventBus: published lock poisoned")
            .clone()
    }

    /// Returns published events of one kind.
    pub fn events_of_kind(&self, kind: EventKind) -> Vec<AppEvent> {
        self.published_events()
            .into_iter()
            .filter(|e| e.kind() == kind)
            .collect()
    }

    /// Returns count of published events.
    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .expect("InMemoryEventBus: published lock poisoned")
            .len()
    }

    /// Checks whether any event of the given kind was published.
    pub fn has_event(&self, kind: EventKind) -> bool {
        self.published
            .read()
            .expect("InMemoryEventBus: published lock poisoned")
            .iter()
            .any(|e| e.kind() == kind)
    }

    /// Clears all published events (for test isolation).
    pub fn clear(&self) {
        self.published
            .write()
            .expect("InMemoryEventBus: published write lock poisoned")
            .clear();
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: AppEvent) -> Result<(), DomainError> {
        // Store for test assertions
        self.published
            .write()
            .expect("InMemoryEventBus: published write lock poisoned")
            .push(event.clone());

        // Clone handlers to release lock before await points
        let kind_handlers: Vec<Arc<dyn EventHandler>> = {
            let handlers = self
                .handlers
                .read()
                .expect("InMemoryEventBus: handlers lock poisoned");
            handlers
                .get(&event.kind())
                .map(|entries| entries.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };

        // Invoke handlers (lock is released)
        let mut errors = Vec::new();
        for handler in kind_handlers {
            if let Err(e) = handler.handle(event.clone()).await {
                errors.push(format!("{}: {}", handler.name(), e));
            }
        }

        if !errors.is_empty() {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Handler errors: {}", errors.join(", ")),
            ));
        }

        Ok(())
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut handlers = self
            .handlers
            .write()
            .expect("InMemoryEventBus: handlers write lock poisoned");
        handlers.entry(kind).or_default().push((id, handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut handlers = self
            .handlers
            .write()
            .expect("InMemoryEventBus: handlers write lock poisoned");
        for entries in handlers.values_mut() {
            entries.retain(|(entry_id, _)| *entry_id != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PanelKind;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn panel_event() -> AppEvent {
        AppEvent::PanelOpenRequested(PanelKind::Usage)
    }

    struct CountingHandler(Arc<AtomicUsize>);

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _: AppEvent) -> Result<(), DomainError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn name(&self) -> &'static str {
            "CountingHandler"
        }
    }

    #[tokio::test]
    async fn publish_stores_event() {
        let bus = InMemoryEventBus::new();

        bus.publish(panel_event()).await.unwrap();

        assert_eq!(bus.event_count(), 1);
        assert!(bus.has_event(EventKind::PanelOpenRequested));
    }

    #[tokio::test]
    async fn events_of_kind_filters_correctly() {
        let bus = InMemoryEventBus::new();

        bus.publish(panel_event()).await.unwrap();
        bus.publish(AppEvent::SuggestionsRefreshed(Vec::new()))
            .await
            .unwrap();
        bus.publish(panel_event()).await.unwrap();

        let panels = bus.events_of_kind(EventKind::PanelOpenRequested);
        assert_eq!(panels.len(), 2);
    }

    #[tokio::test]
    async fn handler_receives_published_event() {
        let bus = Arc::new(InMemoryEventBus::new());
        let received = Arc::new(AtomicBool::new(false));

        struct TestHandler(Arc<AtomicBool>);

        #[async_trait]
        impl EventHandler for TestHandler {
            async fn handle(&self, _: AppEvent) -> Result<(), DomainError> {
                self.0.store(true, Ordering::SeqCst);
                Ok(())
            }
            fn name(&self) -> &'static str {
                "TestHandler"
            }
        }

        bus.subscribe(
            EventKind::PanelOpenRequested,
            Arc::new(TestHandler(received.clone())),
        );
        bus.publish(panel_event()).await.unwrap();

        assert!(received.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn handler_not_invoked_for_other_kinds() {
        let bus = Arc::new(InMemoryEventBus::new());
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe(
            EventKind::PanelOpenRequested,
            Arc::new(CountingHandler(counter.clone())),
        );
        bus.publish(AppEvent::SuggestionsRefreshed(Vec::new()))
            .await
            .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn multiple_handlers_all_invoked() {
        let bus = Arc::new(InMemoryEventBus::new());
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe(
            EventKind::PanelOpenRequested,
            Arc::new(CountingHandler(counter.clone())),
        );
        bus.subscribe(
            EventKind::PanelOpenRequested,
            Arc::new(CountingHandler(counter.clone())),
        );
        bus.subscribe(
            EventKind::PanelOpenRequested,
            Arc::new(CountingHandler(counter.clone())),
        );

        bus.publish(panel_event()).await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let bus = Arc::new(InMemoryEventBus::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let id = bus.subscribe(
            EventKind::PanelOpenRequested,
            Arc::new(CountingHandler(counter.clone())),
        );

        bus.publish(panel_event()).await.unwrap();
        bus.unsubscribe(id);
        bus.publish(panel_event()).await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsubscribe_unknown_id_is_ignored() {
        let bus = InMemoryEventBus::new();
        bus.unsubscribe(SubscriptionId(9999));
    }

    #[tokio::test]
    async fn clear_removes_all_events() {
        let bus = InMemoryEventBus::new();

        bus.publish(panel_event()).await.unwrap();
        bus.publish(panel_event()).await.unwrap();
        assert_eq!(bus.event_count(), 2);

        bus.clear();

        assert_eq!(bus.event_count(), 0);
    }

    #[tokio::test]
    async fn handler_error_is_propagated() {
        let bus = Arc::new(InMemoryEventBus::new());

        struct FailingHandler;

        #[async_trait]
        impl EventHandler for FailingHandler {
            async fn handle(&self, _: AppEvent) -> Result<(), DomainError> {
                Err(DomainError::new(ErrorCode::InternalError, "Handler failed"))
            }
            fn name(&self) -> &'static str {
                "FailingHandler"
            }
        }

        bus.subscribe(EventKind::PanelOpenRequested, Arc::new(FailingHandler));
        let result = bus.publish(panel_event()).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("FailingHandler"));
    }
}
