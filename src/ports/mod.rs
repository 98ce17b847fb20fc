//! Ports: trait seams between the orchestration layer and its external
//! collaborators (assistant backend, transcription service, event bus).

mod backend;
mod event_bus;
mod transcriber;

pub use backend::{
    AssistantTurn, BackendClient, BackendError, ConversationDetail, Notification,
    SendMessageRequest, Suggestion, UsageSummary,
};
pub use event_bus::{
    AppEvent, EventHandler, EventKind, EventPublisher, EventSubscriber, PanelKind, SubscriptionId,
};
pub use transcriber::AudioTranscriber;
