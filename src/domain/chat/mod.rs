//! Conversation domain - messages, action results, and entity drafts.
//!
//! A conversation is an append-only list of user/assistant turns. Assistant
//! turns carry zero or more action results (business side-effect attempts or
//! data products) and optional quick-reply buttons. Proposed entities travel
//! as drafts awaiting confirmation.

mod action_result;
mod conversation;
mod draft;
mod message;

pub use action_result::{
    ActionData, ActionResult, ChartSpec, Insight, NestedPreview, Severity, SuccessAction,
};
pub use conversation::{group_by_recency, ConversationSummary, RecencyBucket};
pub use draft::{ConfirmationPayload, EntityDraft, LineItem, CONFIRMATION_PHRASE};
pub use message::{ActionButton, ChatMessage, Role};
