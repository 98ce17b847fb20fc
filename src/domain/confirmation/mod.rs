//! Confirm-before-create workflow for AI-proposed entities.
//!
//! One single-use state machine per proposed entity drives
//! preview -> modify -> confirm/cancel. Dependent (nested) drafts are shown
//! read-only and created implicitly with their parent.

mod form;
mod workflow;

pub use form::EditForm;
pub use workflow::{EntityConfirmationWorkflow, WorkflowState};
