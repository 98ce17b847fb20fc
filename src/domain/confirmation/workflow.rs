//! Per-entity confirmation state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::chat::{ActionResult, ConfirmationPayload, EntityDraft, NestedPreview};
use crate::domain::foundation::DomainError;

use super::EditForm;

/// States of the confirmation workflow.
///
/// ```text
/// Idle -> PreviewShown -> { ModalOpen -> Confirmed | Cancelled }
///                       | Confirmed
///                       | Cancelled
/// ```
///
/// `Confirmed` and `Cancelled` are terminal; the workflow instance is
/// single-use per proposed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Inert "review and confirm" affordance is displayed.
    Idle,
    /// The summary preview (and nested cards) is open.
    PreviewShown,
    /// The editable modify form is open.
    ModalOpen,
    /// A confirmation payload was produced.
    Confirmed,
    /// The proposal was dropped locally; the backend was never contacted.
    Cancelled,
}

impl WorkflowState {
    /// Returns true once the workflow can no longer transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Confirmed | WorkflowState::Cancelled)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowState::Idle => "Idle",
            WorkflowState::PreviewShown => "PreviewShown",
            WorkflowState::ModalOpen => "ModalOpen",
            WorkflowState::Confirmed => "Confirmed",
            WorkflowState::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Drives preview -> modify -> confirm/cancel for one proposed entity.
///
/// The original draft is kept unedited: the quick confirm path always sends
/// exactly what the assistant proposed. Nested previews are exposed
/// read-only; confirming the parent implicitly creates them, and no
/// operation on this type can confirm or cancel one independently.
#[derive(Debug, Clone)]
pub struct EntityConfirmationWorkflow {
    state: WorkflowState,
    original: EntityDraft,
    nested: Vec<NestedPreview>,
    form: Option<EditForm>,
}

impl EntityConfirmationWorkflow {
    /// Creates a workflow for a confirmation-needing action result.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the result does not need confirmation or
    ///   carries no draft
    pub fn for_result(result: &ActionResult) -> Result<Self, DomainError> {
        if !result.needs_confirmation {
            return Err(DomainError::validation(
                "needs_confirmation",
                "Action result does not request confirmation",
            ));
        }
        let original = result.draft.clone().ok_or_else(|| {
            DomainError::validation("draft_data", "Confirmation result carries no draft")
        })?;

        Ok(Self {
            state: WorkflowState::Idle,
            original,
            nested: result.nested_previews.clone(),
            form: None,
        })
    }

    /// Returns the current state.
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Returns the original, unedited proposal.
    pub fn proposed(&self) -> &EntityDraft {
        &self.original
    }

    /// Returns the read-only nested previews.
    pub fn nested_previews(&self) -> &[NestedPreview] {
        &self.nested
    }

    /// Returns the modify form while the modal is open.
    pub fn form(&self) -> Option<&EditForm> {
        self.form.as_ref()
    }

    /// Mutable access to the modify form while the modal is open.
    pub fn form_mut(&mut self) -> Option<&mut EditForm> {
        if self.state == WorkflowState::ModalOpen {
            self.form.as_mut()
        } else {
            None
        }
    }

    /// Opens the summary preview.
    pub fn open_preview(&mut self) -> Result<(), DomainError> {
        match self.state {
            WorkflowState::Idle => {
                self.state = WorkflowState::PreviewShown;
                Ok(())
            }
            from => Err(DomainError::invalid_transition(from, "open preview")),
        }
    }

    /// Opens the modify modal, seeding the form from the proposal.
    pub fn open_modal(&mut self) -> Result<&EditForm, DomainError> {
        match self.state {
            WorkflowState::PreviewShown => {
                self.form = Some(EditForm::seeded_from(&self.original));
                self.state = WorkflowState::ModalOpen;
                Ok(self.form.as_ref().expect("form was just seeded"))
            }
            from => Err(DomainError::invalid_transition(from, "open modify form")),
        }
    }

    /// Quick path: accepts the proposal as-is.
    ///
    /// Builds the confirmation payload from the original unedited draft.
    pub fn confirm(&mut self) -> Result<ConfirmationPayload, DomainError> {
        match self.state {
            WorkflowState::PreviewShown => {
                self.state = WorkflowState::Confirmed;
                Ok(ConfirmationPayload::from_draft(&self.original))
            }
            from => Err(DomainError::invalid_transition(from, "confirm")),
        }
    }

    /// Submits the modify form.
    ///
    /// Validation failures keep the modal open with per-field messages and
    /// return a `ValidationFailed` error; nothing is partially submitted.
    pub fn submit(&mut self) -> Result<ConfirmationPayload, DomainError> {
        match self.state {
            WorkflowState::ModalOpen => {
                let form = self.form.as_mut().expect("modal open implies form");
                if !form.validate() {
                    return Err(DomainError::new(
                        crate::domain::foundation::ErrorCode::ValidationFailed,
                        format!("{} field(s) failed validation", form.errors().len()),
                    ));
                }
                let payload = ConfirmationPayload::from_draft(form.draft());
                self.state = WorkflowState::Confirmed;
                Ok(payload)
            }
            from => Err(DomainError::invalid_transition(from, "submit form")),
        }
    }

    /// Drops the proposal locally, from any live state.
    ///
    /// No backend call is made; the assistant may re-offer the entity in a
    /// later turn.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        if self.state.is_terminal() {
            return Err(DomainError::invalid_transition(self.state, "cancel"));
        }
        self.form = None;
        self.state = WorkflowState::Cancelled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::schema::EntityKind;
    use serde_json::json;

    fn confirmation_result() -> ActionResult {
        ActionResult::from_value(&json!({
            "success": true,
            "needs_confirmation": true,
            "data": {"entity_type": "invoice"},
            "draft_data": {"client_name": "Jean Dupont", "total_amount": 500},
            "nested_previews": [{
                "entity_type": "client",
                "draft_data": {"name": "Jean Dupont"},
                "message": "Ce client sera créé automatiquement"
            }]
        }))
    }

    #[test]
    fn rejects_result_without_confirmation_flag() {
        let result = ActionResult::from_value(&json!({
            "success": true,
            "data": {"entity_type": "invoice", "id": 1}
        }));
        assert!(EntityConfirmationWorkflow::for_result(&result).is_err());
    }

    #[test]
    fn starts_idle_with_nested_previews() {
        let wf = EntityConfirmationWorkflow::for_result(&confirmation_result()).unwrap();
        assert_eq!(wf.state(), WorkflowState::Idle);
        assert_eq!(wf.nested_previews().len(), 1);
        assert!(wf.form().is_none());
    }

    #[test]
    fn quick_confirm_uses_original_unedited_draft() {
        let mut wf = EntityConfirmationWorkflow::for_result(&confirmation_result()).unwrap();
        wf.open_preview().unwrap();
        let payload = wf.confirm().unwrap();

        assert_eq!(wf.state(), WorkflowState::Confirmed);
        assert_eq!(payload.entity_type(), EntityKind::Invoice);
        assert!(payload.force_create());
        assert_eq!(payload.field("client_name"), Some(&json!("Jean Dupont")));
        assert_eq!(payload.field("total_amount"), Some(&json!(500)));
    }

    #[test]
    fn confirm_requires_preview_first() {
        let mut wf = EntityConfirmationWorkflow::for_result(&confirmation_result()).unwrap();
        let err = wf.confirm().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn modify_path_submits_edited_fields() {
        let mut wf = EntityConfirmationWorkflow::for_result(&confirmation_result()).unwrap();
        wf.open_preview().unwrap();
        wf.open_modal().unwrap();

        let form = wf.form_mut().unwrap();
        form.set_field("client_name", json!("Marie Curie"));
        form.add_item("Conseil", 2.0, 100.0).unwrap();

        let payload = wf.submit().unwrap();
        assert_eq!(wf.state(), WorkflowState::Confirmed);
        assert_eq!(payload.field("client_name"), Some(&json!("Marie Curie")));
        assert_eq!(payload.field("total_amount"), Some(&json!(200.0)));
        assert!(payload.force_create());
    }

    #[test]
    fn submit_blocks_on_validation_failure() {
        let mut wf = EntityConfirmationWorkflow::for_result(&confirmation_result()).unwrap();
        wf.open_preview().unwrap();
        wf.open_modal().unwrap();
        wf.form_mut().unwrap().set_field("client_name", json!(""));

        let err = wf.submit().unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        // Modal stays open with the field error retained
        assert_eq!(wf.state(), WorkflowState::ModalOpen);
        assert!(wf.form().unwrap().errors().contains_key("client_name"));
    }

    #[test]
    fn editing_after_failed_submit_allows_retry() {
        let mut wf = EntityConfirmationWorkflow::for_result(&confirmation_result()).unwrap();
        wf.open_preview().unwrap();
        wf.open_modal().unwrap();
        wf.form_mut().unwrap().set_field("client_name", json!(""));
        assert!(wf.submit().is_err());

        wf.form_mut().unwrap().set_field("client_name", json!("Marie Curie"));
        assert!(wf.submit().is_ok());
    }

    #[test]
    fn cancel_works_from_every_live_state() {
        for open_steps in 0..3 {
            let mut wf = EntityConfirmationWorkflow::for_result(&confirmation_result()).unwrap();
            if open_steps >= 1 {
                wf.open_preview().unwrap();
            }
            if open_steps >= 2 {
                wf.open_modal().unwrap();
            }
            wf.cancel().unwrap();
            assert_eq!(wf.state(), WorkflowState::Cancelled);
            assert!(wf.form().is_none());
        }
    }

    #[test]
    fn terminal_states_reject_further_transitions() {
        let mut wf = EntityConfirmationWorkflow::for_result(&confirmation_result()).unwrap();
        wf.open_preview().unwrap();
        wf.confirm().unwrap();

        assert!(wf.open_preview().is_err());
        assert!(wf.confirm().is_err());
        assert!(wf.cancel().is_err());
    }

    #[test]
    fn form_is_inaccessible_outside_modal() {
        let mut wf = EntityConfirmationWorkflow::for_result(&confirmation_result()).unwrap();
        assert!(wf.form_mut().is_none());
        wf.open_preview().unwrap();
        assert!(wf.form_mut().is_none());
    }
}
