//! Editable form backing the "modify" path of the confirmation workflow.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::domain::chat::{EntityDraft, LineItem};
use crate::domain::foundation::ValidationError;
use crate::domain::schema::{EntitySchema, EntitySchemaRegistry};

/// An editable copy of a proposed draft, seeded from the entity's schema.
///
/// The form owns its own draft so the workflow's original proposal stays
/// untouched; quick-confirm always sends the unedited original. Field edits
/// clear that field's validation error. Item mutations keep the
/// `total_amount` invariant through the underlying draft.
#[derive(Debug, Clone)]
pub struct EditForm {
    draft: EntityDraft,
    errors: BTreeMap<String, String>,
}

impl EditForm {
    /// Seeds a form from a proposed draft.
    pub fn seeded_from(original: &EntityDraft) -> Self {
        Self {
            draft: original.clone(),
            errors: BTreeMap::new(),
        }
    }

    /// Returns the schema driving this form's field list.
    pub fn schema(&self) -> &'static EntitySchema {
        EntitySchemaRegistry::global().schema(self.draft.kind())
    }

    /// Returns the edited draft.
    pub fn draft(&self) -> &EntityDraft {
        &self.draft
    }

    /// Returns the current per-field validation errors.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Returns one field's current value.
    pub fn value(&self, name: &str) -> Option<&JsonValue> {
        self.draft.field(name)
    }

    /// Sets a field value and clears that field's validation error.
    pub fn set_field(&mut self, name: impl Into<String>, value: JsonValue) {
        let name = name.into();
        self.errors.remove(&name);
        self.draft.set_field(name, value);
    }

    /// Adds a line item; the draft recomputes `total_amount`.
    ///
    /// # Errors
    ///
    /// Propagates line-item validation (empty description, quantity <= 0,
    /// negative unit price).
    pub fn add_item(
        &mut self,
        description: impl Into<String>,
        quantity: f64,
        unit_price: f64,
    ) -> Result<(), ValidationError> {
        let item = LineItem::new(description, quantity, unit_price)?;
        self.draft.add_item(item);
        self.errors.remove("total_amount");
        Ok(())
    }

    /// Removes the line item at `index`; the draft recomputes `total_amount`.
    pub fn remove_item(&mut self, index: usize) {
        self.draft.remove_item(index);
    }

    /// Validates all fields against the schema.
    ///
    /// On failure the per-field messages are retained on the form and
    /// `false` is returned; nothing is submitted partially.
    pub fn validate(&mut self) -> bool {
        self.errors = self.schema().validate(self.draft.fields());
        self.errors.is_empty()
    }
}
