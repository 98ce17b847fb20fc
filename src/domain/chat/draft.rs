//! Entity drafts proposed by the assistant, awaiting human confirmation.
//!
//! A draft is a free-form field map for one entity kind, optionally carrying
//! line items. Whenever items are mutated, `total_amount` is recomputed as
//! the exact sum of `quantity * unit_price`; it is never hand-edited
//! independently of the items.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::domain::foundation::ValidationError;
use crate::domain::schema::EntityKind;

/// Fixed synthetic message text sent with a confirmation turn.
///
/// The content is a protocol marker, not operator-authored prose.
pub const CONFIRMATION_PHRASE: &str = "Confirmer la création";

/// One line item on an invoice or purchase order draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    description: String,
    quantity: f64,
    unit_price: f64,
}

impl LineItem {
    /// Creates a validated line item.
    ///
    /// # Errors
    ///
    /// - empty description
    /// - quantity not strictly positive
    /// - negative unit price
    pub fn new(
        description: impl Into<String>,
        quantity: f64,
        unit_price: f64,
    ) -> Result<Self, ValidationError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(ValidationError::empty_field("description"));
        }
        if !(quantity > 0.0) {
            return Err(ValidationError::invalid_format(
                "quantity",
                "must be greater than zero",
            ));
        }
        if unit_price < 0.0 {
            return Err(ValidationError::invalid_format(
                "unit_price",
                "cannot be negative",
            ));
        }
        Ok(Self {
            description,
            quantity,
            unit_price,
        })
    }

    /// Returns the item description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the quantity.
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Returns the unit price.
    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    /// Returns this line's subtotal.
    pub fn subtotal(&self) -> f64 {
        self.quantity * self.unit_price
    }

    fn from_value(value: &JsonValue) -> Option<Self> {
        let description = value.get("description")?.as_str()?.to_string();
        let quantity = value.get("quantity")?.as_f64()?;
        let unit_price = value.get("unit_price")?.as_f64()?;
        LineItem::new(description, quantity, unit_price).ok()
    }
}

/// An AI-proposed, not-yet-persisted set of field values for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDraft {
    kind: EntityKind,
    fields: BTreeMap<String, JsonValue>,
    #[serde(default)]
    items: Vec<LineItem>,
}

impl EntityDraft {
    /// Creates a draft with the given fields and no items.
    pub fn new(kind: EntityKind, fields: BTreeMap<String, JsonValue>) -> Self {
        Self {
            kind,
            fields,
            items: Vec::new(),
        }
    }

    /// Parses a draft from the backend's free-form `draft_data` object.
    ///
    /// An `items` array inside the object is split out into typed line
    /// items; entries that do not parse are dropped. Non-object input
    /// yields an empty draft.
    pub fn from_value(kind: EntityKind, value: &JsonValue) -> Self {
        let mut fields = BTreeMap::new();
        let mut items = Vec::new();

        if let Some(map) = value.as_object() {
            for (key, val) in map {
                if key == "items" {
                    if let Some(entries) = val.as_array() {
                        items.extend(entries.iter().filter_map(LineItem::from_value));
                    }
                } else {
                    fields.insert(key.clone(), val.clone());
                }
            }
        }

        Self { kind, fields, items }
    }

    /// Returns the entity kind.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the field map.
    pub fn fields(&self) -> &BTreeMap<String, JsonValue> {
        &self.fields
    }

    /// Returns one field value.
    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        self.fields.get(name)
    }

    /// Returns the line items.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Sets a field value.
    ///
    /// `total_amount` cannot be set this way while items are present; it is
    /// owned by the recomputation in `add_item`/`remove_item`.
    pub fn set_field(&mut self, name: impl Into<String>, value: JsonValue) {
        let name = name.into();
        if name == "total_amount" && !self.items.is_empty() {
            return;
        }
        self.fields.insert(name, value);
    }

    /// Appends a line item and recomputes `total_amount`.
    pub fn add_item(&mut self, item: LineItem) {
        self.items.push(item);
        self.recompute_total();
    }

    /// Removes the line item at `index` and recomputes `total_amount`.
    ///
    /// Out-of-range indices are ignored.
    pub fn remove_item(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
            self.recompute_total();
        }
    }

    /// Returns the current total: the exact item sum when items are present,
    /// otherwise whatever the draft's `total_amount` field holds.
    pub fn total_amount(&self) -> f64 {
        if self.items.is_empty() {
            self.fields
                .get("total_amount")
                .and_then(JsonValue::as_f64)
                .unwrap_or(0.0)
        } else {
            self.items.iter().map(LineItem::subtotal).sum()
        }
    }

    fn recompute_total(&mut self) {
        let total: f64 = self.items.iter().map(LineItem::subtotal).sum();
        self.fields.insert("total_amount".to_string(), json!(total));
    }
}

/// A confirmed creation request, ready to hand to the backend.
///
/// Built only by the confirmation workflow at the moment of final confirm;
/// always tagged with the entity kind and `force_create: true`, which is
/// what distinguishes a committed request from the assistant's original
/// non-committing proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmationPayload {
    #[serde(flatten)]
    fields: Map<String, JsonValue>,
    entity_type: EntityKind,
    force_create: bool,
}

impl ConfirmationPayload {
    pub(crate) fn from_draft(draft: &EntityDraft) -> Self {
        let mut fields = Map::new();
        for (key, value) in draft.fields() {
            fields.insert(key.clone(), value.clone());
        }
        if !draft.items().is_empty() {
            fields.insert(
                "items".to_string(),
                serde_json::to_value(draft.items()).unwrap_or(JsonValue::Null),
            );
            // The item sum is authoritative, whatever the draft fields held
            fields.insert(
                "total_amount".to_string(),
                json!(draft.items().iter().map(LineItem::subtotal).sum::<f64>()),
            );
        }
        Self {
            fields,
            entity_type: draft.kind(),
            force_create: true,
        }
    }

    /// Returns the entity kind being created.
    pub fn entity_type(&self) -> EntityKind {
        self.entity_type
    }

    /// Always true: a payload only exists for a confirmed creation.
    pub fn force_create(&self) -> bool {
        self.force_create
    }

    /// Returns one flattened field value.
    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        self.fields.get(name)
    }

    /// Serializes the payload to its wire representation.
    pub fn to_value(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}
