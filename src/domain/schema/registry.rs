//! Static registry of confirmable entity schemas.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::ValidationError;

/// Closed set of entity kinds the assistant may propose for creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Invoice,
    Client,
    Supplier,
    PurchaseOrder,
    Product,
}

impl EntityKind {
    /// All kinds, in registry order.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Invoice,
        EntityKind::Client,
        EntityKind::Supplier,
        EntityKind::PurchaseOrder,
        EntityKind::Product,
    ];

    /// Returns the wire tag for this kind (matches the backend `entity_type`).
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Invoice => "invoice",
            EntityKind::Client => "client",
            EntityKind::Supplier => "supplier",
            EntityKind::PurchaseOrder => "purchase_order",
            EntityKind::Product => "product",
        }
    }

    /// Returns true if entities of this kind carry line items.
    pub fn supports_items(&self) -> bool {
        matches!(self, EntityKind::Invoice | EntityKind::PurchaseOrder)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(EntityKind::Invoice),
            "client" => Ok(EntityKind::Client),
            "supplier" => Ok(EntityKind::Supplier),
            "purchase_order" => Ok(EntityKind::PurchaseOrder),
            "product" => Ok(EntityKind::Product),
            other => Err(ValidationError::invalid_format(
                "entity_type",
                format!("unknown entity kind '{}'", other),
            )),
        }
    }
}

/// Input type of a schema field, driving both validation and form rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Number,
    Date,
    Multiline,
}

/// Declarative description of a single entity field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as it appears in draft data and confirmation payloads.
    pub name: &'static str,
    /// Human-readable label for previews and forms.
    pub label: &'static str,
    /// Whether the field must be non-empty on submit.
    pub required: bool,
    /// Input type, used for validation.
    pub field_type: FieldType,
}

impl FieldSpec {
    const fn new(
        name: &'static str,
        label: &'static str,
        required: bool,
        field_type: FieldType,
    ) -> Self {
        Self {
            name,
            label,
            required,
            field_type,
        }
    }

    /// Validates a single value against this spec.
    ///
    /// `None` or empty values only fail when the field is required; typed
    /// checks (email shape, numeric parse) apply to any non-empty value.
    pub fn validate(&self, value: Option<&JsonValue>) -> Result<(), ValidationError> {
        let text = match value {
            Some(JsonValue::String(s)) => s.trim().to_string(),
            Some(JsonValue::Number(n)) => n.to_string(),
            Some(JsonValue::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        if text.is_empty() {
            if self.required {
                return Err(ValidationError::empty_field(self.name));
            }
            return Ok(());
        }

        match self.field_type {
            FieldType::Email => validate_email(self.name, &text),
            FieldType::Number => {
                if text.parse::<f64>().is_err() {
                    Err(ValidationError::not_a_number(self.name))
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }
}

/// Checks the rough RFC shape of an email address: one `@`, non-empty local
/// part, and a dotted domain.
fn validate_email(field: &str, value: &str) -> Result<(), ValidationError> {
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains(' ');

    if local.is_empty() || !domain_ok {
        return Err(ValidationError::invalid_format(
            field.to_string(),
            "not a valid email address",
        ));
    }
    Ok(())
}

/// Schema for one confirmable entity kind.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    kind: EntityKind,
    fields: Vec<FieldSpec>,
}

impl EntitySchema {
    fn new(kind: EntityKind, fields: Vec<FieldSpec>) -> Self {
        Self { kind, fields }
    }

    /// Returns the entity kind this schema describes.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the ordered field specifications.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field spec by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true if this entity carries line items.
    pub fn supports_items(&self) -> bool {
        self.kind.supports_items()
    }

    /// Validates a full set of field values.
    ///
    /// Returns a per-field error map; an empty map means the values pass.
    pub fn validate(&self, values: &BTreeMap<String, JsonValue>) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();
        for spec in &self.fields {
            if let Err(e) = spec.validate(values.get(spec.name)) {
                errors.insert(spec.name.to_string(), e.to_string());
            }
        }
        errors
    }
}

/// Registry of all confirmable entity schemas, indexed by kind.
#[derive(Debug)]
pub struct EntitySchemaRegistry {
    schemas: BTreeMap<EntityKind, EntitySchema>,
}

static REGISTRY: Lazy<EntitySchemaRegistry> = Lazy::new(EntitySchemaRegistry::build);

impl EntitySchemaRegistry {
    /// Returns the process-wide registry.
    pub fn global() -> &'static EntitySchemaRegistry {
        &REGISTRY
    }

    /// Returns the schema for a kind.
    ///
    /// Every `EntityKind` has a schema; the lookup cannot fail.
    pub fn schema(&self, kind: EntityKind) -> &EntitySchema {
        &self.schemas[&kind]
    }

    /// Returns all schemas in registry order.
    pub fn all(&self) -> impl Iterator<Item = &EntitySchema> {
        self.schemas.values()
    }

    fn build() -> Self {
        use FieldType::*;

        let mut schemas = BTreeMap::new();

        schemas.insert(
            EntityKind::Invoice,
            EntitySchema::new(
                EntityKind::Invoice,
                vec![
                    FieldSpec::new("client_name", "Client", true, Text),
                    FieldSpec::new("client_email", "Email du client", false, Email),
                    FieldSpec::new("invoice_date", "Date de facturation", false, Date),
                    FieldSpec::new("due_date", "Date d'échéance", false, Date),
                    FieldSpec::new("total_amount", "Montant total", true, Number),
                    FieldSpec::new("notes", "Notes", false, Multiline),
                ],
            ),
        );

        schemas.insert(
            EntityKind::Client,
            EntitySchema::new(
                EntityKind::Client,
                vec![
                    FieldSpec::new("name", "Nom", true, Text),
                    FieldSpec::new("email", "Email", false, Email),
                    FieldSpec::new("phone", "Téléphone", false, Tel),
                    FieldSpec::new("address", "Adresse", false, Multiline),
                ],
            ),
        );

        schemas.insert(
            EntityKind::Supplier,
            EntitySchema::new(
                EntityKind::Supplier,
                vec![
                    FieldSpec::new("name", "Nom", true, Text),
                    FieldSpec::new("email", "Email", false, Email),
                    FieldSpec::new("phone", "Téléphone", false, Tel),
                    FieldSpec::new("address", "Adresse", false, Multiline),
                ],
            ),
        );

        schemas.insert(
            EntityKind::PurchaseOrder,
            EntitySchema::new(
                EntityKind::PurchaseOrder,
                vec![
                    FieldSpec::new("supplier_name", "Fournisseur", true, Text),
                    FieldSpec::new("order_date", "Date de commande", false, Date),
                    FieldSpec::new("expected_date", "Date de livraison prévue", false, Date),
                    FieldSpec::new("total_amount", "Montant total", true, Number),
                    FieldSpec::new("notes", "Notes", false, Multiline),
                ],
            ),
        );

        schemas.insert(
            EntityKind::Product,
            EntitySchema::new(
                EntityKind::Product,
                vec![
                    FieldSpec::new("name", "Nom", true, Text),
                    FieldSpec::new("description", "Description", false, Multiline),
                    FieldSpec::new("unit_price", "Prix unitaire", true, Number),
                    FieldSpec::new("stock_quantity", "Quantité en stock", false, Number),
                ],
            ),
        );

        Self { schemas }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_kind_has_a_schema() {
        let registry = EntitySchemaRegistry::global();
        for kind in EntityKind::ALL {
            assert_eq!(registry.schema(kind).kind(), kind);
        }
    }

    #[test]
    fn only_invoice_and_purchase_order_support_items() {
        assert!(EntityKind::Invoice.supports_items());
        assert!(EntityKind::PurchaseOrder.supports_items());
        assert!(!EntityKind::Client.supports_items());
        assert!(!EntityKind::Supplier.supports_items());
        assert!(!EntityKind::Product.supports_items());
    }

    #[test]
    fn entity_kind_roundtrips_through_wire_tag() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_entity_kind_is_rejected() {
        assert!("spaceship".parse::<EntityKind>().is_err());
    }

    #[test]
    fn required_field_rejects_empty_value() {
        let schema = EntitySchemaRegistry::global().schema(EntityKind::Client);
        let mut values = BTreeMap::new();
        values.insert("name".to_string(), json!(""));

        let errors = schema.validate(&values);
        assert!(errors.contains_key("name"));
    }

    #[test]
    fn optional_field_accepts_missing_value() {
        let schema = EntitySchemaRegistry::global().schema(EntityKind::Client);
        let mut values = BTreeMap::new();
        values.insert("name".to_string(), json!("Acme"));

        let errors = schema.validate(&values);
        assert!(errors.is_empty());
    }

    #[test]
    fn email_field_rejects_malformed_address() {
        let schema = EntitySchemaRegistry::global().schema(EntityKind::Client);
        let mut values = BTreeMap::new();
        values.insert("name".to_string(), json!("Acme"));
        values.insert("email".to_string(), json!("not-an-email"));

        let errors = schema.validate(&values);
        assert!(errors.contains_key("email"));
    }

    #[test]
    fn email_field_accepts_valid_address() {
        let schema = EntitySchemaRegistry::global().schema(EntityKind::Client);
        let mut values = BTreeMap::new();
        values.insert("name".to_string(), json!("Acme"));
        values.insert("email".to_string(), json!("contact@acme.fr"));

        let errors = schema.validate(&values);
        assert!(errors.is_empty());
    }

    #[test]
    fn number_field_rejects_unparseable_value() {
        let schema = EntitySchemaRegistry::global().schema(EntityKind::Invoice);
        let mut values = BTreeMap::new();
        values.insert("client_name".to_string(), json!("Jean Dupont"));
        values.insert("total_amount".to_string(), json!("cinq cents"));

        let errors = schema.validate(&values);
        assert!(errors.contains_key("total_amount"));
    }

    #[test]
    fn number_field_accepts_json_number() {
        let schema = EntitySchemaRegistry::global().schema(EntityKind::Invoice);
        let mut values = BTreeMap::new();
        values.insert("client_name".to_string(), json!("Jean Dupont"));
        values.insert("total_amount".to_string(), json!(500));

        let errors = schema.validate(&values);
        assert!(errors.is_empty());
    }

    #[test]
    fn field_lookup_by_name_works() {
        let schema = EntitySchemaRegistry::global().schema(EntityKind::Product);
        let spec = schema.field("unit_price").unwrap();
        assert_eq!(spec.field_type, FieldType::Number);
        assert!(spec.required);
        assert!(schema.field("does_not_exist").is_none());
    }
}
