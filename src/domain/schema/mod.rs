//! Entity schema registry - declarative description of confirmable entities.
//!
//! One schema per creatable entity kind, listing its fields (label,
//! required-ness, input type) and whether the entity carries line items.
//! The registry is the single source of truth consumed by both the preview
//! renderer and the modify form.

mod registry;

pub use registry::{
    EntityKind, EntitySchema, EntitySchemaRegistry, FieldSpec, FieldType,
};
