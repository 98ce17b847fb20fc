//! Pinned visualization artifacts.
//!
//! Artifacts are charts the operator explicitly pinned out of a
//! conversation. The store dedups by content identity and soft-deletes via
//! archiving; records are never physically removed.

mod store;

pub use store::{Artifact, ArtifactStore};
