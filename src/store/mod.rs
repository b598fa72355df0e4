//! Entity store collaborators
//!
//! Amnesia consumes entity data through the [`EntityStore`] trait and never
//! reimplements storage. Two implementations are provided:
//!
//! - [`memory::InMemoryStore`], used by tests and as the backing store for
//!   the JSON store.
//! - [`json::JsonStore`], a JSON-file-backed store used by the CLI, so
//!   request processing can run against an exported entity snapshot.
//!
//! Collaborators are constructor-injected wherever they are needed; the
//! traversal engine, export pipeline, and task manager all take
//! `&dyn EntityStore` (or `&mut` for erasure) rather than reaching for
//! globals.

pub mod json;
pub mod memory;

use crate::domain::{Entity, EntityRef, FieldDefinition, Result};

pub use json::JsonStore;
pub use memory::InMemoryStore;

/// Contract required of the host entity store.
///
/// Mirrors the field-definition lookup, load, and mutation operations the
/// pipelines need. Loading a missing entity yields `None`; traversal
/// treats that as a soft skip, not an error.
pub trait EntityStore {
    /// Field definitions for a `(entity type, bundle)` pair, empty when the
    /// pair is unknown
    fn field_definitions(&self, entity_type: &str, bundle: &str) -> Vec<FieldDefinition>;

    /// All `(entity type, bundle)` pairs the store knows about
    fn bundles(&self) -> Vec<(String, String)>;

    /// Load one entity snapshot
    fn load(&self, reference: &EntityRef) -> Option<Entity>;

    /// Persist a mutated entity
    fn save(&mut self, entity: Entity) -> Result<()>;

    /// Delete an entity
    fn delete(&mut self, reference: &EntityRef) -> Result<()>;
}
