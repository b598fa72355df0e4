//! Domain models and types for Amnesia.
//!
//! This module contains the core domain models and business rules:
//!
//! - **Entity model** ([`Entity`], [`EntityRef`], [`FieldDefinition`],
//!   [`FieldKind`], [`FieldValue`]): the read-mostly view of the host
//!   entity store.
//! - **Field policies** ([`FieldPolicy`], [`EntityPolicySet`],
//!   [`PolicyRegistry`]): per-field GDPR configuration.
//! - **Error types** ([`AmnesiaError`], [`DumpError`]) and the [`Result`]
//!   alias.

pub mod entity;
pub mod errors;
pub mod policy;
pub mod result;

pub use entity::{Entity, EntityRef, FieldDefinition, FieldKind, FieldValue};
pub use errors::{AmnesiaError, DumpError};
pub use policy::{
    EntityPolicySet, FieldPolicy, PolicyRegistry, RelationshipPolicy, RtaPolicy, RtfPolicy,
};
pub use result::Result;
