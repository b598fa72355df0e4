//! Anonymizer plugins
//!
//! Pluggable transforms mapping a raw field value to a sanitized value,
//! keyed by a stable string id and resolved through [`AnonymizerRegistry`].
//! The registry is populated once at process start with the builtin
//! plugins; field policies reference plugins by id.
//!
//! Resolution failure is a configuration error surfaced when policies are
//! validated; the traversal and erasure pipelines assume ids were already
//! checked when `rtf = anonymize` was saved.
//!
//! Idempotence is NOT guaranteed across runs unless the specific plugin is
//! deterministic; each plugin documents this via
//! [`Anonymizer::deterministic`]. Of the builtins, only `hash` is
//! deterministic.

pub mod faker;
pub mod hash;

use crate::domain::{AmnesiaError, Result};
use std::collections::BTreeMap;

/// Field context handed to plugins alongside the raw value.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    /// Entity type of the field being anonymized
    pub entity_type: &'a str,
    /// Bundle of the field being anonymized
    pub bundle: &'a str,
    /// Field machine name
    pub field: &'a str,
}

/// Trait for anonymizer plugin implementations.
pub trait Anonymizer: Send + Sync {
    /// Stable plugin id referenced from field policies
    fn id(&self) -> &'static str;

    /// Human label, shown in plugin listings
    fn label(&self) -> &'static str;

    /// Whether the same input always produces the same output
    fn deterministic(&self) -> bool {
        false
    }

    /// Return an anonymized replacement for `input`
    fn anonymize(&self, input: &str, context: &FieldContext<'_>) -> Result<String>;
}

/// Registry of anonymizer plugins, keyed by plugin id.
pub struct AnonymizerRegistry {
    plugins: BTreeMap<&'static str, Box<dyn Anonymizer>>,
}

impl AnonymizerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            plugins: BTreeMap::new(),
        }
    }

    /// Create a registry populated with the builtin plugins
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(faker::NameAnonymizer));
        registry.register(Box::new(faker::EmailAnonymizer));
        registry.register(Box::new(faker::UsernameAnonymizer));
        registry.register(Box::new(faker::TextAnonymizer));
        registry.register(Box::new(faker::NumberAnonymizer));
        registry.register(Box::new(faker::DateAnonymizer));
        registry.register(Box::new(hash::HashAnonymizer));
        registry
    }

    /// Register a plugin, replacing any existing plugin with the same id
    pub fn register(&mut self, plugin: Box<dyn Anonymizer>) {
        self.plugins.insert(plugin.id(), plugin);
    }

    /// Resolve a plugin by id
    ///
    /// # Errors
    ///
    /// Returns an error for unknown ids. Callers on the configuration path
    /// surface this to the administrator; the erasure pipeline treats it as
    /// unreachable after validation.
    pub fn resolve(&self, id: &str) -> Result<&dyn Anonymizer> {
        self.plugins
            .get(id)
            .map(|plugin| plugin.as_ref())
            .ok_or_else(|| AmnesiaError::Anonymization(format!("Unknown anonymizer '{id}'")))
    }

    /// Iterate `(id, label, deterministic)` for every registered plugin,
    /// ordered by id
    pub fn definitions(&self) -> impl Iterator<Item = (&'static str, &'static str, bool)> + '_ {
        self.plugins
            .values()
            .map(|plugin| (plugin.id(), plugin.label(), plugin.deterministic()))
    }
}

impl Default for AnonymizerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
