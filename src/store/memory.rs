//! In-memory entity store

use crate::domain::{Entity, EntityRef, FieldDefinition, Result};
use crate::store::EntityStore;
use std::collections::BTreeMap;

/// Entity store holding schema and entities in memory.
///
/// Backs the JSON store and the test suites.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    schema: BTreeMap<(String, String), Vec<FieldDefinition>>,
    entities: BTreeMap<EntityRef, Entity>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the field definitions for a `(entity type, bundle)` pair
    pub fn define_fields(
        &mut self,
        entity_type: impl Into<String>,
        bundle: impl Into<String>,
        definitions: Vec<FieldDefinition>,
    ) {
        self.schema
            .insert((entity_type.into(), bundle.into()), definitions);
    }

    /// Insert an entity, replacing any existing one with the same reference
    pub fn insert(&mut self, entity: Entity) {
        self.entities.insert(entity.entity_ref(), entity);
    }

    /// Iterate all stored entities
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the store holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn schema(&self) -> &BTreeMap<(String, String), Vec<FieldDefinition>> {
        &self.schema
    }
}

impl EntityStore for InMemoryStore {
    fn field_definitions(&self, entity_type: &str, bundle: &str) -> Vec<FieldDefinition> {
        self.schema
            .get(&(entity_type.to_string(), bundle.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn bundles(&self) -> Vec<(String, String)> {
        self.schema.keys().cloned().collect()
    }

    fn load(&self, reference: &EntityRef) -> Option<Entity> {
        self.entities.get(reference).cloned()
    }

    fn save(&mut self, entity: Entity) -> Result<()> {
        self.entities.insert(entity.entity_ref(), entity);
        Ok(())
    }

    fn delete(&mut self, reference: &EntityRef) -> Result<()> {
        self.entities.remove(reference);
        Ok(())
    }
}
