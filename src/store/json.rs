//! JSON-file-backed entity store
//!
//! Lets the CLI process requests against an entity snapshot exported from
//! the host system. The document shape is:
//!
//! ```json
//! {
//!   "schema": {
//!     "user": {
//!       "user": [
//!         { "name": "uid", "label": "User ID", "kind": "scalar", "is_id": true },
//!         { "name": "mail", "label": "Email", "kind": "scalar" },
//!         { "name": "field_avatar", "label": "Avatar", "kind": "file_reference" }
//!       ]
//!     }
//!   },
//!   "entities": [
//!     {
//!       "entity_type": "user", "bundle": "user", "id": "123",
//!       "label": "bob",
//!       "fields": { "mail": "bob@example.com" }
//!     }
//!   ]
//! }
//! ```

use crate::domain::{AmnesiaError, Entity, EntityRef, FieldDefinition, Result};
use crate::store::{EntityStore, InMemoryStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Serialized store document
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    /// entity type → bundle → field definitions
    #[serde(default)]
    schema: BTreeMap<String, BTreeMap<String, Vec<FieldDefinition>>>,
    #[serde(default)]
    entities: Vec<Entity>,
}

/// Entity store loaded from and persisted to a JSON file.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    inner: InMemoryStore,
}

impl JsonStore {
    /// Load a store from a JSON snapshot file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            AmnesiaError::Storage(format!("Failed to read {}: {e}", path.display()))
        })?;
        let document: StoreDocument = serde_json::from_str(&contents).map_err(|e| {
            AmnesiaError::Serialization(format!("Failed to parse {}: {e}", path.display()))
        })?;

        let mut inner = InMemoryStore::new();
        for (entity_type, bundles) in document.schema {
            for (bundle, definitions) in bundles {
                inner.define_fields(entity_type.clone(), bundle, definitions);
            }
        }
        for entity in document.entities {
            inner.insert(entity);
        }

        tracing::debug!(
            path = %path.display(),
            entities = inner.len(),
            "Loaded entity snapshot"
        );

        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    /// Write the current store contents back to the snapshot file.
    ///
    /// Used after erasure requests so removals and anonymized values
    /// survive the process.
    pub fn persist(&self) -> Result<()> {
        let mut document = StoreDocument::default();
        for ((entity_type, bundle), definitions) in self.inner.schema() {
            document
                .schema
                .entry(entity_type.clone())
                .or_default()
                .insert(bundle.clone(), definitions.clone());
        }
        document.entities = self.inner.entities().cloned().collect();

        let contents = serde_json::to_string_pretty(&document)
            .map_err(|e| AmnesiaError::Serialization(e.to_string()))?;
        fs::write(&self.path, contents).map_err(|e| {
            AmnesiaError::Storage(format!("Failed to write {}: {e}", self.path.display()))
        })?;
        Ok(())
    }

    /// Path of the backing snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EntityStore for JsonStore {
    fn field_definitions(&self, entity_type: &str, bundle: &str) -> Vec<FieldDefinition> {
        self.inner.field_definitions(entity_type, bundle)
    }

    fn bundles(&self) -> Vec<(String, String)> {
        self.inner.bundles()
    }

    fn load(&self, reference: &EntityRef) -> Option<Entity> {
        self.inner.load(reference)
    }

    fn save(&mut self, entity: Entity) -> Result<()> {
        self.inner.save(entity)
    }

    fn delete(&mut self, reference: &EntityRef) -> Result<()> {
        self.inner.delete(reference)
    }
}
