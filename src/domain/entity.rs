//! Entity model consumed from the host entity store
//!
//! Amnesia never owns entity storage; it consumes a small, read-mostly view
//! of it through [`crate::store::EntityStore`]. The types here are the
//! currency of that contract: a reference, a loaded entity snapshot, its
//! field values, and the field definitions for a `(entity type, bundle)`
//! pair.
//!
//! Field shape is resolved once per field definition into the closed
//! [`FieldKind`] enum rather than re-inspected per value.

use crate::domain::errors::AmnesiaError;
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// A `(entity type, entity id)` pair identifying one entity instance.
///
/// Also used as the visit key that guards traversal against cycles and
/// diamond-shaped reference graphs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity type id, e.g. `user` or `file`
    pub entity_type: String,
    /// Entity id, stringified
    pub id: String,
}

impl EntityRef {
    /// Create a new entity reference
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Parse a `type:id` pair, as used on the command line and in the JSON
    /// store format
    pub fn parse(value: &str) -> Result<Self> {
        match value.split_once(':') {
            Some((entity_type, id)) if !entity_type.is_empty() && !id.is_empty() => {
                Ok(Self::new(entity_type, id))
            }
            _ => Err(AmnesiaError::Validation(format!(
                "Invalid entity reference '{value}', expected '<entity_type>:<id>'"
            ))),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.id)
    }
}

/// The shape of a field, resolved once from its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FieldKind {
    /// Plain value with a string representation
    Scalar,
    /// Reference to other entities of `target_type`
    EntityReference {
        /// Entity type id of the reference target
        target_type: String,
    },
    /// Reference to file entities; values surface as bundled assets
    FileReference,
}

impl FieldKind {
    /// Whether values of this kind reference other entities
    pub fn is_reference(&self) -> bool {
        !matches!(self, FieldKind::Scalar)
    }
}

/// Definition of a single field on a `(entity type, bundle)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Machine name, e.g. `mail`
    pub name: String,
    /// Human label, e.g. `Email`
    pub label: String,
    /// Resolved field shape
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Whether this field is the entity type's primary identifier
    #[serde(default)]
    pub is_id: bool,
}

impl FieldDefinition {
    /// Create a scalar field definition
    pub fn scalar(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: FieldKind::Scalar,
            is_id: false,
        }
    }

    /// Create an entity reference field definition
    pub fn reference(
        name: impl Into<String>,
        label: impl Into<String>,
        target_type: impl Into<String>,
    ) -> Self {
        let target_type = target_type.into();
        let kind = if target_type == "file" {
            FieldKind::FileReference
        } else {
            FieldKind::EntityReference { target_type }
        };
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            is_id: false,
        }
    }

    /// Mark this field as the entity type's primary identifier
    pub fn id_field(mut self) -> Self {
        self.is_id = true;
        self
    }
}

/// A field value on a loaded entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Stringified scalar value
    Scalar(String),
    /// Referenced entities, in field delta order
    References(Vec<EntityRef>),
}

impl FieldValue {
    /// The references held by this value, empty for scalars
    pub fn references(&self) -> &[EntityRef] {
        match self {
            FieldValue::Scalar(_) => &[],
            FieldValue::References(refs) => refs,
        }
    }
}

/// A loaded entity snapshot.
///
/// Label and uri are optional: most entities carry a label, only file
/// entities carry a uri.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity type id
    pub entity_type: String,
    /// Bundle (sub-type) id; for unbundled types this equals the type id
    pub bundle: String,
    /// Entity id, stringified
    pub id: String,
    /// Human label, when the entity has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Backing uri for file entities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Field values keyed by field name
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Entity {
    /// Reference identifying this entity
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.entity_type.clone(), self.id.clone())
    }

    /// The value stored for a field, if any
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// File extension derived from the entity's uri, empty when absent.
    ///
    /// `photo.jpg` yields `jpg`, an extension-less uri yields the empty
    /// string.
    pub fn file_extension(&self) -> String {
        self.uri
            .as_deref()
            .and_then(|uri| Path::new(uri).extension())
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_entity_ref_parse() {
        let r = EntityRef::parse("user:123").unwrap();
        assert_eq!(r.entity_type, "user");
        assert_eq!(r.id, "123");
        assert_eq!(r.to_string(), "user:123");
    }

    #[test]
    fn test_entity_ref_orders_by_type_then_id() {
        let mut refs = vec![
            EntityRef::new("user", "2"),
            EntityRef::new("file", "42"),
            EntityRef::new("user", "1"),
        ];
        refs.sort();
        assert_eq!(
            refs,
            vec![
                EntityRef::new("file", "42"),
                EntityRef::new("user", "1"),
                EntityRef::new("user", "2"),
            ]
        );
    }

    #[test_case("user" ; "missing separator")]
    #[test_case(":123" ; "empty type")]
    #[test_case("user:" ; "empty id")]
    fn test_entity_ref_parse_invalid(input: &str) {
        assert!(EntityRef::parse(input).is_err());
    }

    #[test]
    fn test_reference_definition_resolves_file_kind() {
        let def = FieldDefinition::reference("field_avatar", "Avatar", "file");
        assert_eq!(def.kind, FieldKind::FileReference);

        let def = FieldDefinition::reference("field_address", "Address", "address");
        assert_eq!(
            def.kind,
            FieldKind::EntityReference {
                target_type: "address".to_string()
            }
        );
    }

    #[test]
    fn test_file_extension() {
        let mut entity = Entity {
            entity_type: "file".to_string(),
            bundle: "file".to_string(),
            id: "42".to_string(),
            label: None,
            uri: Some("private://photos/avatar.jpg".to_string()),
            fields: BTreeMap::new(),
        };
        assert_eq!(entity.file_extension(), "jpg");

        entity.uri = Some("private://photos/avatar".to_string());
        assert_eq!(entity.file_extension(), "");

        entity.uri = None;
        assert_eq!(entity.file_extension(), "");
    }

    #[test]
    fn test_field_value_references() {
        let value = FieldValue::References(vec![EntityRef::new("file", "42")]);
        assert_eq!(value.references().len(), 1);
        assert!(FieldValue::Scalar("x".to_string()).references().is_empty());
    }
}
