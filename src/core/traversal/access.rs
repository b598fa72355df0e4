//! Right to Access traversal visitor
//!
//! Collects one export row per configured field of every visited entity,
//! plus an asset list for referenced files so binary attachments can be
//! bundled alongside the CSV export.

use super::{EntityVisitor, VisitContext};
use crate::domain::{Entity, FieldDefinition, FieldKind, FieldValue, Result, RtaPolicy};
use std::collections::HashMap;

/// Filename group for entities not reached through a grouping
/// relationship, the traversal root included.
pub const DEFAULT_EXPORT_FILE: &str = "main";

/// One exported field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalRow {
    /// Composite `entity_type|bundle|field` id of the originating policy
    pub plugin_name: String,
    /// Entity type of the source entity
    pub entity_type: String,
    /// Id of the source entity
    pub entity_id: String,
    /// Filename group this row is exported into
    pub target_file: String,
    /// Correlates rows belonging to the same entity instance
    pub row_id: u64,
    /// Field label
    pub label: String,
    /// Rendered value, with referenced-entity labels or asset placeholders
    /// substituted
    pub value: String,
    /// Administrator notes from the field policy
    pub notes: String,
    /// The field's Right to Access policy
    pub rta: RtaPolicy,
}

/// A referenced file to bundle with the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Id of the referenced file entity
    pub target_id: String,
    /// Display flag carried through from the reference
    pub display: bool,
    /// Backing uri of the file entity, when known
    pub uri: Option<String>,
    /// File extension used for the bundled asset name
    pub extension: String,
}

impl AssetReference {
    /// Name of the asset inside the export archive, `<id>.<ext>`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.target_id, self.extension)
    }
}

/// Visitor accumulating Right to Access export rows and assets.
///
/// Rows are keyed by `plugin_name|entity_id`; a later write for the same
/// key replaces the earlier row in place, keeping first-insertion order.
/// A field rendered twice in one run therefore keeps only the last
/// rendering.
#[derive(Debug, Default)]
pub struct AccessVisitor {
    rows: Vec<TraversalRow>,
    index: HashMap<String, usize>,
    assets: Vec<AssetReference>,
}

impl AccessVisitor {
    /// Create an empty visitor
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the visitor, yielding rows in visitation order plus the
    /// collected assets
    pub fn into_results(self) -> (Vec<TraversalRow>, Vec<AssetReference>) {
        (self.rows, self.assets)
    }

    fn upsert(&mut self, row: TraversalRow) {
        let key = format!("{}|{}", row.plugin_name, row.entity_id);
        match self.index.get(&key) {
            Some(&position) => self.rows[position] = row,
            None => {
                self.index.insert(key, self.rows.len());
                self.rows.push(row);
            }
        }
    }

    /// Render a field value, substituting referenced-entity labels and
    /// asset placeholders.
    fn render_value(&mut self, context: &VisitContext<'_>, definition: &FieldDefinition) -> String {
        let Some(value) = context.entity.field(&definition.name) else {
            return String::new();
        };

        match (&definition.kind, value) {
            (_, FieldValue::Scalar(scalar)) => scalar.clone(),
            (FieldKind::FileReference, FieldValue::References(references)) => {
                let mut labels = Vec::with_capacity(references.len());
                for reference in references {
                    let Some(file) = context.store.load(reference) else {
                        continue;
                    };
                    labels.push(format!("assets/{}.{}", file.id, file.file_extension()));
                    self.assets.push(AssetReference {
                        target_id: file.id.clone(),
                        display: true,
                        uri: file.uri.clone(),
                        extension: file.file_extension(),
                    });
                }
                labels.join(", ")
            }
            (_, FieldValue::References(references)) => references
                .iter()
                .map(|reference| match context.store.load(reference) {
                    Some(Entity {
                        label: Some(label), ..
                    }) if !label.is_empty() => {
                        format!("{label} [{}]", reference.id)
                    }
                    // Deleted or label-less targets fall back to the bare id.
                    _ => reference.id.clone(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl EntityVisitor for AccessVisitor {
    fn visit(&mut self, context: &VisitContext<'_>) -> Result<()> {
        let entity = context.entity;

        for definition in context.definitions {
            let Some(policy) = context.policies.field(&entity.bundle, &definition.name) else {
                continue;
            };
            if !policy.enabled || !policy.rta.included() {
                continue;
            }

            // A row's filename group comes from the relationship field the
            // entity was reached through. A field's own export_filename
            // groups the rows of the entities it references, never its own
            // row.
            let target_file = context
                .parent
                .and_then(|parent| parent.export_filename.clone())
                .unwrap_or_else(|| DEFAULT_EXPORT_FILE.to_string());

            let value = self.render_value(context, definition);

            self.upsert(TraversalRow {
                plugin_name: policy.plugin_name(),
                entity_type: entity.entity_type.clone(),
                entity_id: entity.id.clone(),
                target_file,
                row_id: context.row_id,
                label: definition.label.clone(),
                value,
                notes: policy.notes.clone(),
                rta: policy.rta,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traversal::Traverser;
    use crate::domain::policy::PolicyRegistry;
    use crate::domain::{EntityRef, FieldPolicy, RelationshipPolicy, RtfPolicy};
    use crate::store::InMemoryStore;
    use std::collections::BTreeMap;

    fn policy(field: &str, rta: RtaPolicy) -> FieldPolicy {
        FieldPolicy {
            entity_type: "user".to_string(),
            bundle: "user".to_string(),
            field: field.to_string(),
            enabled: true,
            rta,
            rtf: RtfPolicy::No,
            anonymizer: None,
            notes: String::new(),
            relationship: RelationshipPolicy::Disabled,
            export_filename: None,
        }
    }

    fn user_store() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store.define_fields(
            "user",
            "user",
            vec![
                FieldDefinition::scalar("mail", "Email"),
                FieldDefinition::reference("field_avatar", "Avatar", "file"),
            ],
        );
        store.insert(crate::domain::Entity {
            entity_type: "user".to_string(),
            bundle: "user".to_string(),
            id: "123".to_string(),
            label: Some("bob".to_string()),
            uri: None,
            fields: BTreeMap::from([
                (
                    "mail".to_string(),
                    FieldValue::Scalar("a@b.com".to_string()),
                ),
                (
                    "field_avatar".to_string(),
                    FieldValue::References(vec![EntityRef::new("file", "42")]),
                ),
            ]),
        });
        store.insert(crate::domain::Entity {
            entity_type: "file".to_string(),
            bundle: "file".to_string(),
            id: "42".to_string(),
            label: None,
            uri: Some("private://photos/avatar.jpg".to_string()),
            fields: BTreeMap::new(),
        });
        store
    }

    fn run(store: &InMemoryStore, registry: &PolicyRegistry) -> (Vec<TraversalRow>, Vec<AssetReference>) {
        let mut visitor = AccessVisitor::new();
        let mut traverser = Traverser::new(store, registry);
        traverser
            .traverse(&EntityRef::new("user", "123"), &mut visitor)
            .unwrap();
        visitor.into_results()
    }

    #[test]
    fn test_scalar_field_row() {
        let store = user_store();
        let registry =
            PolicyRegistry::from_policies(vec![policy("mail", RtaPolicy::Inc)]).unwrap();

        let (rows, assets) = run(&store, &registry);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Email");
        assert_eq!(rows[0].value, "a@b.com");
        assert_eq!(rows[0].target_file, "main");
        assert_eq!(rows[0].plugin_name, "user|user|mail");
        assert!(assets.is_empty());
    }

    #[test]
    fn test_file_reference_becomes_asset() {
        let store = user_store();
        let registry =
            PolicyRegistry::from_policies(vec![policy("field_avatar", RtaPolicy::Inc)]).unwrap();

        let (rows, assets) = run(&store, &registry);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, "assets/42.jpg");
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].target_id, "42");
        assert!(assets[0].display);
        assert_eq!(assets[0].file_name(), "42.jpg");
    }

    #[test]
    fn test_unconfigured_fields_produce_nothing() {
        let store = user_store();
        let registry = PolicyRegistry::from_policies(vec![]).unwrap();
        // No policies at all: the entity type itself is unconfigured.
        let (rows, assets) = run(&store, &registry);
        assert!(rows.is_empty());
        assert!(assets.is_empty());
    }

    #[test]
    fn test_rta_no_is_skipped() {
        let store = user_store();
        let registry = PolicyRegistry::from_policies(vec![
            policy("mail", RtaPolicy::No),
            policy("field_avatar", RtaPolicy::Maybe),
        ])
        .unwrap();

        let (rows, _) = run(&store, &registry);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].plugin_name, "user|user|field_avatar");
    }

    #[test]
    fn test_entity_reference_label_rendering() {
        let mut store = InMemoryStore::new();
        store.define_fields(
            "user",
            "user",
            vec![FieldDefinition::reference("field_org", "Organization", "org")],
        );
        store.insert(crate::domain::Entity {
            entity_type: "user".to_string(),
            bundle: "user".to_string(),
            id: "1".to_string(),
            label: None,
            uri: None,
            fields: BTreeMap::from([(
                "field_org".to_string(),
                FieldValue::References(vec![
                    EntityRef::new("org", "7"),
                    EntityRef::new("org", "8"),
                    EntityRef::new("org", "404"),
                ]),
            )]),
        });
        store.insert(crate::domain::Entity {
            entity_type: "org".to_string(),
            bundle: "org".to_string(),
            id: "7".to_string(),
            label: Some("Acme".to_string()),
            uri: None,
            fields: BTreeMap::new(),
        });
        store.insert(crate::domain::Entity {
            entity_type: "org".to_string(),
            bundle: "org".to_string(),
            id: "8".to_string(),
            label: Some(String::new()),
            uri: None,
            fields: BTreeMap::new(),
        });

        let registry =
            PolicyRegistry::from_policies(vec![policy("field_org", RtaPolicy::Inc)]).unwrap();

        let mut visitor = AccessVisitor::new();
        let mut traverser = Traverser::new(&store, &registry);
        traverser
            .traverse(&EntityRef::new("user", "1"), &mut visitor)
            .unwrap();
        let (rows, _) = visitor.into_results();

        // Labelled targets render as "label [id]"; empty labels and deleted
        // targets fall back to the bare id.
        assert_eq!(rows[0].value, "Acme [7], 8, 404");
    }

    #[test]
    fn test_export_filename_groups_referenced_rows_only() {
        let mut store = InMemoryStore::new();
        store.define_fields(
            "user",
            "user",
            vec![
                FieldDefinition::scalar("mail", "Email"),
                FieldDefinition::reference("field_orders", "Orders", "order"),
            ],
        );
        store.define_fields("order", "order", vec![FieldDefinition::scalar("total", "Total")]);
        store.insert(crate::domain::Entity {
            entity_type: "user".to_string(),
            bundle: "user".to_string(),
            id: "1".to_string(),
            label: Some("bob".to_string()),
            uri: None,
            fields: BTreeMap::from([
                ("mail".to_string(), FieldValue::Scalar("a@b.com".to_string())),
                (
                    "field_orders".to_string(),
                    FieldValue::References(vec![EntityRef::new("order", "7")]),
                ),
            ]),
        });
        store.insert(crate::domain::Entity {
            entity_type: "order".to_string(),
            bundle: "order".to_string(),
            id: "7".to_string(),
            label: Some("Order 7".to_string()),
            uri: None,
            fields: BTreeMap::from([(
                "total".to_string(),
                FieldValue::Scalar("19.99".to_string()),
            )]),
        });

        let mut orders = policy("field_orders", RtaPolicy::Inc);
        orders.relationship = RelationshipPolicy::Follow;
        orders.export_filename = Some("orders".to_string());
        let mut total = policy("total", RtaPolicy::Inc);
        total.entity_type = "order".to_string();
        total.bundle = "order".to_string();

        let registry = PolicyRegistry::from_policies(vec![
            policy("mail", RtaPolicy::Inc),
            orders,
            total,
        ])
        .unwrap();

        let mut visitor = AccessVisitor::new();
        let mut traverser = Traverser::new(&store, &registry);
        traverser
            .traverse(&EntityRef::new("user", "1"), &mut visitor)
            .unwrap();
        let (rows, _) = visitor.into_results();

        // The relationship field's own row stays in the root group; its
        // filename applies to the rows of the entities it references.
        let group = |field: &str| {
            rows.iter()
                .find(|row| row.plugin_name.ends_with(&format!("|{field}")))
                .map(|row| row.target_file.clone())
        };
        assert_eq!(group("mail").as_deref(), Some("main"));
        assert_eq!(group("field_orders").as_deref(), Some("main"));
        assert_eq!(group("total").as_deref(), Some("orders"));
    }

    #[test]
    fn test_traversal_is_idempotent() {
        let store = user_store();
        let registry = PolicyRegistry::from_policies(vec![
            policy("mail", RtaPolicy::Inc),
            policy("field_avatar", RtaPolicy::Inc),
        ])
        .unwrap();

        let (first_rows, first_assets) = run(&store, &registry);
        let (second_rows, second_assets) = run(&store, &registry);
        assert_eq!(first_rows, second_rows);
        assert_eq!(first_assets, second_assets);
    }

    #[test]
    fn test_last_write_wins_keying() {
        let mut visitor = AccessVisitor::new();
        let row = |value: &str| TraversalRow {
            plugin_name: "user|user|mail".to_string(),
            entity_type: "user".to_string(),
            entity_id: "1".to_string(),
            target_file: "main".to_string(),
            row_id: 1,
            label: "Email".to_string(),
            value: value.to_string(),
            notes: String::new(),
            rta: RtaPolicy::Inc,
        };
        visitor.upsert(row("first"));
        visitor.upsert(row("second"));
        let (rows, _) = visitor.into_results();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, "second");
    }
}
