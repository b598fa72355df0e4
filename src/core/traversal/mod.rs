//! Entity traversal engine
//!
//! Walks an entity graph depth-first from a traversal root, following
//! configured relationships and handing every entity to a mode-specific
//! [`EntityVisitor`]: [`access::AccessVisitor`] collects export rows for
//! Right to Access requests, [`removal::RemovalVisitor`] collects erasure
//! actions for Right to be Forgotten requests.
//!
//! The engine owns the concerns both modes share: the visited set that
//! guards against cycles and diamond-shaped graphs, policy resolution per
//! entity type, row-id allocation, and recursion through `follow`/`owner`
//! relationship fields. Everything that fails to resolve along the way
//! (missing entities, unconfigured types, absent field values) is a soft
//! skip, never an error.

pub mod access;
pub mod removal;

use crate::domain::{Entity, EntityPolicySet, EntityRef, FieldDefinition, FieldPolicy, Result};
use crate::domain::policy::PolicyRegistry;
use crate::store::EntityStore;
use std::collections::HashSet;

pub use access::{AccessVisitor, AssetReference, TraversalRow};
pub use removal::{apply_actions, AuditEntry, RemovalAction, RemovalVisitor};

/// Everything a visitor sees for one entity.
pub struct VisitContext<'a> {
    /// The entity being processed
    pub entity: &'a Entity,
    /// Field definitions for the entity's `(type, bundle)` pair
    pub definitions: &'a [FieldDefinition],
    /// Policy set for the entity's type
    pub policies: &'a EntityPolicySet,
    /// Correlates rows belonging to the same entity instance
    pub row_id: u64,
    /// The relationship field through which this entity was reached, if any
    pub parent: Option<&'a FieldPolicy>,
    /// The entity store, for resolving referenced entities
    pub store: &'a dyn EntityStore,
}

/// Per-entity callback driven by the traversal engine.
pub trait EntityVisitor {
    /// Process one entity. Called at most once per `(type, id)` pair and
    /// run.
    fn visit(&mut self, context: &VisitContext<'_>) -> Result<()>;
}

/// Depth-first entity graph walker.
pub struct Traverser<'a> {
    store: &'a dyn EntityStore,
    policies: &'a PolicyRegistry,
    visited: HashSet<EntityRef>,
    next_row_id: u64,
}

impl<'a> Traverser<'a> {
    /// Create a traverser over a store and a policy registry
    pub fn new(store: &'a dyn EntityStore, policies: &'a PolicyRegistry) -> Self {
        Self {
            store,
            policies,
            visited: HashSet::new(),
            next_row_id: 1,
        }
    }

    /// Walk the graph from `root`, feeding every reachable, configured
    /// entity to `visitor`.
    pub fn traverse(&mut self, root: &EntityRef, visitor: &mut dyn EntityVisitor) -> Result<()> {
        self.walk(root, None, visitor)
    }

    fn walk(
        &mut self,
        reference: &EntityRef,
        parent: Option<&'a FieldPolicy>,
        visitor: &mut dyn EntityVisitor,
    ) -> Result<()> {
        // Cycle/diamond guard: each (type, id) pair is processed once.
        if !self.visited.insert(reference.clone()) {
            return Ok(());
        }

        let store = self.store;
        let Some(entity) = store.load(reference) else {
            tracing::trace!(entity = %reference, "Referenced entity not loadable, skipping");
            return Ok(());
        };

        let Some(policies) = self.policies.for_entity_type(&entity.entity_type) else {
            tracing::trace!(
                entity_type = %entity.entity_type,
                "No policies configured for entity type, skipping"
            );
            return Ok(());
        };

        let definitions = store.field_definitions(&entity.entity_type, &entity.bundle);

        let row_id = self.next_row_id;
        self.next_row_id += 1;

        visitor.visit(&VisitContext {
            entity: &entity,
            definitions: &definitions,
            policies,
            row_id,
            parent,
            store,
        })?;

        for definition in &definitions {
            if !definition.kind.is_reference() {
                continue;
            }
            let Some(policy) = policies.field(&entity.bundle, &definition.name) else {
                continue;
            };
            if !policy.enabled || !policy.relationship.followed() {
                continue;
            }
            let Some(value) = entity.field(&definition.name) else {
                continue;
            };
            for target in value.references() {
                self.walk(target, Some(policy), visitor)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldValue, RelationshipPolicy, RtaPolicy, RtfPolicy};
    use crate::store::InMemoryStore;
    use std::collections::BTreeMap;

    struct CountingVisitor {
        seen: Vec<EntityRef>,
    }

    impl EntityVisitor for CountingVisitor {
        fn visit(&mut self, context: &VisitContext<'_>) -> Result<()> {
            self.seen.push(context.entity.entity_ref());
            Ok(())
        }
    }

    fn follow_policy(entity_type: &str, field: &str, target_field_file: Option<&str>) -> FieldPolicy {
        FieldPolicy {
            entity_type: entity_type.to_string(),
            bundle: entity_type.to_string(),
            field: field.to_string(),
            enabled: true,
            rta: RtaPolicy::Inc,
            rtf: RtfPolicy::No,
            anonymizer: None,
            notes: String::new(),
            relationship: RelationshipPolicy::Follow,
            export_filename: target_field_file.map(String::from),
        }
    }

    fn entity_with_ref(entity_type: &str, id: &str, field: &str, target: EntityRef) -> Entity {
        Entity {
            entity_type: entity_type.to_string(),
            bundle: entity_type.to_string(),
            id: id.to_string(),
            label: Some(id.to_string()),
            uri: None,
            fields: BTreeMap::from([(
                field.to_string(),
                FieldValue::References(vec![target]),
            )]),
        }
    }

    /// A owns B, B owns A: traversal terminates and each entity is
    /// processed once.
    #[test]
    fn test_cyclic_ownership_terminates() {
        let mut store = InMemoryStore::new();
        store.define_fields(
            "a",
            "a",
            vec![FieldDefinition::reference("to_b", "To B", "b")],
        );
        store.define_fields(
            "b",
            "b",
            vec![FieldDefinition::reference("to_a", "To A", "a")],
        );
        store.insert(entity_with_ref("a", "1", "to_b", EntityRef::new("b", "1")));
        store.insert(entity_with_ref("b", "1", "to_a", EntityRef::new("a", "1")));

        let registry = PolicyRegistry::from_policies(vec![
            follow_policy("a", "to_b", None),
            follow_policy("b", "to_a", None),
        ])
        .unwrap();

        let mut visitor = CountingVisitor { seen: Vec::new() };
        let mut traverser = Traverser::new(&store, &registry);
        traverser
            .traverse(&EntityRef::new("a", "1"), &mut visitor)
            .unwrap();

        assert_eq!(visitor.seen.len(), 2);
        assert_eq!(visitor.seen[0], EntityRef::new("a", "1"));
        assert_eq!(visitor.seen[1], EntityRef::new("b", "1"));
    }

    #[test]
    fn test_unconfigured_entity_type_is_skipped() {
        let mut store = InMemoryStore::new();
        store.define_fields("a", "a", vec![FieldDefinition::scalar("x", "X")]);
        store.insert(Entity {
            entity_type: "a".to_string(),
            bundle: "a".to_string(),
            id: "1".to_string(),
            label: None,
            uri: None,
            fields: BTreeMap::new(),
        });

        let registry = PolicyRegistry::default();
        let mut visitor = CountingVisitor { seen: Vec::new() };
        let mut traverser = Traverser::new(&store, &registry);
        traverser
            .traverse(&EntityRef::new("a", "1"), &mut visitor)
            .unwrap();

        assert!(visitor.seen.is_empty());
    }

    #[test]
    fn test_missing_root_is_soft_skip() {
        let store = InMemoryStore::new();
        let registry = PolicyRegistry::default();
        let mut visitor = CountingVisitor { seen: Vec::new() };
        let mut traverser = Traverser::new(&store, &registry);
        assert!(traverser
            .traverse(&EntityRef::new("a", "404"), &mut visitor)
            .is_ok());
        assert!(visitor.seen.is_empty());
    }

    #[test]
    fn test_disabled_relationship_not_followed() {
        let mut store = InMemoryStore::new();
        store.define_fields(
            "a",
            "a",
            vec![FieldDefinition::reference("to_b", "To B", "b")],
        );
        store.define_fields("b", "b", vec![FieldDefinition::scalar("x", "X")]);
        store.insert(entity_with_ref("a", "1", "to_b", EntityRef::new("b", "1")));

        let mut policy = follow_policy("a", "to_b", None);
        policy.relationship = RelationshipPolicy::Disabled;
        let registry = PolicyRegistry::from_policies(vec![
            policy,
            follow_policy("b", "x", None),
        ])
        .unwrap();

        let mut visitor = CountingVisitor { seen: Vec::new() };
        let mut traverser = Traverser::new(&store, &registry);
        traverser
            .traverse(&EntityRef::new("a", "1"), &mut visitor)
            .unwrap();

        assert_eq!(visitor.seen.len(), 1);
    }

    #[test]
    fn test_row_ids_are_per_entity() {
        struct RowIdVisitor {
            ids: Vec<u64>,
        }
        impl EntityVisitor for RowIdVisitor {
            fn visit(&mut self, context: &VisitContext<'_>) -> Result<()> {
                self.ids.push(context.row_id);
                Ok(())
            }
        }

        let mut store = InMemoryStore::new();
        store.define_fields(
            "a",
            "a",
            vec![FieldDefinition::reference("to_b", "To B", "b")],
        );
        store.define_fields("b", "b", vec![FieldDefinition::scalar("x", "X")]);
        store.insert(entity_with_ref("a", "1", "to_b", EntityRef::new("b", "1")));
        store.insert(Entity {
            entity_type: "b".to_string(),
            bundle: "b".to_string(),
            id: "1".to_string(),
            label: None,
            uri: None,
            fields: BTreeMap::from([("x".to_string(), FieldValue::Scalar("v".to_string()))]),
        });

        let registry = PolicyRegistry::from_policies(vec![
            follow_policy("a", "to_b", None),
            follow_policy("b", "x", None),
        ])
        .unwrap();

        let mut visitor = RowIdVisitor { ids: Vec::new() };
        let mut traverser = Traverser::new(&store, &registry);
        traverser
            .traverse(&EntityRef::new("a", "1"), &mut visitor)
            .unwrap();

        assert_eq!(visitor.ids, vec![1, 2]);
    }
}
