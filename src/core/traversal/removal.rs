//! Right to be Forgotten traversal visitor
//!
//! Collects erasure actions instead of export rows: fields are cleared or
//! anonymized, and removal of a primary identifier field removes the whole
//! entity. Actions are accumulated during traversal and applied to the
//! store in a separate step, so a dry run can report what would happen
//! without touching any data.

use super::{EntityVisitor, VisitContext};
use crate::anonymize::{AnonymizerRegistry, FieldContext};
use crate::domain::{AmnesiaError, EntityRef, FieldValue, Result, RtfPolicy};
use crate::store::EntityStore;
use std::collections::HashMap;

/// One erasure action produced by the removal traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalAction {
    /// Delete the whole entity (primary identifier field marked `remove`)
    RemoveEntity {
        /// The entity to delete
        entity: EntityRef,
    },
    /// Clear one field's value
    RemoveField {
        /// The entity holding the field
        entity: EntityRef,
        /// Field machine name
        field: String,
    },
    /// Replace one field's value through an anonymizer plugin
    AnonymizeField {
        /// The entity holding the field
        entity: EntityRef,
        /// Bundle, needed for the anonymizer field context
        bundle: String,
        /// Field machine name
        field: String,
        /// Anonymizer plugin id
        anonymizer: String,
    },
}

impl RemovalAction {
    fn key(&self) -> String {
        match self {
            RemovalAction::RemoveEntity { entity } => format!("entity|{entity}"),
            RemovalAction::RemoveField { entity, field } => format!("{field}|{entity}"),
            RemovalAction::AnonymizeField { entity, field, .. } => format!("{field}|{entity}"),
        }
    }
}

/// Visitor accumulating Right to be Forgotten actions.
///
/// Keyed like the access rows (`field|entity`), last write wins, stable
/// first-insertion order.
#[derive(Debug, Default)]
pub struct RemovalVisitor {
    actions: Vec<RemovalAction>,
    index: HashMap<String, usize>,
}

impl RemovalVisitor {
    /// Create an empty visitor
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the visitor, yielding actions in visitation order
    pub fn into_actions(self) -> Vec<RemovalAction> {
        self.actions
    }

    fn push(&mut self, action: RemovalAction) {
        let key = action.key();
        match self.index.get(&key) {
            Some(&position) => self.actions[position] = action,
            None => {
                self.index.insert(key, self.actions.len());
                self.actions.push(action);
            }
        }
    }
}

impl EntityVisitor for RemovalVisitor {
    fn visit(&mut self, context: &VisitContext<'_>) -> Result<()> {
        let entity = context.entity;

        for definition in context.definitions {
            let Some(policy) = context.policies.field(&entity.bundle, &definition.name) else {
                continue;
            };
            if !policy.enabled {
                continue;
            }

            // `inherit` takes the rtf of the relationship field through
            // which this entity was reached; at the root it means `no`.
            let effective_rtf = match policy.rtf {
                RtfPolicy::Inherit => match context.parent.map(|parent| parent.rtf) {
                    Some(RtfPolicy::Inherit) | None => RtfPolicy::No,
                    Some(parent_rtf) => parent_rtf,
                },
                rtf => rtf,
            };

            match effective_rtf {
                RtfPolicy::No | RtfPolicy::Inherit => continue,
                RtfPolicy::Remove if definition.is_id => {
                    self.push(RemovalAction::RemoveEntity {
                        entity: entity.entity_ref(),
                    });
                }
                RtfPolicy::Remove => {
                    self.push(RemovalAction::RemoveField {
                        entity: entity.entity_ref(),
                        field: definition.name.clone(),
                    });
                }
                RtfPolicy::Anonymize => {
                    let Some(anonymizer) = policy.anonymizer.clone() else {
                        // Rejected at configuration time; skip defensively
                        // rather than abort a half-done erasure run.
                        tracing::warn!(
                            field = %policy.plugin_name(),
                            "rtf = anonymize without anonymizer, skipping field"
                        );
                        continue;
                    };
                    self.push(RemovalAction::AnonymizeField {
                        entity: entity.entity_ref(),
                        bundle: entity.bundle.clone(),
                        field: definition.name.clone(),
                        anonymizer,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Audit record for one applied action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// The affected entity
    pub entity: String,
    /// The affected field, empty for whole-entity removal
    pub field: String,
    /// What was done: `removed entity`, `removed field`, `anonymized`
    pub action: String,
    /// Plugin id for anonymizations, empty otherwise
    pub detail: String,
}

/// Apply collected actions to the store, returning an audit log.
///
/// Entities deleted earlier in the run make later field actions on them
/// soft skips. Empty scalar values are left alone by anonymization;
/// there is nothing to protect and replacing them would fabricate data.
pub fn apply_actions(
    actions: &[RemovalAction],
    store: &mut dyn EntityStore,
    anonymizers: &AnonymizerRegistry,
) -> Result<Vec<AuditEntry>> {
    let mut audit = Vec::with_capacity(actions.len());

    for action in actions {
        match action {
            RemovalAction::RemoveEntity { entity } => {
                store.delete(entity)?;
                tracing::info!(entity = %entity, "Removed entity");
                audit.push(AuditEntry {
                    entity: entity.to_string(),
                    field: String::new(),
                    action: "removed entity".to_string(),
                    detail: String::new(),
                });
            }
            RemovalAction::RemoveField { entity, field } => {
                let Some(mut loaded) = store.load(entity) else {
                    continue;
                };
                loaded.fields.remove(field);
                store.save(loaded)?;
                audit.push(AuditEntry {
                    entity: entity.to_string(),
                    field: field.clone(),
                    action: "removed field".to_string(),
                    detail: String::new(),
                });
            }
            RemovalAction::AnonymizeField {
                entity,
                bundle,
                field,
                anonymizer,
            } => {
                let Some(mut loaded) = store.load(entity) else {
                    continue;
                };
                let Some(FieldValue::Scalar(raw)) = loaded.field(field).cloned() else {
                    tracing::warn!(
                        entity = %entity,
                        field = %field,
                        "Anonymization configured for non-scalar field, skipping"
                    );
                    continue;
                };
                if raw.is_empty() {
                    continue;
                }

                let plugin = anonymizers.resolve(anonymizer).map_err(|_| {
                    AmnesiaError::Anonymization(format!(
                        "Unknown anonymizer '{anonymizer}' for {entity} {field}"
                    ))
                })?;
                let replacement = plugin.anonymize(
                    &raw,
                    &FieldContext {
                        entity_type: &entity.entity_type,
                        bundle,
                        field,
                    },
                )?;

                loaded
                    .fields
                    .insert(field.clone(), FieldValue::Scalar(replacement));
                store.save(loaded)?;
                audit.push(AuditEntry {
                    entity: entity.to_string(),
                    field: field.clone(),
                    action: "anonymized".to_string(),
                    detail: anonymizer.clone(),
                });
            }
        }
    }

    Ok(audit)
}
