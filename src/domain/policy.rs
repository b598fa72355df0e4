//! Field sensitivity policies
//!
//! A [`FieldPolicy`] records how one field of one `(entity type, bundle)`
//! pair participates in data-subject requests: whether it is included in a
//! Right to Access export, how it is handled on a Right to be Forgotten
//! request, which anonymizer applies, and whether reference fields are
//! followed into related entities.
//!
//! Policies are authored in configuration and are read-only during a
//! traversal run. Invariants are enforced when configuration is loaded or
//! validated, never mid-traversal.

use crate::domain::errors::AmnesiaError;
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Right to Access handling for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RtaPolicy {
    /// Not included in subject access exports
    #[default]
    No,
    /// Always included
    Inc,
    /// Included, flagged for manual review
    Maybe,
}

impl RtaPolicy {
    /// Whether the field is included in a Right to Access export
    pub fn included(self) -> bool {
        matches!(self, RtaPolicy::Inc | RtaPolicy::Maybe)
    }

    /// Human description, as shown by the `fields` command
    pub fn description(self) -> &'static str {
        match self {
            RtaPolicy::No => "Not Included",
            RtaPolicy::Inc => "Included",
            RtaPolicy::Maybe => "Maybe Included",
        }
    }
}

/// Right to be Forgotten handling for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RtfPolicy {
    /// Left untouched on erasure requests
    #[default]
    No,
    /// Value replaced through the configured anonymizer
    Anonymize,
    /// Field cleared; on the primary identifier field, the whole entity is
    /// removed
    Remove,
    /// Takes the rtf of the relationship field through which the entity was
    /// reached
    Inherit,
}

impl RtfPolicy {
    /// Human description, as shown by the `fields` command
    pub fn description(self) -> &'static str {
        match self {
            RtfPolicy::No => "Not Included",
            RtfPolicy::Anonymize => "Anonymized",
            RtfPolicy::Remove => "Removed",
            RtfPolicy::Inherit => "Inherited",
        }
    }
}

/// Relationship handling for reference fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipPolicy {
    /// Do not follow this relationship
    #[default]
    Disabled,
    /// This entity owns the referenced entities; they are included in any
    /// task containing the owner
    Follow,
    /// This entity is owned by the referenced entity
    Owner,
}

impl RelationshipPolicy {
    /// Whether traversal recurses through this relationship
    pub fn followed(self) -> bool {
        matches!(self, RelationshipPolicy::Follow | RelationshipPolicy::Owner)
    }
}

/// GDPR policy for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPolicy {
    /// Entity type the field belongs to
    pub entity_type: String,
    /// Bundle the field belongs to
    pub bundle: String,
    /// Field machine name
    pub field: String,
    /// Whether GDPR handling is enabled for this field
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Right to Access handling
    #[serde(default)]
    pub rta: RtaPolicy,
    /// Right to be Forgotten handling
    #[serde(default)]
    pub rtf: RtfPolicy,
    /// Anonymizer plugin id, required when `rtf = anonymize`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymizer: Option<String>,
    /// Free-form administrator notes, carried into export rows
    #[serde(default)]
    pub notes: String,
    /// Relationship handling for reference fields
    #[serde(default)]
    pub relationship: RelationshipPolicy,
    /// Filename group for subject access exports of related entities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_filename: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl FieldPolicy {
    /// Composite plugin name identifying this policy's field,
    /// `entity_type|bundle|field`
    pub fn plugin_name(&self) -> String {
        format!("{}|{}|{}", self.entity_type, self.bundle, self.field)
    }

    /// Structural validation, independent of store and anonymizer registry.
    ///
    /// `is_id` marks the entity type's primary identifier field, whose
    /// removal means removal of the whole entity and which therefore cannot
    /// be anonymized.
    pub fn validate(&self, is_id: bool) -> Result<()> {
        if self.rtf == RtfPolicy::Anonymize && self.anonymizer.is_none() {
            return Err(AmnesiaError::Policy(format!(
                "Field {} has rtf = anonymize but no anonymizer configured",
                self.plugin_name()
            )));
        }
        if is_id && matches!(self.rtf, RtfPolicy::Anonymize | RtfPolicy::Inherit) {
            return Err(AmnesiaError::Policy(format!(
                "Field {} is a primary identifier and can only be removed, not {}",
                self.plugin_name(),
                match self.rtf {
                    RtfPolicy::Anonymize => "anonymized",
                    _ => "inherited",
                }
            )));
        }
        Ok(())
    }
}

/// All field policies for one entity type, keyed by `(bundle, field)`.
///
/// Loaded once per traversal and immutable for the run's duration.
#[derive(Debug, Clone, Default)]
pub struct EntityPolicySet {
    /// Entity type these policies apply to
    pub entity_type: String,
    fields: HashMap<(String, String), FieldPolicy>,
}

impl EntityPolicySet {
    /// Create an empty policy set for an entity type
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields: HashMap::new(),
        }
    }

    /// Insert or replace the policy for `(bundle, field)`
    pub fn insert(&mut self, policy: FieldPolicy) {
        self.fields
            .insert((policy.bundle.clone(), policy.field.clone()), policy);
    }

    /// The policy for `(bundle, field)`, if configured
    pub fn field(&self, bundle: &str, field: &str) -> Option<&FieldPolicy> {
        self.fields
            .get(&(bundle.to_string(), field.to_string()))
    }

    /// Iterate all policies in the set
    pub fn iter(&self) -> impl Iterator<Item = &FieldPolicy> {
        self.fields.values()
    }

    /// Number of configured field policies
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the set holds no policies
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Policy sets for every configured entity type.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    sets: HashMap<String, EntityPolicySet>,
}

impl PolicyRegistry {
    /// Build a registry from flat policy entries, running structural
    /// validation on each.
    ///
    /// Primary-identifier restrictions need field definitions and are
    /// checked separately by [`PolicyRegistry::validate`].
    pub fn from_policies(policies: Vec<FieldPolicy>) -> Result<Self> {
        let mut registry = Self::default();
        for policy in policies {
            policy.validate(false)?;
            registry
                .sets
                .entry(policy.entity_type.clone())
                .or_insert_with(|| EntityPolicySet::new(policy.entity_type.clone()))
                .insert(policy);
        }
        Ok(registry)
    }

    /// The policy set for an entity type, if any fields are configured
    pub fn for_entity_type(&self, entity_type: &str) -> Option<&EntityPolicySet> {
        self.sets.get(entity_type)
    }

    /// Iterate all policy sets
    pub fn iter(&self) -> impl Iterator<Item = &EntityPolicySet> {
        self.sets.values()
    }

    /// Full validation against the entity store and the anonymizer registry.
    ///
    /// Checks that every policy references a field the store knows about,
    /// that primary identifier fields respect the removal-only restriction,
    /// and that every `rtf = anonymize` policy names a registered
    /// anonymizer. Run when configuration is saved or explicitly validated.
    pub fn validate(
        &self,
        store: &dyn crate::store::EntityStore,
        anonymizers: &crate::anonymize::AnonymizerRegistry,
    ) -> Result<()> {
        for set in self.sets.values() {
            for policy in set.iter() {
                let definitions = store.field_definitions(&policy.entity_type, &policy.bundle);
                let definition = definitions
                    .iter()
                    .find(|def| def.name == policy.field)
                    .ok_or_else(|| {
                        AmnesiaError::Policy(format!(
                            "Field {} is not defined on {}/{}",
                            policy.field, policy.entity_type, policy.bundle
                        ))
                    })?;

                policy.validate(definition.is_id)?;

                if policy.rtf == RtfPolicy::Anonymize {
                    // Presence is guaranteed by the structural check above.
                    if let Some(id) = policy.anonymizer.as_deref() {
                        anonymizers.resolve(id).map_err(|_| {
                            AmnesiaError::Policy(format!(
                                "Field {} references unknown anonymizer '{id}'",
                                policy.plugin_name()
                            ))
                        })?;
                    }
                }
            }
        }
        Ok(())
    }
}
