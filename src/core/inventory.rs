//! Field sensitivity inventory
//!
//! Joins the store's field schema with the policy registry into a flat
//! review list, one entry per field across every `(type, bundle)` pair the
//! store knows about. Fields without a policy show up as not configured so
//! coverage gaps are visible.

use crate::domain::policy::PolicyRegistry;
use crate::domain::FieldKind;
use crate::store::EntityStore;

const NOT_CONFIGURED: &str = "Not Configured";

/// One row of the field inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntry {
    /// Entity type the field belongs to
    pub entity_type: String,
    /// Bundle within the entity type
    pub bundle: String,
    /// Field machine name
    pub field: String,
    /// Field label
    pub label: String,
    /// Schema kind: `primary_key`, `scalar`, `entity_reference`, `file`
    pub field_type: String,
    /// Right to Access disposition, `Not Configured` without a policy
    pub rta: String,
    /// Right to be Forgotten disposition, `Not Configured` without a policy
    pub rtf: String,
    /// Administrator notes from the policy
    pub notes: String,
}

/// Narrowing filters for the inventory listing.
#[derive(Debug, Default, Clone)]
pub struct InventoryFilter {
    /// Only fields whose rta policy includes them in exports
    pub rta_only: bool,
    /// Only fields with an active rtf disposition
    pub rtf_only: bool,
    /// Case-insensitive substring match on field name or label
    pub search: Option<String>,
    /// Only fields that have a policy at all
    pub configured_only: bool,
}

impl InventoryFilter {
    fn matches(&self, entry: &InventoryEntry, configured: bool, rta: bool, rtf: bool) -> bool {
        if self.configured_only && !configured {
            return false;
        }
        if self.rta_only && !rta {
            return false;
        }
        if self.rtf_only && !rtf {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !entry.field.to_lowercase().contains(&needle)
                && !entry.label.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// List every known field with its configured dispositions.
pub fn list_fields(
    store: &dyn EntityStore,
    policies: &PolicyRegistry,
    filter: &InventoryFilter,
) -> Vec<InventoryEntry> {
    let mut entries = Vec::new();

    for (entity_type, bundle) in store.bundles() {
        let set = policies.for_entity_type(&entity_type);
        for definition in store.field_definitions(&entity_type, &bundle) {
            let policy = set.and_then(|set| set.field(&bundle, &definition.name));

            let entry = InventoryEntry {
                entity_type: entity_type.clone(),
                bundle: bundle.clone(),
                field: definition.name.clone(),
                label: definition.label.clone(),
                field_type: field_type(&definition.kind, definition.is_id),
                rta: policy
                    .map(|p| p.rta.description().to_string())
                    .unwrap_or_else(|| NOT_CONFIGURED.to_string()),
                rtf: policy
                    .map(|p| p.rtf.description().to_string())
                    .unwrap_or_else(|| NOT_CONFIGURED.to_string()),
                notes: policy.map(|p| p.notes.clone()).unwrap_or_default(),
            };

            let rta_active = policy.map(|p| p.rta.included()).unwrap_or(false);
            let rtf_active = policy
                .map(|p| !matches!(p.rtf, crate::domain::RtfPolicy::No))
                .unwrap_or(false);
            if filter.matches(&entry, policy.is_some(), rta_active, rtf_active) {
                entries.push(entry);
            }
        }
    }

    entries
}

fn field_type(kind: &FieldKind, is_id: bool) -> String {
    if is_id {
        return "primary_key".to_string();
    }
    match kind {
        FieldKind::Scalar => "scalar".to_string(),
        FieldKind::EntityReference { target_type } => {
            format!("entity_reference ({target_type})")
        }
        FieldKind::FileReference => "file".to_string(),
    }
}
