//! Fields command implementation
//!
//! This module implements the `fields` command for listing the field
//! sensitivity inventory.

use crate::config::load_config;
use crate::core::inventory::{list_fields, InventoryFilter};
use crate::store::JsonStore;
use clap::Args;

/// Arguments for the fields command
#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// Path to the JSON entity data file
    #[arg(short, long)]
    pub data: String,

    /// Only fields included in Right to Access exports
    #[arg(long)]
    pub rta: bool,

    /// Only fields with an active Right to be Forgotten disposition
    #[arg(long)]
    pub rtf: bool,

    /// Case-insensitive substring match on field name or label
    #[arg(long)]
    pub search: Option<String>,

    /// Only fields that have a policy configured
    #[arg(long)]
    pub configured_only: bool,
}

impl FieldsArgs {
    /// Execute the fields command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let store = match JsonStore::open(&self.data) {
            Ok(store) => store,
            Err(e) => {
                println!("❌ Failed to open entity data {}: {e}", self.data);
                return Ok(2);
            }
        };

        let registry = config.policy_registry()?;
        let filter = InventoryFilter {
            rta_only: self.rta,
            rtf_only: self.rtf,
            search: self.search.clone(),
            configured_only: self.configured_only,
        };

        let entries = list_fields(&store, &registry, &filter);
        if entries.is_empty() {
            println!("No fields match the given filters");
            return Ok(0);
        }

        println!(
            "{:<12} {:<12} {:<20} {:<24} {:<20} {:<16} {:<14} NOTES",
            "TYPE", "BUNDLE", "FIELD", "LABEL", "KIND", "RTA", "RTF"
        );
        for entry in &entries {
            println!(
                "{:<12} {:<12} {:<20} {:<24} {:<20} {:<16} {:<14} {}",
                entry.entity_type,
                entry.bundle,
                entry.field,
                entry.label,
                entry.field_type,
                entry.rta,
                entry.rtf,
                entry.notes
            );
        }
        println!();
        println!("{} field(s)", entries.len());
        Ok(0)
    }
}
