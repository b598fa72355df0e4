//! Erase command implementation
//!
//! This module implements the `erase` command for processing Right to be
//! Forgotten requests.

use crate::anonymize::AnonymizerRegistry;
use crate::config::load_config;
use crate::core::tasks::{Task, TaskKind, TaskManager};
use crate::core::traversal::RemovalAction;
use crate::domain::EntityRef;
use crate::store::JsonStore;
use clap::Args;

/// Arguments for the erase command
#[derive(Args, Debug)]
pub struct EraseArgs {
    /// Subject entity as `type:id`, e.g. `user:123`
    #[arg(short, long)]
    pub subject: String,

    /// Path to the JSON entity data file
    #[arg(short, long)]
    pub data: String,

    /// Collect and print actions without applying them
    #[arg(long)]
    pub dry_run: bool,
}

impl EraseArgs {
    /// Execute the erase command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(subject = %self.subject, dry_run = self.dry_run, "Processing erasure request");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let subject = match EntityRef::parse(&self.subject) {
            Ok(subject) => subject,
            Err(e) => {
                println!("❌ Invalid subject: {e}");
                return Ok(2);
            }
        };

        let mut store = match JsonStore::open(&self.data) {
            Ok(store) => store,
            Err(e) => {
                println!("❌ Failed to open entity data {}: {e}", self.data);
                return Ok(2);
            }
        };

        let registry = config.policy_registry()?;
        let anonymizers = AnonymizerRegistry::with_builtins();
        if let Err(e) = registry.validate(&store, &anonymizers) {
            println!("❌ Policy configuration is invalid: {e}");
            return Ok(2);
        }

        let manager = TaskManager::new(&registry, &anonymizers, &config.export.directory);
        let mut task = Task::new(TaskKind::Removal, subject);

        if self.dry_run {
            println!("🔍 Dry run: erasure actions for {}", task.subject);
        } else {
            println!("🗑  Processing erasure request for {}", task.subject);
        }

        let outcome = match manager.process_removal(&mut task, &mut store, self.dry_run) {
            Ok(outcome) => outcome,
            Err(e) => {
                println!("❌ Erasure request failed: {e}");
                return Ok(5);
            }
        };

        if outcome.actions.is_empty() {
            println!("   No configured erasure actions for this subject");
            return Ok(0);
        }

        for action in &outcome.actions {
            match action {
                RemovalAction::RemoveEntity { entity } => {
                    println!("   remove entity     {entity}");
                }
                RemovalAction::RemoveField { entity, field } => {
                    println!("   remove field      {entity} {field}");
                }
                RemovalAction::AnonymizeField {
                    entity,
                    field,
                    anonymizer,
                    ..
                } => {
                    println!("   anonymize field   {entity} {field} (via {anonymizer})");
                }
            }
        }

        if self.dry_run {
            println!("✅ {} action(s) collected, nothing applied", outcome.actions.len());
            return Ok(0);
        }

        if let Err(e) = store.persist() {
            println!("❌ Failed to write updated entity data: {e}");
            return Ok(5);
        }

        println!("✅ {} action(s) applied", outcome.audit.len());
        if let Some(audit_file) = outcome.audit_file {
            println!("   Audit log: {}", audit_file.display());
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erase_args_creation() {
        let args = EraseArgs {
            subject: "user:1".to_string(),
            data: "entities.json".to_string(),
            dry_run: true,
        };
        assert!(args.dry_run);
    }
}
