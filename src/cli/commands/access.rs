//! Access command implementation
//!
//! This module implements the `access` command for processing Right to
//! Access requests.

use crate::anonymize::AnonymizerRegistry;
use crate::config::load_config;
use crate::core::tasks::{Task, TaskKind, TaskManager};
use crate::domain::EntityRef;
use crate::store::JsonStore;
use clap::Args;

/// Arguments for the access command
#[derive(Args, Debug)]
pub struct AccessArgs {
    /// Subject entity as `type:id`, e.g. `user:123`
    #[arg(short, long)]
    pub subject: String,

    /// Path to the JSON entity data file
    #[arg(short, long)]
    pub data: String,

    /// Override the configured export directory
    #[arg(short, long)]
    pub out: Option<String>,
}

impl AccessArgs {
    /// Execute the access command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(subject = %self.subject, "Processing access request");

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

        let store = match JsonStore::open(&self.data) {
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

        let export_dir = self
            .out
            .clone()
            .unwrap_or_else(|| config.export.directory.clone());
        let manager = TaskManager::new(&registry, &anonymizers, &export_dir);
        let mut task = Task::new(TaskKind::Access, subject);

        println!("📦 Processing access request for {}", task.subject);
        match manager.process_access(&mut task, &store) {
            Ok(archive) => {
                println!("✅ Export archive written: {}", archive.display());
                Ok(0)
            }
            Err(e) => {
                println!("❌ Access request failed: {e}");
                Ok(5)
            }
        }
    }
}
