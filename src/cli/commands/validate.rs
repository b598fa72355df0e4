//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Amnesia configuration file.

use crate::anonymize::AnonymizerRegistry;
use crate::config::load_config;
use crate::store::JsonStore;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Optional JSON entity data file to validate policies against
    #[arg(short, long)]
    pub data: Option<String>,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let registry = match config.policy_registry() {
            Ok(registry) => registry,
            Err(e) => {
                println!("❌ Policy configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        // Schema-level checks need the entity data file.
        if let Some(data) = &self.data {
            let store = match JsonStore::open(data) {
                Ok(store) => store,
                Err(e) => {
                    println!("❌ Failed to open entity data {data}");
                    println!("   Error: {e}");
                    return Ok(2);
                }
            };
            let anonymizers = AnonymizerRegistry::with_builtins();
            if let Err(e) = registry.validate(&store, &anonymizers) {
                println!("❌ Policies do not match the entity schema");
                println!("   Error: {e}");
                return Ok(2);
            }
            println!("✅ Policies match the entity schema");
        }

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Export Directory: {}", config.export.directory);
        println!("  Policies: {}", config.policies.len());
        match config.dump {
            Some(ref dump) => {
                println!("  Dump Database: {}", dump.database);
                println!("  Mapped Tables: {}", dump.mapping.len());
            }
            None => println!("  Dump: not configured"),
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_creation() {
        let args = ValidateArgs { data: None };
        let _ = format!("{args:?}");
    }
}
