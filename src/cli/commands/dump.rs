//! Dump command implementation
//!
//! This module implements the `dump` command for producing sanitized SQL
//! dumps.

use crate::config::load_config;
use crate::core::dump::{sanitized_dump, DumpCommandBuilder};
use clap::Args;

/// Arguments for the dump command
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Print the composed command instead of executing it
    #[arg(long)]
    pub print_only: bool,
}

impl DumpArgs {
    /// Execute the dump command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let Some(dump_config) = config.dump else {
            println!("❌ No [dump] section in configuration");
            return Ok(2);
        };

        if self.print_only {
            match DumpCommandBuilder::new(&dump_config).build() {
                Ok(cmd) => {
                    println!("{cmd}");
                    return Ok(0);
                }
                Err(e) => {
                    println!("❌ Failed to compose dump command: {e}");
                    return Ok(2);
                }
            }
        }

        println!("🧹 Producing sanitized dump of {}", dump_config.database);
        match sanitized_dump(&dump_config) {
            Ok(Some(file)) => {
                println!("✅ Sanitized dump written: {file}");
                Ok(0)
            }
            Ok(None) => Ok(0),
            Err(e) => {
                println!("❌ Dump failed: {e}");
                Ok(5)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_args_creation() {
        let args = DumpArgs { print_only: true };
        assert!(args.print_only);
    }
}
