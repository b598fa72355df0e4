//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "amnesia.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Amnesia configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your field policies", self.output);
                println!("  2. Set AMNESIA_DUMP_PASSWORD in your environment or .env file");
                println!("  3. Validate configuration: amnesia validate-config");
                println!("  4. List the field inventory: amnesia fields --data entities.json");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    /// Generate the starter configuration
    fn generate_config() -> String {
        r#"# Amnesia Configuration File
# GDPR data subject request toolkit

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

[export]
# Directory export archives and audit logs are written into
directory = "exports"

[logging]
# Enable local JSON file logging
local_enabled = false
local_path = "/var/log/amnesia"
local_rotation = "daily"

# ============================================================================
# Field Sensitivity Policies
# One [[policy]] block per field.
#   rta:          no | inc | maybe
#   rtf:          no | anonymize | remove | inherit
#   relationship: disabled | follow | owner
# ============================================================================

[[policy]]
entity_type = "user"
bundle = "user"
field = "uid"
rta = "inc"
rtf = "remove"          # removing the primary identifier removes the entity
notes = "Primary account identifier"

[[policy]]
entity_type = "user"
bundle = "user"
field = "mail"
rta = "inc"
rtf = "anonymize"
anonymizer = "email"
notes = "Primary contact address"

# [[policy]]
# entity_type = "user"
# bundle = "user"
# field = "field_orders"
# rta = "inc"
# relationship = "follow"
# export_filename = "orders"

# ============================================================================
# Sanitized SQL Dump
# Tables listed under mapping must have anonymized shadow tables prepared
# under the gdpr_ prefix (e.g. gdpr_users for users).
# ============================================================================

# [dump]
# database = "app"
# host = "localhost"
# port = 3306
# user = "dumper"
# password = "${AMNESIA_DUMP_PASSWORD}"
# skip_tables = ["sessions"]
# empty_tables = ["cache"]
# gzip = true
# result_file = "/var/backups/app.sql"
#
# [dump.mapping]
# users = ["mail", "name"]
"#
        .to_string()
    }
}
