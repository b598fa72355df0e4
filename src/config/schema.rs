//! Configuration schema types

use crate::domain::policy::PolicyRegistry;
use crate::domain::{FieldPolicy, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main Amnesia configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmnesiaConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Field sensitivity policies, one `[[policy]]` block per field
    #[serde(rename = "policy", default)]
    pub policies: Vec<FieldPolicy>,

    /// Sanitized dump configuration (required for the `dump` command)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump: Option<DumpConfig>,
}

impl AmnesiaConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.application.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        if let Some(ref dump) = self.dump {
            dump.validate()?;
        }
        Ok(())
    }

    /// Build the policy registry from the configured `[[policy]]` blocks
    pub fn policy_registry(&self) -> Result<PolicyRegistry> {
        PolicyRegistry::from_policies(self.policies.clone())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory export archives and audit logs are written into
    #[serde(default = "default_export_directory")]
    pub directory: String,
}

impl ExportConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.directory.is_empty() {
            return Err("export.directory cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily or never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        let valid_rotations = ["daily", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

/// Sanitized dump configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpConfig {
    /// Database name
    pub database: String,

    /// Database host
    #[serde(default)]
    pub host: Option<String>,

    /// Database port
    #[serde(default)]
    pub port: Option<u16>,

    /// Database user
    #[serde(default)]
    pub user: Option<String>,

    /// Database password
    #[serde(default)]
    pub password: Option<String>,

    /// Explicit table list; when set, only these tables are dumped and no
    /// sanitization applies
    #[serde(default)]
    pub tables: Vec<String>,

    /// Tables excluded from the dump entirely
    #[serde(default)]
    pub skip_tables: Vec<String>,

    /// Tables dumped structure-only
    #[serde(default)]
    pub empty_tables: Vec<String>,

    /// Sensitive columns per table; each listed table must have an
    /// anonymized shadow table prepared under the `gdpr_` prefix
    #[serde(default)]
    pub mapping: BTreeMap<String, Vec<String>>,

    /// Dump data without CREATE TABLE statements
    #[serde(default)]
    pub data_only: bool,

    /// Deterministic row order, one INSERT per row
    #[serde(default)]
    pub ordered_dump: bool,

    /// Extra options appended verbatim to every mysqldump invocation
    #[serde(default)]
    pub extra_options: Option<String>,

    /// Pipe the dump through gzip
    #[serde(default)]
    pub gzip: bool,

    /// Redirect the dump into this file instead of stdout
    #[serde(default)]
    pub result_file: Option<String>,
}

impl DumpConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.database.is_empty() {
            return Err("dump.database cannot be empty".to_string());
        }
        for (table, columns) in &self.mapping {
            if columns.is_empty() {
                return Err(format!(
                    "dump.mapping for table '{table}' lists no columns"
                ));
            }
        }
        Ok(())
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_export_directory() -> String {
    "exports".to_string()
}

fn default_local_path() -> String {
    "/var/log/amnesia".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
