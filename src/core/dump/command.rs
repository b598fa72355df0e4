//! Sanitized mysqldump command composition
//!
//! Builds a two-phase dump command: the primary `mysqldump` pass excludes
//! every table with a configured anonymization mapping (plus structure-only
//! and skipped tables), and a rename phase appended to the dump stream
//! renames the pre-generated anonymized shadow tables (`gdpr_` prefix)
//! over the real table names. The resulting dump never contains raw
//! sensitive values.
//!
//! Shadow table existence is not checked here; an invalid mapping produces
//! a command that fails at execution time.

use crate::config::DumpConfig;
use crate::domain::{DumpError, Result};
use std::collections::BTreeSet;

/// Prefix under which anonymized shadow tables are stored.
pub const GDPR_TABLE_PREFIX: &str = "gdpr_";

const BASE_OPTIONS: &str = " --no-autocommit --single-transaction --opt -Q";

/// Composes the sanitized dump shell command from a [`DumpConfig`].
pub struct DumpCommandBuilder<'a> {
    config: &'a DumpConfig,
}

impl<'a> DumpCommandBuilder<'a> {
    /// Create a builder over a dump configuration
    pub fn new(config: &'a DumpConfig) -> Self {
        Self { config }
    }

    /// Build the full shell command, including the rename phase, optional
    /// gzip pipe, and optional output redirection.
    pub fn build(&self) -> Result<String> {
        if self.config.database.is_empty() {
            return Err(DumpError::Configuration("database name is required".to_string()).into());
        }

        let (dump, multiple) = self.dump_cmd();
        let mut cmd = if multiple { format!("({dump})") } else { dump };

        let renames = self.rename_commands();
        if !renames.is_empty() {
            cmd = format!("{{ {cmd} ; {renames} }}");
        }

        let mut needs_pipefail = false;
        if self.config.gzip {
            cmd.push_str(" | gzip -f");
            needs_pipefail = true;
        }

        if let Some(file) = self.output_file() {
            cmd.push_str(" > ");
            cmd.push_str(&shell_arg(&file));
        }

        if needs_pipefail {
            // A failing mysqldump must not be masked by a succeeding gzip.
            cmd = format!("bash -c {}", shell_arg(&format!("set -o pipefail; {cmd}")));
        }

        Ok(cmd)
    }

    /// Path the dump is redirected to, with the `.gz` suffix applied when
    /// gzip is enabled
    pub fn output_file(&self) -> Option<String> {
        self.config.result_file.as_ref().map(|file| {
            if self.config.gzip {
                format!("{file}.gz")
            } else {
                file.clone()
            }
        })
    }

    /// The dump pass(es) without renames or redirection. Returns the
    /// command and whether it is composed of multiple statements.
    fn dump_cmd(&self) -> (String, bool) {
        let creds = self.creds();
        let extra = self.extra_options();
        let mut exec = format!("mysqldump{creds}{extra}");
        let mut multiple = false;

        if !self.config.tables.is_empty() {
            // Explicit table list: single unconditional pass.
            exec.push(' ');
            exec.push_str(&self.config.tables.join(" "));
            return (exec, multiple);
        }

        // Mapped tables are excluded from the raw dump alongside
        // structure-only and skipped tables.
        let mut seen = BTreeSet::new();
        let mut ignores = Vec::new();
        for table in self
            .config
            .mapping
            .keys()
            .map(String::as_str)
            .chain(self.config.empty_tables.iter().map(String::as_str))
            .chain(self.config.skip_tables.iter().map(String::as_str))
        {
            if seen.insert(table) {
                ignores.push(format!(
                    "--ignore-table={}.{table}",
                    self.config.database
                ));
                multiple = true;
            }
        }
        if !ignores.is_empty() {
            exec.push(' ');
            exec.push_str(&ignores.join(" "));
        }

        if !self.config.empty_tables.is_empty() {
            exec.push_str(&format!(
                " && mysqldump{creds} --no-data{extra} {}",
                self.config.empty_tables.join(" ")
            ));
            multiple = true;
        }

        (exec, multiple)
    }

    /// Rename statements echoed into the dump stream, one per mapped table
    /// not excluded by the skip/structure sets.
    fn rename_commands(&self) -> String {
        let excluded: BTreeSet<&str> = self
            .config
            .skip_tables
            .iter()
            .chain(self.config.empty_tables.iter())
            .map(String::as_str)
            .collect();

        let mut command = String::new();
        for table in self.config.mapping.keys() {
            if excluded.contains(table.as_str()) {
                // Skip wins: an excluded table gets no rename.
                continue;
            }
            let rename =
                format!("RENAME TABLE \\`{GDPR_TABLE_PREFIX}{table}\\` TO \\`{table}\\`;");
            tracing::debug!(table = %table, "Adding rename command");
            command.push_str(&format!(" ( echo \"{rename}\" ); "));
        }
        command.trim().to_string()
    }

    /// Connection options followed by the bare database name.
    fn creds(&self) -> String {
        let mut creds = String::new();
        if let Some(host) = &self.config.host {
            creds.push_str(&format!(" --host={host}"));
        }
        if let Some(port) = self.config.port {
            creds.push_str(&format!(" --port={port}"));
        }
        if let Some(user) = &self.config.user {
            creds.push_str(&format!(" --user={user}"));
        }
        if let Some(password) = &self.config.password {
            creds.push_str(&format!(" --password={}", shell_arg(password)));
        }
        creds.push(' ');
        creds.push_str(&self.config.database);
        creds
    }

    fn extra_options(&self) -> String {
        let mut extra = BASE_OPTIONS.to_string();
        if self.config.data_only {
            extra.push_str(" --no-create-info");
        }
        if self.config.ordered_dump {
            extra.push_str(" --skip-extended-insert --order-by-primary");
        }
        if let Some(options) = &self.config.extra_options {
            extra.push(' ');
            extra.push_str(options);
        }
        extra
    }
}

/// Quote a string for use as a single shell word.
fn shell_arg(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn config() -> DumpConfig {
        DumpConfig {
            database: "db".to_string(),
            host: None,
            port: None,
            user: None,
            password: None,
            tables: Vec::new(),
            skip_tables: Vec::new(),
            empty_tables: Vec::new(),
            mapping: BTreeMap::new(),
            data_only: false,
            ordered_dump: false,
            extra_options: None,
            gzip: false,
            result_file: None,
        }
    }

    #[test]
    fn test_plain_dump_is_single_statement() {
        let config = config();
        let cmd = DumpCommandBuilder::new(&config).build().unwrap();
        assert_eq!(cmd, "mysqldump db --no-autocommit --single-transaction --opt -Q");
    }

    #[test]
    fn test_mapped_table_ignored_and_renamed() {
        let mut config = config();
        config
            .mapping
            .insert("users".to_string(), vec!["mail".to_string()]);

        let cmd = DumpCommandBuilder::new(&config).build().unwrap();
        assert!(cmd.contains("--ignore-table=db.users"));
        assert!(cmd.contains("RENAME TABLE \\`gdpr_users\\` TO \\`users\\`;"));
        assert!(cmd.starts_with("{ ("));
        assert!(cmd.ends_with("}"));
    }

    #[test]
    fn test_skip_wins_over_anonymize() {
        let mut config = config();
        config
            .mapping
            .insert("users".to_string(), vec!["mail".to_string()]);
        config.skip_tables.push("users".to_string());

        let cmd = DumpCommandBuilder::new(&config).build().unwrap();
        assert!(cmd.contains("--ignore-table=db.users"));
        assert!(!cmd.contains("RENAME TABLE"));
    }

    #[test]
    fn test_structure_only_tables_append_second_pass() {
        let mut config = config();
        config.empty_tables.push("cache".to_string());

        let cmd = DumpCommandBuilder::new(&config).build().unwrap();
        assert!(cmd.contains("--ignore-table=db.cache"));
        assert!(cmd.contains("&& mysqldump db --no-data"));
        assert!(cmd.contains(" cache"));
        assert!(cmd.starts_with('('));
    }

    #[test]
    fn test_explicit_table_list_skips_ignores() {
        let mut config = config();
        config.tables.push("users".to_string());
        config
            .mapping
            .insert("users".to_string(), vec!["mail".to_string()]);

        let cmd = DumpCommandBuilder::new(&config).build().unwrap();
        assert!(!cmd.contains("--ignore-table"));
        assert!(cmd.contains("-Q users"));
    }

    #[test]
    fn test_gzip_and_result_file() {
        let mut config = config();
        config.gzip = true;
        config.result_file = Some("/tmp/dump.sql".to_string());

        let builder = DumpCommandBuilder::new(&config);
        let cmd = builder.build().unwrap();
        assert!(cmd.starts_with("bash -c 'set -o pipefail;"));
        assert!(cmd.contains("| gzip -f"));
        assert!(cmd.contains("/tmp/dump.sql.gz"));
        assert_eq!(builder.output_file().unwrap(), "/tmp/dump.sql.gz");
    }

    #[test]
    fn test_connection_options() {
        let mut config = config();
        config.host = Some("db.internal".to_string());
        config.port = Some(3307);
        config.user = Some("dumper".to_string());
        config.password = Some("s3cret".to_string());

        let cmd = DumpCommandBuilder::new(&config).build().unwrap();
        assert!(cmd.contains("--host=db.internal"));
        assert!(cmd.contains("--port=3307"));
        assert!(cmd.contains("--user=dumper"));
        assert!(cmd.contains("--password='s3cret'"));
    }

    #[test]
    fn test_data_only_and_ordered() {
        let mut config = config();
        config.data_only = true;
        config.ordered_dump = true;

        let cmd = DumpCommandBuilder::new(&config).build().unwrap();
        assert!(cmd.contains("--no-create-info"));
        assert!(cmd.contains("--skip-extended-insert --order-by-primary"));
    }

    #[test]
    fn test_missing_database_is_configuration_error() {
        let mut config = config();
        config.database = String::new();
        assert!(DumpCommandBuilder::new(&config).build().is_err());
    }

    #[test]
    fn test_shell_arg_escapes_quotes() {
        assert_eq!(shell_arg("a'b"), r"'a'\''b'");
    }
}
