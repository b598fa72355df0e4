//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AmnesiaConfig;
use crate::domain::errors::AmnesiaError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AmnesiaConfig
/// 4. Applies environment variable overrides (AMNESIA_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
pub fn load_config(path: impl AsRef<Path>) -> Result<AmnesiaConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AmnesiaError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AmnesiaError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: AmnesiaConfig = toml::from_str(&contents)
        .map_err(|e| AmnesiaError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        AmnesiaError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| {
        AmnesiaError::Configuration(format!("Invalid substitution pattern: {}", e))
    })?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        // Skip comment lines - don't process env vars in comments
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(AmnesiaError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using AMNESIA_* prefix
///
/// Environment variables follow the pattern: AMNESIA_<SECTION>_<KEY>
/// For example: AMNESIA_APPLICATION_LOG_LEVEL, AMNESIA_EXPORT_DIRECTORY
fn apply_env_overrides(config: &mut AmnesiaConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("AMNESIA_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Export overrides
    if let Ok(val) = std::env::var("AMNESIA_EXPORT_DIRECTORY") {
        config.export.directory = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("AMNESIA_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("AMNESIA_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    // Dump overrides (only if a dump section is configured)
    if let Some(ref mut dump) = config.dump {
        if let Ok(val) = std::env::var("AMNESIA_DUMP_HOST") {
            dump.host = Some(val);
        }
        if let Ok(val) = std::env::var("AMNESIA_DUMP_PORT") {
            if let Ok(port) = val.parse() {
                dump.port = Some(port);
            }
        }
        if let Ok(val) = std::env::var("AMNESIA_DUMP_USER") {
            dump.user = Some(val);
        }
        if let Ok(val) = std::env::var("AMNESIA_DUMP_PASSWORD") {
            dump.password = Some(val);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("AMNESIA_TEST_VAR", "test_value");
        let input = "password = \"${AMNESIA_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("AMNESIA_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("AMNESIA_MISSING_VAR");
        let input = "password = \"${AMNESIA_MISSING_VAR}\"";
        assert!(substitute_env_vars(input).is_err());
    }

    #[test]
    fn test_substitute_skips_comment_lines() {
        let input = "# uses ${AMNESIA_UNSET_IN_COMMENT}\nkey = \"plain\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${AMNESIA_UNSET_IN_COMMENT}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("nonexistent.toml").is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[export]
directory = "/tmp/amnesia-exports"

[[policy]]
entity_type = "user"
bundle = "user"
field = "mail"
rta = "inc"
rtf = "anonymize"
anonymizer = "email"

[dump]
database = "app"
mapping = { users = ["mail", "name"] }
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.export.directory, "/tmp/amnesia-exports");
        assert_eq!(config.policies.len(), 1);
        assert_eq!(
            config.dump.unwrap().mapping["users"],
            vec!["mail".to_string(), "name".to_string()]
        );
    }

    #[test]
    fn test_load_config_rejects_invalid_log_level() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[application]\nlog_level = \"verbose\"\n")
            .unwrap();
        temp_file.flush().unwrap();

        assert!(load_config(temp_file.path()).is_err());
    }
}
