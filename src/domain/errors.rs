//! Domain error types
//!
//! All errors are domain-specific and don't expose third-party types.
//! Configuration problems (unknown anonymizer ids, bad policies, missing
//! export directories) are reported when configuration is loaded or
//! validated, never mid-traversal.

use thiserror::Error;

/// Main Amnesia error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum AmnesiaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Field policy errors (invalid rta/rtf combinations, unknown anonymizers)
    #[error("Policy error: {0}")]
    Policy(String),

    /// Entity store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Anonymization errors
    #[error("Anonymization error: {0}")]
    Anonymization(String),

    /// Export process errors
    #[error("Export error: {0}")]
    Export(String),

    /// SQL dump errors
    #[error("Dump error: {0}")]
    Dump(#[from] DumpError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// SQL dump pipeline errors
///
/// The dump command is composed at build time without checking that the
/// anonymized shadow tables exist; an invalid mapping surfaces here as a
/// non-zero exit from the external dump process.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The external dump process could not be spawned
    #[error("Failed to spawn dump process: {0}")]
    Spawn(String),

    /// The external dump process exited with a non-zero status
    #[error("Dump command failed with exit code {code}")]
    CommandFailed { code: i32 },

    /// The external dump process was terminated by a signal
    #[error("Dump command terminated without an exit code")]
    Terminated,

    /// Dump configuration is missing or incomplete
    #[error("Dump configuration error: {0}")]
    Configuration(String),
}

impl From<std::io::Error> for AmnesiaError {
    fn from(err: std::io::Error) -> Self {
        AmnesiaError::Io(err.to_string())
    }
}

impl From<csv::Error> for AmnesiaError {
    fn from(err: csv::Error) -> Self {
        AmnesiaError::Export(format!("CSV write failed: {err}"))
    }
}

impl From<zip::result::ZipError> for AmnesiaError {
    fn from(err: zip::result::ZipError) -> Self {
        AmnesiaError::Export(format!("Archive write failed: {err}"))
    }
}
