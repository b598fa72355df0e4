//! Shell execution for sanitized dump commands

use crate::domain::{DumpError, Result};
use std::process::Command;

/// Run a composed dump command through `sh -c`, inheriting stdio so
/// progress and mysqldump warnings stream to the operator.
pub fn run(command: &str) -> Result<()> {
    tracing::info!("Executing dump command");
    tracing::debug!(command = %command, "Dump command line");

    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .status()
        .map_err(|e| DumpError::Spawn(e.to_string()))?;

    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(DumpError::CommandFailed { code }.into()),
        None => Err(DumpError::Terminated.into()),
    }
}
