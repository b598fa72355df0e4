//! SQL dump sanitization
//!
//! Produces database dumps that exclude or substitute sensitive table
//! contents. Anonymized shadow tables carry the [`GDPR_TABLE_PREFIX`] and
//! are renamed over the originals inside the dump stream itself, so the
//! file that leaves the host never held the raw values.

pub mod command;
pub mod runner;

pub use command::{DumpCommandBuilder, GDPR_TABLE_PREFIX};

use crate::config::DumpConfig;
use crate::domain::Result;

/// Build and execute the sanitized dump for `config`.
///
/// Returns the output file path when the dump was redirected to a file,
/// `None` when it streamed to stdout.
pub fn sanitized_dump(config: &DumpConfig) -> Result<Option<String>> {
    let builder = DumpCommandBuilder::new(config);
    let cmd = builder.build()?;
    runner::run(&cmd)?;

    let output = builder.output_file();
    if let Some(file) = &output {
        tracing::info!(file = %file, "Sanitized dump written");
    }
    Ok(output)
}
