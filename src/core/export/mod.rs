//! Task export pipeline
//!
//! Converts traversal results into grouped CSV files plus bundled assets
//! and produces a single downloadable zip archive per task. The export
//! directory must exist or be creatable; any failure to create or write is
//! fatal and no partial archive is returned.

pub mod archive;
pub mod csv;

use crate::core::traversal::{AssetReference, TraversalRow};
use crate::domain::{AmnesiaError, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes subject access task results to disk.
pub struct Exporter {
    export_dir: PathBuf,
}

impl Exporter {
    /// Create an exporter rooted at `export_dir`
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    /// Export rows and assets into a zip archive, returning its path.
    ///
    /// Layout inside the archive: `<group>.csv` files at the top level and
    /// `assets/<file_id>.<ext>` for bundled files. A missing asset source
    /// is logged and skipped; everything else that fails here aborts the
    /// export.
    pub fn export(&self, rows: &[TraversalRow], assets: &[AssetReference]) -> Result<PathBuf> {
        fs::create_dir_all(&self.export_dir).map_err(|e| {
            AmnesiaError::Export(format!(
                "Cannot create export directory {}: {e}",
                self.export_dir.display()
            ))
        })?;

        let task_name = random_name(10);
        let staging = self.export_dir.join(&task_name);
        fs::create_dir(&staging).map_err(|e| {
            AmnesiaError::Export(format!(
                "Cannot create staging directory {}: {e}",
                staging.display()
            ))
        })?;

        let result = self.stage_and_bundle(rows, assets, &staging, &task_name);
        // The staging directory is scratch space either way.
        if let Err(err) = fs::remove_dir_all(&staging) {
            tracing::warn!(
                staging = %staging.display(),
                error = %err,
                "Failed to clean up staging directory"
            );
        }
        result
    }

    fn stage_and_bundle(
        &self,
        rows: &[TraversalRow],
        assets: &[AssetReference],
        staging: &Path,
        task_name: &str,
    ) -> Result<PathBuf> {
        for (group, members) in csv::group_rows(rows) {
            csv::write_group(staging, &group, &members)?;
        }

        if !assets.is_empty() {
            let assets_dir = staging.join("assets");
            fs::create_dir(&assets_dir)?;
            for asset in assets {
                self.copy_asset(asset, &assets_dir)?;
            }
        }

        let archive_path = self.export_dir.join(format!("{task_name}.zip"));
        archive::bundle(staging, &archive_path)?;

        tracing::info!(
            archive = %archive_path.display(),
            rows = rows.len(),
            assets = assets.len(),
            "Export archive written"
        );
        Ok(archive_path)
    }

    fn copy_asset(&self, asset: &AssetReference, assets_dir: &Path) -> Result<()> {
        let Some(uri) = asset.uri.as_deref() else {
            tracing::warn!(target_id = %asset.target_id, "Asset has no uri, skipping");
            return Ok(());
        };
        let source = strip_scheme(uri);
        let contents = match fs::read(source) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!(
                    target_id = %asset.target_id,
                    uri = %uri,
                    error = %err,
                    "Asset source not readable, skipping"
                );
                return Ok(());
            }
        };
        fs::write(assets_dir.join(asset.file_name()), contents)?;
        Ok(())
    }
}

/// Strip a `scheme://` prefix so stream-wrapper style uris resolve as
/// plain paths relative to the working directory.
fn strip_scheme(uri: &str) -> &str {
    match uri.split_once("://") {
        Some((_, rest)) => rest,
        None => uri,
    }
}

fn random_name(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
