//! Zip bundling for subject access exports
//!
//! Bundles a staging directory (CSV files at the top level, binary assets
//! under `assets/`) into a single archive. The archive is written under a
//! partial name and renamed into place only on success, so a failed export
//! never leaves a half-written archive behind.

use crate::domain::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const ASSETS_DIR: &str = "assets";

/// Bundle `staging` into a zip archive at `archive`.
pub fn bundle(staging: &Path, archive: &Path) -> Result<()> {
    let partial = archive.with_extension("zip.partial");
    match write_zip(staging, &partial) {
        Ok(()) => {
            fs::rename(&partial, archive)?;
            Ok(())
        }
        Err(err) => {
            let _ = fs::remove_file(&partial);
            Err(err)
        }
    }
}

fn write_zip(staging: &Path, partial: &Path) -> Result<()> {
    let file = fs::File::create(partial)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for path in sorted_files(staging)? {
        let name = file_name(&path);
        zip.start_file(name, options)?;
        io::copy(&mut fs::File::open(&path)?, &mut zip)?;
    }

    let assets = staging.join(ASSETS_DIR);
    if assets.is_dir() {
        for path in sorted_files(&assets)? {
            let name = format!("{ASSETS_DIR}/{}", file_name(&path));
            zip.start_file(name, options)?;
            io::copy(&mut fs::File::open(&path)?, &mut zip)?;
        }
    }

    zip.finish()?;
    Ok(())
}

/// Plain files directly inside `dir`, sorted by name so archive entry
/// order does not depend on directory iteration order.
fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
