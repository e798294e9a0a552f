// src/commands/mod.rs
//! Command handlers for the compatfix CLI

mod reconcile;
mod scan;

pub use reconcile::cmd_reconcile;
pub use scan::cmd_scan;

use anyhow::{Context, Result};
use compatfix::{LibraryEntry, Manifest};
use std::path::{Path, PathBuf};
use tracing::info;

/// Resolve the manifest path and read its library entries
pub(crate) fn load_libraries(manifest: Option<&Path>) -> Result<(PathBuf, Vec<LibraryEntry>)> {
    let path = match manifest {
        Some(path) => path.to_path_buf(),
        None => compatfix::discover_manifest()?,
    };

    let manifest = Manifest::load(&path)
        .with_context(|| format!("Failed to load library manifest {}", path.display()))?;
    let libraries = manifest
        .library_entries()
        .with_context(|| format!("Invalid library manifest {}", path.display()))?;

    info!(
        "Read {} library folder(s) from {}",
        libraries.len(),
        path.display()
    );
    Ok((path, libraries))
}
