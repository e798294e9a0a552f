// src/commands/scan.rs
//! Read-only scan of compatdata folders

use super::load_libraries;
use anyhow::{Context, Result};
use compatfix::reconcile::plan_resolution;
use compatfix::{LocalFs, Reconciler};
use std::path::Path;

/// Classify compatdata folders and print what reconcile would do
pub fn cmd_scan(manifest: Option<&Path>) -> Result<()> {
    let (_, libraries) = load_libraries(manifest)?;

    let reconciler = Reconciler::new(LocalFs);
    let classification = reconciler
        .classify(&libraries)
        .context("Failed to scan compatdata folders")?;

    println!("Libraries: {}", libraries.len());
    for library in &libraries {
        println!(
            "  {} ({} app(s))",
            library.install_path().display(),
            library.declared_apps().len()
        );
    }

    println!(
        "Missing compatdata folders: {}",
        classification.missing_homes.len()
    );
    for (app, home) in classification.missing_homes.iter() {
        println!("  {:>10}  {}", app, home.display());
    }

    println!(
        "Orphaned compatdata folders: {}",
        classification.orphans.folder_count()
    );
    for (app, paths) in classification.orphans.iter() {
        for path in paths {
            println!("  {:>10}  {}", app, path.display());
        }
    }

    let plan = plan_resolution(&classification);
    if plan.is_empty() {
        println!("Nothing to reconcile.");
        return Ok(());
    }

    println!(
        "Planned actions: {} ({} would modify the filesystem)",
        plan.len(),
        plan.mutating_count()
    );
    for planned in plan.iter() {
        println!("  {:<8}  {}", planned.action.kind(), planned);
    }
    Ok(())
}
