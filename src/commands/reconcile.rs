// src/commands/reconcile.rs
//! Reconciliation command

use super::load_libraries;
use crate::cli::ReconcileArgs;
use anyhow::{Context, Result};
use compatfix::{
    AssumeYes, Confirm, LinePrompt, LocalFs, Reconciler, RunOptions, RunReport, RunStatus,
};
use std::path::Path;

/// Classify, confirm and resolve orphaned compatdata folders
pub fn cmd_reconcile(manifest: Option<&Path>, args: &ReconcileArgs) -> Result<()> {
    let (_, libraries) = load_libraries(manifest)?;

    let mut confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(LinePrompt::stdio())
    };
    let options = RunOptions {
        dry_run: args.dry_run,
        ..RunOptions::default()
    };

    let report = Reconciler::new(LocalFs)
        .run(&libraries, confirm.as_mut(), &options)
        .context("Reconciliation failed")?;

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &RunReport) {
    match report.status {
        RunStatus::Clean => {
            println!("No orphaned compatdata folders found.");
            return;
        }
        RunStatus::Declined => println!("Cancelled. No folders were modified."),
        RunStatus::DryRun => println!("Dry run. No folders were modified."),
        RunStatus::Completed => println!("Reconciliation complete."),
        RunStatus::Interrupted => {
            if let Some(app) = &report.execution.interrupted {
                println!(
                    "Interrupted while relocating app {}; its original folder was kept.",
                    app
                );
            }
        }
    }

    println!(
        "  {} app(s) processed, {} changed, {} conflict(s)",
        report.execution.records.len(),
        report.applied_count(),
        report.conflict_count()
    );
}
