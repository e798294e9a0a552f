// src/cli.rs
//! CLI definitions for compatfix
//!
//! - `scan` - Report orphaned and missing compatdata folders (read only)
//! - `reconcile` - Delete or relocate orphaned folders (default)

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "compatfix")]
#[command(author, version)]
#[command(about = "Reconcile Steam compatdata folders with the library manifest", long_about = None)]
pub struct Cli {
    /// Path to libraryfolders.vdf (default: auto-detect)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report orphaned and missing compatdata folders without changing anything
    Scan,

    /// Delete dead compatdata folders and move strays to their library
    Reconcile(ReconcileArgs),
}

#[derive(Args, Default)]
pub struct ReconcileArgs {
    /// Do not prompt; assume the confirmation was given
    #[arg(short, long, conflicts_with = "dry_run")]
    pub yes: bool,

    /// Show what would be done without modifying anything
    #[arg(long)]
    pub dry_run: bool,
}
