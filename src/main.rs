// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ReconcileArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries command output and the prompt
    let default_filter = if cli.verbose { "compatfix=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let manifest = cli.manifest.as_deref();
    match cli.command {
        Some(Commands::Scan) => commands::cmd_scan(manifest),
        Some(Commands::Reconcile(args)) => commands::cmd_reconcile(manifest, &args),
        None => commands::cmd_reconcile(manifest, &ReconcileArgs::default()),
    }
}
