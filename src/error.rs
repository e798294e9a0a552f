// src/error.rs

//! Error types for compatfix

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for compatfix operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling compatdata folders
#[derive(Error, Debug)]
pub enum Error {
    /// None of the candidate manifest locations exist
    #[error("library manifest not found (checked: {})", display_paths(.candidates))]
    ManifestNotFound { candidates: Vec<PathBuf> },

    /// The manifest text is not valid KeyValues
    #[error("failed to parse manifest: {0}")]
    Parse(String),

    /// The manifest parsed but does not have the expected shape
    #[error("malformed manifest: {0}")]
    Structure(String),

    /// Filesystem operation failed
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading the confirmation answer failed
    #[error("failed to read confirmation: {0}")]
    Prompt(#[source] io::Error),

    /// Installing the interrupt handler failed
    #[error("failed to install interrupt handler: {0}")]
    Signal(#[from] nix::Error),
}

impl Error {
    /// Create a structural manifest error with a message
    pub fn structure(msg: impl Into<String>) -> Self {
        Self::Structure(msg.into())
    }

    /// Wrap an I/O error with the operation and path it concerns
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no usable candidates".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
