// src/lib.rs

//! compatfix: Steam compatdata reconciliation
//!
//! Proton keeps one prefix folder per game under each library's
//! `steamapps/compatdata`. When games move between libraries, or are
//! uninstalled, those folders are left behind. compatfix compares them with
//! Steam's `libraryfolders.vdf` and either deletes dead folders or moves a
//! stray folder to the library that now expects it.
//!
//! # Architecture
//!
//! - `manifest`: locate and parse `libraryfolders.vdf` into typed entries
//! - `reconcile`: read-only classification, then a confirmed write phase
//! - `filesystem`, `prompt`, `cancel`: the collaborators the reconciler
//!   depends on, each behind a small trait or type

pub mod cancel;
mod error;
pub mod filesystem;
pub mod manifest;
pub mod prompt;
pub mod reconcile;

pub use cancel::{CancelToken, SigintGuard};
pub use error::{Error, Result};
pub use filesystem::{CopyOutcome, Filesystem, LocalFs};
pub use manifest::{discover_manifest, AppId, LibraryEntry, Manifest, MAX_LIBRARIES};
pub use prompt::{AssumeYes, Confirm, LinePrompt};
pub use reconcile::{
    Action, Classification, Interrupt, MissingHomes, OrphanIndex, PlannedAction, Reconciler,
    ResolutionPlan, RunOptions, RunReport, RunStatus,
};
