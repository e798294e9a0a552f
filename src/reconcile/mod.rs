// src/reconcile/mod.rs

//! Compatdata reconciliation
//!
//! A run has two strictly separated phases:
//!
//! 1. **Classify** (read only): find declared apps without a compatdata
//!    folder and compatdata folders no library declares.
//! 2. **Resolve** (mutating): after confirmation, delete dead folders and
//!    move single orphans to their missing home.
//!
//! When the confirmation is declined the resolve phase still walks the plan
//! and reports every action, but nothing on disk changes.

mod classify;
mod execute;
mod plan;

pub use classify::{classify_libraries, Classification, MissingHomes, OrphanIndex};
pub use execute::{execute_plan, ActionRecord, ExecMode, Execution};
pub use plan::{plan_resolution, Action, PlannedAction, ResolutionPlan};

pub use crate::cancel::Interrupt;

use crate::error::Result;
use crate::filesystem::Filesystem;
use crate::manifest::LibraryEntry;
use crate::prompt::Confirm;
use tracing::{info, warn};

/// Question shown before any destructive action
pub const CONFIRM_QUESTION: &str = "Please confirm acceptance of liability and willingness to go ahead with reconciliation regardless by typing capital Y: ";

/// Options for [`Reconciler::run`]
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Skip the prompt and only report what would happen
    pub dry_run: bool,
    pub interrupt: Interrupt,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            interrupt: Interrupt::Sigint,
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// No orphans; nothing to do
    Clean,
    /// Confirmation declined; plan reported only
    Declined,
    /// `--dry-run`; plan reported only
    DryRun,
    /// Every planned action was processed
    Completed,
    /// A relocation was interrupted and the run stopped
    Interrupted,
}

/// Summary of a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub status: RunStatus,
    pub classification: Classification,
    pub execution: Execution,
}

impl RunReport {
    /// Number of app ids for which the filesystem was changed
    pub fn applied_count(&self) -> usize {
        self.execution.records.iter().filter(|r| r.applied).count()
    }

    /// App ids reported as conflicts
    pub fn conflict_count(&self) -> usize {
        self.execution
            .records
            .iter()
            .filter(|r| matches!(r.planned.action, Action::Conflict { .. }))
            .count()
    }
}

/// Runs classification and resolution against a [`Filesystem`]
pub struct Reconciler<F> {
    fs: F,
}

impl<F: Filesystem> Reconciler<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Read phase only
    pub fn classify(&self, libraries: &[LibraryEntry]) -> Result<Classification> {
        classify_libraries(libraries, &self.fs)
    }

    /// Classify, confirm, then resolve
    ///
    /// Returns early with [`RunStatus::Clean`] without prompting when no
    /// orphans are found.
    pub fn run(
        &self,
        libraries: &[LibraryEntry],
        confirm: &mut dyn Confirm,
        options: &RunOptions,
    ) -> Result<RunReport> {
        let classification = self.classify(libraries)?;

        if classification.orphans.is_empty() {
            info!("No orphaned compatdata folders found");
            return Ok(RunReport {
                status: RunStatus::Clean,
                classification,
                execution: Execution::default(),
            });
        }

        let plan = plan_resolution(&classification);

        let mode = if options.dry_run {
            ExecMode::ReportOnly
        } else {
            warn!(
                "{} orphan(s) detected; folders WILL be deleted. No guarantees are made about anything at all.",
                classification.orphans.len()
            );
            warn!("Run this at your own peril.");
            warn!("If you have data you do not want to risk losing, please CREATE A BACKUP.");

            if confirm.confirm(CONFIRM_QUESTION)? {
                ExecMode::Apply
            } else {
                info!("Cancelled; no folders will be modified");
                ExecMode::ReportOnly
            }
        };

        let execution = execute_plan(&plan, &self.fs, mode, &options.interrupt)?;

        let status = match (mode, &execution.interrupted) {
            (_, Some(_)) => RunStatus::Interrupted,
            (ExecMode::Apply, None) => RunStatus::Completed,
            (ExecMode::ReportOnly, None) if options.dry_run => RunStatus::DryRun,
            (ExecMode::ReportOnly, None) => RunStatus::Declined,
        };

        Ok(RunReport {
            status,
            classification,
            execution,
        })
    }
}
