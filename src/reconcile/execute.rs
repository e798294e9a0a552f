// src/reconcile/execute.rs

//! Write phase: carry out a [`ResolutionPlan`]
//!
//! Deletions and relocations are irreversible. A relocation only deletes
//! its source after the copy has fully completed; an interrupted or failed
//! copy has its partial destination removed and leaves the source intact.

use super::plan::{Action, PlannedAction, ResolutionPlan};
use crate::cancel::Interrupt;
use crate::error::Result;
use crate::filesystem::{CopyOutcome, Filesystem};
use crate::manifest::AppId;
use std::path::Path;
use tracing::{debug, info, warn};

/// Whether the write phase may touch the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Apply,
    /// Walk the plan and report each action without mutating anything
    ReportOnly,
}

/// What happened to one planned action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub planned: PlannedAction,
    /// True when the filesystem was changed for this app
    pub applied: bool,
}

/// Outcome of the write phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Execution {
    pub records: Vec<ActionRecord>,
    /// Set when a relocation was interrupted; later apps were not processed
    pub interrupted: Option<AppId>,
}

/// Execute `plan` in order, stopping early only on interruption or error
///
/// `interrupt` is armed only while a relocation copy runs.
pub fn execute_plan<F>(
    plan: &ResolutionPlan,
    fs: &F,
    mode: ExecMode,
    interrupt: &Interrupt,
) -> Result<Execution>
where
    F: Filesystem + ?Sized,
{
    let mut execution = Execution::default();

    for planned in plan.iter() {
        if mode == ExecMode::ReportOnly {
            info!("[report only] {}", planned);
            execution.records.push(ActionRecord {
                planned: planned.clone(),
                applied: false,
            });
            continue;
        }

        let app = &planned.app;
        let applied = match &planned.action {
            Action::SkipReserved { .. } => {
                debug!("Skipping reserved compatdata folder {}", app);
                false
            }
            Action::Delete { paths } => {
                info!("No home for app {}", app);
                for path in paths {
                    debug!("Deleting {}", path.display());
                    fs.delete_tree(path)?;
                }
                !paths.is_empty()
            }
            Action::Relocate { from, to } => {
                info!("Reconciling {} with orphan {}", app, from.display());
                match relocate(fs, from, to, interrupt)? {
                    CopyOutcome::Completed => true,
                    CopyOutcome::Interrupted => {
                        info!("Interrupted while copying {}; stopping", app);
                        execution.records.push(ActionRecord {
                            planned: planned.clone(),
                            applied: false,
                        });
                        execution.interrupted = Some(app.clone());
                        return Ok(execution);
                    }
                }
            }
            Action::Conflict { home, paths } => {
                warn!(
                    "Multiple orphans found for app {} ({} candidates for {}); conflict resolution not supported, skipping",
                    app,
                    paths.len(),
                    home.display()
                );
                for path in paths {
                    warn!("  candidate: {}", path.display());
                }
                false
            }
            Action::Anomaly { home } => {
                warn!(
                    "No orphan paths for app {} despite missing home {}; skipping",
                    app,
                    home.display()
                );
                false
            }
        };

        execution.records.push(ActionRecord {
            planned: planned.clone(),
            applied,
        });
    }

    Ok(execution)
}

/// Copy `from` to `to`, then delete `from`
///
/// On interruption or copy failure the partial destination is removed and
/// `from` is left untouched. A cancellation seen after the copy finished
/// still counts as an interruption.
fn relocate<F>(fs: &F, from: &Path, to: &Path, interrupt: &Interrupt) -> Result<CopyOutcome>
where
    F: Filesystem + ?Sized,
{
    let copied = {
        let armed = interrupt.arm()?;
        match fs.copy_tree(from, to, armed.token()) {
            Ok(CopyOutcome::Completed) if armed.token().is_cancelled() => {
                Ok(CopyOutcome::Interrupted)
            }
            other => other,
        }
    };

    match copied {
        Ok(CopyOutcome::Completed) => {
            debug!("Copied {} -> {}", from.display(), to.display());
            fs.delete_tree(from)?;
            Ok(CopyOutcome::Completed)
        }
        Ok(CopyOutcome::Interrupted) => {
            if fs.exists(to) {
                fs.delete_tree(to)?;
            }
            Ok(CopyOutcome::Interrupted)
        }
        Err(e) => {
            // The destination did not exist before the copy started
            if fs.exists(to) {
                if let Err(cleanup) = fs.delete_tree(to) {
                    warn!(
                        "Failed to remove partial copy {}: {}",
                        to.display(),
                        cleanup
                    );
                }
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;
    use crate::error::Error;
    use crate::filesystem::{copy_tree_observed, LocalFs};
    use std::cell::RefCell;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn uncancelled() -> Interrupt {
        Interrupt::Token(CancelToken::new())
    }

    fn planned(app: &str, action: Action) -> PlannedAction {
        PlannedAction {
            app: AppId::from(app),
            action,
        }
    }

    #[test]
    fn test_report_only_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let doomed = temp.path().join("42");
        fs::create_dir(&doomed).unwrap();

        let plan = ResolutionPlan {
            actions: vec![planned(
                "42",
                Action::Delete {
                    paths: vec![doomed.clone()],
                },
            )],
        };
        let execution =
            execute_plan(&plan, &LocalFs, ExecMode::ReportOnly, &uncancelled()).unwrap();

        assert!(doomed.exists());
        assert_eq!(execution.records.len(), 1);
        assert!(!execution.records[0].applied);
    }

    #[test]
    fn test_relocate_moves_folder() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("b/7");
        let to = temp.path().join("a/7");
        fs::create_dir_all(from.join("pfx")).unwrap();
        fs::write(from.join("pfx/user.reg"), "reg").unwrap();
        fs::create_dir_all(temp.path().join("a")).unwrap();

        let plan = ResolutionPlan {
            actions: vec![planned(
                "7",
                Action::Relocate {
                    from: from.clone(),
                    to: to.clone(),
                },
            )],
        };
        let execution = execute_plan(&plan, &LocalFs, ExecMode::Apply, &uncancelled()).unwrap();

        assert!(execution.records[0].applied);
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(to.join("pfx/user.reg")).unwrap(), "reg");
    }

    #[test]
    fn test_interrupt_stops_processing() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("b/7");
        let to = temp.path().join("a/7");
        let later = temp.path().join("b/8");
        fs::create_dir_all(&from).unwrap();
        fs::write(from.join("data"), "x").unwrap();
        fs::create_dir_all(&later).unwrap();

        let plan = ResolutionPlan {
            actions: vec![
                planned(
                    "7",
                    Action::Relocate {
                        from: from.clone(),
                        to: to.clone(),
                    },
                ),
                planned(
                    "8",
                    Action::Delete {
                        paths: vec![later.clone()],
                    },
                ),
            ],
        };
        let cancel = CancelToken::new();
        cancel.cancel();
        let execution =
            execute_plan(&plan, &LocalFs, ExecMode::Apply, &Interrupt::Token(cancel)).unwrap();

        assert_eq!(execution.interrupted, Some(AppId::from("7")));
        assert_eq!(execution.records.len(), 1);
        assert!(!to.exists());
        assert!(from.join("data").exists());
        assert!(later.exists());
    }

    /// Writes part of the destination, then fails or reports interruption
    struct PartialCopyFs {
        fail: bool,
        deleted: RefCell<Vec<PathBuf>>,
    }

    impl Filesystem for PartialCopyFs {
        fn exists(&self, path: &Path) -> bool {
            LocalFs.exists(path)
        }

        fn list_dir(&self, path: &Path) -> Result<Vec<String>> {
            LocalFs.list_dir(path)
        }

        fn copy_tree(&self, _src: &Path, dst: &Path, _cancel: &CancelToken) -> Result<CopyOutcome> {
            fs::create_dir_all(dst.join("partial")).unwrap();
            if self.fail {
                Err(Error::io("copy", dst, io::Error::other("disk full")))
            } else {
                Ok(CopyOutcome::Interrupted)
            }
        }

        fn delete_tree(&self, path: &Path) -> Result<()> {
            self.deleted.borrow_mut().push(path.to_path_buf());
            LocalFs.delete_tree(path)
        }
    }

    #[test]
    fn test_partial_destination_removed() {
        for fail in [false, true] {
            let temp = TempDir::new().unwrap();
            let from = temp.path().join("b/7");
            let to = temp.path().join("a/7");
            fs::create_dir_all(&from).unwrap();

            let fs_double = PartialCopyFs {
                fail,
                deleted: RefCell::new(Vec::new()),
            };
            let result = relocate(&fs_double, &from, &to, &uncancelled());

            assert_eq!(result.is_err(), fail);
            assert!(!to.exists());
            assert!(from.exists());
            assert_eq!(*fs_double.deleted.borrow(), vec![to.clone()]);
        }
    }

    /// Real copy through `LocalFs` that cancels once the first file lands
    struct CancelMidCopyFs;

    impl Filesystem for CancelMidCopyFs {
        fn exists(&self, path: &Path) -> bool {
            LocalFs.exists(path)
        }

        fn list_dir(&self, path: &Path) -> Result<Vec<String>> {
            LocalFs.list_dir(path)
        }

        fn copy_tree(&self, src: &Path, dst: &Path, cancel: &CancelToken) -> Result<CopyOutcome> {
            copy_tree_observed(src, dst, cancel, &mut |target| {
                if target.is_file() {
                    cancel.cancel();
                }
            })
        }

        fn delete_tree(&self, path: &Path) -> Result<()> {
            LocalFs.delete_tree(path)
        }
    }

    #[test]
    fn test_cancel_mid_copy_removes_partial_destination() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("b/7");
        let to = temp.path().join("a/7");
        for name in ["one", "two", "three"] {
            fs::create_dir_all(from.join(name)).unwrap();
            fs::write(from.join(name).join("data"), name).unwrap();
        }

        let cancel = CancelToken::new();
        let outcome = relocate(&CancelMidCopyFs, &from, &to, &Interrupt::Token(cancel.clone()));

        assert_eq!(outcome.unwrap(), CopyOutcome::Interrupted);
        assert!(cancel.is_cancelled());
        assert!(!to.exists());
        for name in ["one", "two", "three"] {
            assert!(from.join(name).join("data").exists());
        }
    }

    /// Copies everything, then cancels before returning
    struct LateCancelFs;

    impl Filesystem for LateCancelFs {
        fn exists(&self, path: &Path) -> bool {
            LocalFs.exists(path)
        }

        fn list_dir(&self, path: &Path) -> Result<Vec<String>> {
            LocalFs.list_dir(path)
        }

        fn copy_tree(&self, src: &Path, dst: &Path, cancel: &CancelToken) -> Result<CopyOutcome> {
            let outcome = LocalFs.copy_tree(src, dst, cancel)?;
            cancel.cancel();
            Ok(outcome)
        }

        fn delete_tree(&self, path: &Path) -> Result<()> {
            LocalFs.delete_tree(path)
        }
    }

    #[test]
    fn test_cancel_after_copy_keeps_source() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("b/7");
        let to = temp.path().join("a/7");
        fs::create_dir_all(&from).unwrap();
        fs::write(from.join("data"), "x").unwrap();

        let outcome = relocate(&LateCancelFs, &from, &to, &uncancelled()).unwrap();

        assert_eq!(outcome, CopyOutcome::Interrupted);
        assert!(!to.exists());
        assert!(from.join("data").exists());
    }

    #[test]
    fn test_delete_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let plan = ResolutionPlan {
            actions: vec![planned(
                "42",
                Action::Delete {
                    paths: vec![temp.path().join("missing")],
                },
            )],
        };
        let err = execute_plan(&plan, &LocalFs, ExecMode::Apply, &uncancelled()).unwrap_err();
        assert!(matches!(err, Error::Io { op: "stat", .. }));
    }
}
