// src/reconcile/plan.rs

//! Resolution policy
//!
//! Decides, for every orphaned app id, what the write phase should do.
//! Planning is pure: it only looks at a [`Classification`].

use super::classify::Classification;
use crate::manifest::AppId;
use std::fmt;
use std::path::PathBuf;

/// What to do with the orphaned folders of one app id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Reserved app id; never touched
    SkipReserved { paths: Vec<PathBuf> },

    /// No library declares a missing home for this app: the data is dead
    Delete { paths: Vec<PathBuf> },

    /// Exactly one orphan and one missing home: move it there
    Relocate { from: PathBuf, to: PathBuf },

    /// Several orphans compete for the same home; left alone
    Conflict { home: PathBuf, paths: Vec<PathBuf> },

    /// A home exists but the orphan set is empty
    Anomaly { home: PathBuf },
}

impl Action {
    /// Whether executing this action changes the filesystem
    pub fn is_mutating(&self) -> bool {
        matches!(self, Action::Delete { .. } | Action::Relocate { .. })
    }

    /// Short label for reports
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SkipReserved { .. } => "skip",
            Action::Delete { .. } => "delete",
            Action::Relocate { .. } => "relocate",
            Action::Conflict { .. } => "conflict",
            Action::Anomaly { .. } => "anomaly",
        }
    }
}

/// A decision for one app id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    pub app: AppId,
    pub action: Action,
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Action::SkipReserved { .. } => write!(f, "app {}: reserved folder, skipped", self.app),
            Action::Delete { paths } => {
                write!(f, "app {}: no home, delete {} folder(s)", self.app, paths.len())
            }
            Action::Relocate { from, to } => write!(
                f,
                "app {}: move {} -> {}",
                self.app,
                from.display(),
                to.display()
            ),
            Action::Conflict { paths, .. } => write!(
                f,
                "app {}: {} orphans for one home, conflict resolution not supported",
                self.app,
                paths.len()
            ),
            Action::Anomaly { .. } => write!(f, "app {}: home known but no orphan paths", self.app),
        }
    }
}

/// Ordered list of decisions, one per orphaned app id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionPlan {
    pub actions: Vec<PlannedAction>,
}

impl ResolutionPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlannedAction> {
        self.actions.iter()
    }

    /// Number of actions that would modify the filesystem
    pub fn mutating_count(&self) -> usize {
        self.actions.iter().filter(|a| a.action.is_mutating()).count()
    }
}

/// Decide the action for every orphaned app id
///
/// Each decision depends only on that app's orphans and missing home.
pub fn plan_resolution(classification: &Classification) -> ResolutionPlan {
    let actions = classification
        .orphans
        .iter()
        .map(|(app, paths)| {
            let home = classification
                .missing_homes
                .get(app.as_str())
                .map(PathBuf::from);
            let action = decide(app, paths.iter().cloned().collect(), home);
            PlannedAction {
                app: app.clone(),
                action,
            }
        })
        .collect();

    ResolutionPlan { actions }
}

fn decide(app: &AppId, mut paths: Vec<PathBuf>, home: Option<PathBuf>) -> Action {
    if app.is_reserved() {
        return Action::SkipReserved { paths };
    }

    let Some(home) = home else {
        return Action::Delete { paths };
    };

    match paths.len() {
        0 => Action::Anomaly { home },
        1 => Action::Relocate {
            from: paths.remove(0),
            to: home,
        },
        _ => Action::Conflict { home, paths },
    }
}
