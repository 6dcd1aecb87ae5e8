//! Merge-state classification of linked worktrees
//!
//! Each worktree is checked against its own merge target: the parent branch
//! recorded in its sidecar, or the repository default branch when none is
//! recorded. Checking stacked work against the default branch alone would
//! report it as stale while its parent is still in progress.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::git::{Vcs, Worktree};

/// Merge state of one worktree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No branch checked out
    Detached,
    /// Branch tip is reachable from the target
    MergedTo(String),
    /// Branch has no commits the target lacks (e.g. after a rebase or squash)
    NoUniqueCommits(String),
    /// Branch still carries work of its own
    Active,
}

impl Classification {
    /// Whether the worktree may be offered for removal
    #[must_use]
    pub const fn is_candidate(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => f.write_str("(detached)"),
            Self::MergedTo(target) => write!(f, "(merged to {target})"),
            Self::NoUniqueCommits(target) => write!(f, "(no unique commits vs {target})"),
            Self::Active => f.write_str("(active)"),
        }
    }
}

/// A worktree together with its classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    /// Worktree path
    pub path: PathBuf,
    /// Checked-out branch, `None` when detached
    pub branch: Option<String>,
    /// Parent branch recorded in the sidecar
    pub parent_branch: Option<String>,
    /// Branch the merge checks ran against
    pub merge_target: String,
    /// Outcome
    pub classification: Classification,
}

impl Classified {
    /// Branch name for display, `(detached)` when there is none
    #[must_use]
    pub fn display_branch(&self) -> &str {
        self.branch.as_deref().unwrap_or("(detached)")
    }
}

/// Classify a single branch against `target`
///
/// A failing query is inconclusive: that check is skipped and the next one
/// runs, ending at [`Classification::Active`].
pub fn classify_branch(vcs: &dyn Vcs, branch: Option<&str>, target: &str) -> Classification {
    let Some(branch) = branch else {
        return Classification::Detached;
    };

    match vcs.branches_merged_into(target) {
        Ok(merged) if merged.iter().any(|b| b == branch) => {
            return Classification::MergedTo(target.to_string());
        }
        Ok(_) => {}
        Err(e) => debug!(branch, target, error = %e, "Merge check inconclusive"),
    }

    match vcs.commits_ahead(target, branch) {
        Ok(0) => Classification::NoUniqueCommits(target.to_string()),
        Ok(_) => Classification::Active,
        Err(e) => {
            debug!(branch, target, error = %e, "Range check inconclusive");
            Classification::Active
        }
    }
}

/// Classify every linked worktree
///
/// The primary worktree is skipped. `parent_of` looks up the parent branch
/// recorded for a worktree path.
pub fn classify_worktrees(
    vcs: &dyn Vcs,
    worktrees: &[Worktree],
    default_branch: &str,
    parent_of: impl Fn(&Path) -> Option<String>,
) -> Vec<Classified> {
    worktrees
        .iter()
        .filter(|wt| !wt.is_primary)
        .map(|wt| {
            let parent_branch = parent_of(&wt.path);
            let merge_target = parent_branch
                .clone()
                .unwrap_or_else(|| default_branch.to_string());
            let classification = classify_branch(vcs, wt.branch.as_deref(), &merge_target);
            debug!(
                path = ?wt.path,
                branch = wt.display_branch(),
                target = %merge_target,
                %classification,
                "Classified worktree"
            );
            Classified {
                path: wt.path.clone(),
                branch: wt.branch.clone(),
                parent_branch,
                merge_target,
                classification,
            }
        })
        .collect()
}

/// Classified worktrees that may be offered for removal
#[must_use]
pub fn candidates(classified: Vec<Classified>) -> Vec<Classified> {
    classified
        .into_iter()
        .filter(|c| c.classification.is_candidate())
        .collect()
}
