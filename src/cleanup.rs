//! Interactive removal of stale worktrees
//!
//! Candidates are handled one at a time: prompt, read the answer, remove,
//! report. Each candidate is its own unit of work; nothing is rolled back
//! if a later one fails or the process is interrupted.

use anyhow::Result;
use std::fmt;
use std::io::{BufRead, Write};
use tracing::{info, warn};

use crate::classify::{Classification, Classified};
use crate::git::Vcs;

/// Outcome counts of a cleanup run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Worktrees removed
    pub removed: usize,
    /// Branches deleted
    pub branches_deleted: usize,
    /// Candidates the operator declined
    pub skipped: usize,
    /// Failed sub-steps (worktree removal or branch deletion)
    pub failures: usize,
}

impl Summary {
    /// Whether any candidate was presented at all
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.removed == 0 && self.skipped == 0 && self.failures == 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Removed {} worktree(s), deleted {} branch(es), skipped {}",
            self.removed, self.branches_deleted, self.skipped
        )?;
        if self.failures > 0 {
            write!(f, ", {} failure(s)", self.failures)?;
        }
        Ok(())
    }
}

/// Console streams the driver talks to
#[derive(Debug)]
pub struct Console<R, W, E> {
    /// Operator answers
    pub input: R,
    /// Prompts and progress
    pub out: W,
    /// Warnings
    pub err: E,
}

/// Read one answer; only a bare `y`/`Y` line confirms. EOF declines.
fn confirmed(input: &mut impl BufRead) -> Result<bool> {
    let mut answer = String::new();
    let read = input.read_line(&mut answer)?;
    let answer = answer.trim_end_matches(['\n', '\r']);
    Ok(read > 0 && matches!(answer, "y" | "Y"))
}

fn remove_candidate<W: Write, E: Write>(
    vcs: &dyn Vcs,
    candidate: &Classified,
    out: &mut W,
    err: &mut E,
    summary: &mut Summary,
) -> Result<()> {
    let branch = candidate.display_branch();

    match vcs.remove_worktree(&candidate.path) {
        Ok(()) => {
            summary.removed += 1;
            writeln!(out, "[OK] Removed: {branch}")?;
        }
        Err(e) => {
            summary.failures += 1;
            warn!(path = ?candidate.path, error = %e, "Worktree removal failed");
            writeln!(
                err,
                "Warning: Could not remove worktree {}: {e:#}",
                candidate.path.display()
            )?;
        }
    }

    if candidate.classification == Classification::Detached {
        return Ok(());
    }
    let Some(branch) = candidate.branch.as_deref() else {
        return Ok(());
    };

    match vcs.delete_branch(branch) {
        Ok(()) => {
            summary.branches_deleted += 1;
            writeln!(out, "[OK] Deleted branch: {branch}")?;
        }
        Err(e) => {
            summary.failures += 1;
            warn!(branch, error = %e, "Branch deletion failed");
            writeln!(err, "Warning: Could not delete branch {branch}: {e:#}")?;
        }
    }

    Ok(())
}

/// Prompt for and remove each candidate in turn
///
/// `default_branch` only affects display: the parent branch is shown as
/// the merge target when it differs from it.
///
/// # Errors
///
/// Returns an error only if the console streams fail; git failures are
/// reported as warnings and processing moves on.
pub fn run<R: BufRead, W: Write, E: Write>(
    vcs: &dyn Vcs,
    candidates: &[Classified],
    default_branch: &str,
    console: &mut Console<R, W, E>,
) -> Result<Summary> {
    let mut summary = Summary::default();

    if candidates.is_empty() {
        writeln!(console.out, "No worktrees to clean up.")?;
        return Ok(summary);
    }

    for candidate in candidates {
        let branch = candidate.display_branch();
        writeln!(
            console.out,
            "Remove {branch} {}?",
            candidate.classification
        )?;
        writeln!(console.out, "  Path: {}", candidate.path.display())?;
        if let Some(parent) = candidate.parent_branch.as_deref()
            && parent != default_branch
        {
            writeln!(console.out, "  Parent: {parent} (merge target)")?;
        }
        write!(console.out, "[y/N] ")?;
        console.out.flush()?;

        if confirmed(&mut console.input)? {
            info!(branch, path = ?candidate.path, "Removing candidate");
            remove_candidate(
                vcs,
                candidate,
                &mut console.out,
                &mut console.err,
                &mut summary,
            )?;
        } else {
            summary.skipped += 1;
            writeln!(console.out, "Skipped: {branch}")?;
        }
        writeln!(console.out)?;
    }

    Ok(summary)
}
