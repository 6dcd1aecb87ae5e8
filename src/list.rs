//! Worktree overview table

use anyhow::Result;
use std::io::Write;
use tracing::debug;

use crate::git::{Vcs, Worktree};
use crate::sidecar;

/// One line of the overview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Branch, or `(detached)`
    pub branch: String,
    /// Last path component of the worktree
    pub worktree: String,
    /// Uncommitted change count
    pub changes: usize,
    /// Sidecar status label, `Unknown` if unparseable, `-` if absent
    pub status: String,
}

fn format_row(branch: &str, worktree: &str, changes: &str, status: &str) -> String {
    format!("{branch:<30} {worktree:<20} {changes:<8} {status}")
}

/// Build the row for one worktree
///
/// Git and sidecar failures degrade to `0` changes and a `-` status.
pub fn row(vcs: &dyn Vcs, worktree: &Worktree) -> Row {
    let changes = vcs.uncommitted_changes(&worktree.path).unwrap_or_else(|e| {
        debug!(path = ?worktree.path, error = %e, "Could not count changes");
        0
    });
    let status = sidecar::read(&worktree.path)
        .map_or_else(|| "-".to_string(), |p| p.status_label().to_string());

    Row {
        branch: worktree.display_branch().to_string(),
        worktree: worktree.short_name(),
        changes,
        status,
    }
}

/// Write the table for every worktree, primary included
///
/// # Errors
///
/// Returns an error if the worktree list cannot be read or `out` fails
pub fn render(vcs: &dyn Vcs, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", format_row("Branch", "Worktree", "Changes", "Status"))?;
    writeln!(out, "{}", format_row("-------", "-------", "------", "------"))?;

    for worktree in vcs.list_worktrees()? {
        let row = row(vcs, &worktree);
        writeln!(
            out,
            "{}",
            format_row(&row.branch, &row.worktree, &row.changes.to_string(), &row.status)
        )?;
    }
    Ok(())
}
