//! Per-worktree sidecar record
//!
//! Each worktree set up by this tool carries a `.tmux-worktree/` directory
//! with the task prompt and a human/agent-editable progress file. Only a
//! small subset of the progress file is read back:
//!
//! - status: the first non-blank line after a `## Status` line must start
//!   with `**<label>**`, where `<label>` is one of the [`Status`] labels
//! - parent branch: a `- **Parent Branch**: <name>` line
//! - main branch: a `- **Main Branch**: <name>` line
//!
//! Everything else is free text. A missing or malformed file degrades to
//! "no status" and "no parent", never to an error.

mod status;
mod template;

pub use status::Status;
pub use template::{BranchInfo, render_progress};

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

/// Sidecar directory name inside a worktree
pub const DIR_NAME: &str = ".tmux-worktree";

/// Prompt file name inside the sidecar directory
pub const PROMPT_FILE: &str = "prompt.md";

/// Progress file name inside the sidecar directory
pub const PROGRESS_FILE: &str = "progress.md";

#[expect(clippy::expect_used, reason = "pattern is a literal")]
static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^## Status[ \t]*\r?\n(?:[ \t]*\r?\n)*\*\*(In Progress|Waiting for User|Completed|Blocked|Abandoned)\*\*",
    )
    .expect("status pattern is valid")
});

#[expect(clippy::expect_used, reason = "pattern is a literal")]
static PARENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^- \*\*Parent Branch\*\*:[ \t]*(\S*)[ \t]*\r?$")
        .expect("parent pattern is valid")
});

/// Fields read back from a progress file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    /// Recorded status, `None` when the status section is malformed
    pub status: Option<Status>,
    /// Branch the worktree was forked from
    pub parent_branch: Option<String>,
}

impl Progress {
    /// Parse the fields this tool reads from progress file contents
    #[must_use]
    pub fn parse(contents: &str) -> Self {
        Self {
            status: STATUS_RE
                .captures(contents)
                .and_then(|caps| caps.get(1))
                .and_then(|m| Status::from_label(m.as_str())),
            parent_branch: PARENT_RE
                .captures(contents)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|value| !value.is_empty()),
        }
    }

    /// Status column text: the label, or `Unknown`
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        self.status.as_ref().map_or("Unknown", Status::label)
    }
}

/// Sidecar directory for a worktree
#[must_use]
pub fn dir(worktree: &Path) -> PathBuf {
    worktree.join(DIR_NAME)
}

/// Progress file path for a worktree
#[must_use]
pub fn progress_path(worktree: &Path) -> PathBuf {
    dir(worktree).join(PROGRESS_FILE)
}

/// Prompt file path for a worktree
#[must_use]
pub fn prompt_path(worktree: &Path) -> PathBuf {
    dir(worktree).join(PROMPT_FILE)
}

/// Prompt file path relative to the worktree root, as typed into the agent window
#[must_use]
pub fn relative_prompt_path() -> String {
    format!("{DIR_NAME}/{PROMPT_FILE}")
}

/// Read the progress record of a worktree
///
/// Returns `None` when the file is missing or unreadable.
#[must_use]
pub fn read(worktree: &Path) -> Option<Progress> {
    let path = progress_path(worktree);
    match fs::read_to_string(&path) {
        Ok(contents) => Some(Progress::parse(&contents)),
        Err(e) => {
            debug!(path = ?path, error = %e, "No readable progress file");
            None
        }
    }
}

/// Parent branch recorded for a worktree, if any
#[must_use]
pub fn parent_branch(worktree: &Path) -> Option<String> {
    read(worktree).and_then(|progress| progress.parent_branch)
}

/// Write the prompt and a fresh progress file into a worktree
///
/// # Errors
///
/// Returns an error if the sidecar directory or files cannot be written
pub fn write(
    worktree: &Path,
    prompt: &str,
    branches: &BranchInfo<'_>,
    timestamp: &str,
) -> Result<()> {
    let sidecar = dir(worktree);
    fs::create_dir_all(&sidecar)
        .with_context(|| format!("Failed to create {}", sidecar.display()))?;

    let prompt_file = prompt_path(worktree);
    fs::write(&prompt_file, prompt)
        .with_context(|| format!("Failed to write {}", prompt_file.display()))?;

    let progress_file = progress_path(worktree);
    fs::write(&progress_file, render_progress(branches, timestamp))
        .with_context(|| format!("Failed to write {}", progress_file.display()))?;

    info!(path = ?sidecar, parent = ?branches.parent, "Sidecar record written");
    Ok(())
}
