//! Worktree creation
//!
//! Forks a new branch from the primary checkout's HEAD into a new worktree
//! and reports the parent/default branch attribution that `setup` needs to
//! write into the sidecar record.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use fs4::fs_std::FileExt;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::git::Vcs;
use crate::naming;

/// File in the common git directory that serialises allocations
pub const LOCK_FILE: &str = "tmux-worktree.lock";

/// A freshly created worktree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    /// Worktree path as allocated (relative paths are relative to the workdir)
    pub path: PathBuf,
    /// Newly created branch
    pub branch: String,
    /// Branch checked out in the primary worktree at fork time
    pub parent_branch: Option<String>,
    /// Repository default branch
    pub main_branch: String,
}

impl fmt::Display for Created {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "WORKTREE_PATH={}", self.path.display())?;
        writeln!(f, "BRANCH_NAME={}", self.branch)?;
        writeln!(
            f,
            "PARENT_BRANCH={}",
            self.parent_branch.as_deref().unwrap_or_default()
        )?;
        write!(f, "MAIN_BRANCH={}", self.main_branch)
    }
}

/// Inputs of a `create` invocation
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    /// Free-form task description
    pub task: &'a str,
    /// Base directory for worktrees
    pub base_dir: &'a str,
    /// Directory relative paths resolve against
    pub workdir: &'a Path,
    /// Clock reading used for path disambiguation
    pub now: NaiveDateTime,
}

/// Exclusive advisory lock held while a name is allocated and materialised
///
/// Released when dropped.
#[derive(Debug)]
pub struct AllocationLock {
    _file: File,
}

impl AllocationLock {
    /// Block until the lock in `git_common_dir` is acquired
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be opened or locked
    pub fn acquire(git_common_dir: &Path) -> Result<Self> {
        let path = git_common_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;

        debug!(path = ?path, "Waiting for allocation lock");
        FileExt::lock_exclusive(&file)
            .with_context(|| format!("Failed to lock {}", path.display()))?;

        Ok(Self { _file: file })
    }
}

/// Allocate names and materialise the worktree
///
/// Names are allocated before anything is written, so a bad task name or
/// base directory leaves no branch and no directory behind. The caller is
/// expected to hold an [`AllocationLock`] around this call.
///
/// # Errors
///
/// Returns an error on invalid input, if git cannot be queried, or if
/// `git worktree add` fails (its diagnostic is kept in the error chain)
pub fn create_worktree(vcs: &dyn Vcs, request: &Request<'_>) -> Result<Created> {
    let existing = vcs.local_branches()?;
    let naming::Allocation { slug, branch, path } = naming::allocate(
        request.task,
        request.base_dir,
        &existing,
        |candidate| request.workdir.join(candidate).exists(),
        request.now,
    )?;
    debug!(slug = %slug, "Allocated task names");

    let parent_branch = vcs.current_branch().unwrap_or_else(|e| {
        debug!(error = %e, "Could not resolve parent branch");
        None
    });
    let main_branch = vcs.default_branch();

    let base = request.workdir.join(request.base_dir);
    fs::create_dir_all(&base)
        .with_context(|| format!("Failed to create base directory {}", base.display()))?;

    vcs.add_worktree(&path, &branch)?;

    info!(
        branch = %branch,
        path = ?path,
        parent = ?parent_branch,
        main = %main_branch,
        "Created task worktree"
    );

    Ok(Created {
        path,
        branch,
        parent_branch,
        main_branch,
    })
}
