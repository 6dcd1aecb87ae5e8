//! Git operations module
//!
//! Repository discovery goes through `git2`; everything that queries or
//! mutates the branch graph goes through the [`Vcs`] trait, implemented by
//! [`Git`] on top of the `git` binary.

mod cli;
#[cfg(test)]
pub(crate) mod fake;
mod worktree;

pub use cli::Git;
pub use worktree::{Worktree, parse_porcelain};

use anyhow::{Context, Result, anyhow};
use git2::Repository;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Name of the default branch when nothing better is known.
pub const FALLBACK_DEFAULT_BRANCH: &str = "main";

/// Narrow capability interface over the version-control system.
///
/// Everything the allocator, creator, classifier and cleanup driver need
/// from git is expressed here so those components can run against an
/// in-memory implementation in tests.
pub trait Vcs {
    /// List every live worktree, primary first.
    ///
    /// # Errors
    ///
    /// Returns an error if the worktree list cannot be read
    fn list_worktrees(&self) -> Result<Vec<Worktree>>;

    /// Branch checked out in the primary worktree, `None` when detached.
    ///
    /// # Errors
    ///
    /// Returns an error if HEAD cannot be read
    fn current_branch(&self) -> Result<Option<String>>;

    /// Short names of all local branches.
    ///
    /// # Errors
    ///
    /// Returns an error if branches cannot be listed
    fn local_branches(&self) -> Result<Vec<String>>;

    /// The repository default branch.
    ///
    /// Never fails: falls back to `main`, then `master`.
    fn default_branch(&self) -> String;

    /// Local branches whose tip is reachable from `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` does not resolve
    fn branches_merged_into(&self, target: &str) -> Result<Vec<String>>;

    /// Number of commits reachable from `branch` but not from `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if either ref does not resolve
    fn commits_ahead(&self, target: &str, branch: &str) -> Result<usize>;

    /// Add a worktree at `path` on a new branch forked from HEAD.
    ///
    /// # Errors
    ///
    /// Returns an error carrying git's diagnostic output on failure
    fn add_worktree(&self, path: &Path, branch: &str) -> Result<()>;

    /// Force-remove the worktree at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error carrying git's diagnostic output on failure
    fn remove_worktree(&self, path: &Path) -> Result<()>;

    /// Delete a local branch if it is fully merged.
    ///
    /// # Errors
    ///
    /// Returns an error carrying git's diagnostic output on failure
    fn delete_branch(&self, branch: &str) -> Result<()>;

    /// Count of uncommitted changes (`git status --short` lines) at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be read
    fn uncommitted_changes(&self, path: &Path) -> Result<usize>;
}

/// Open a git repository at the given path
///
/// # Errors
///
/// Returns an error if the path is not a git repository
pub fn open_repository(path: &Path) -> Result<Repository> {
    Repository::discover(path)
        .with_context(|| format!("Failed to open git repository at {}", path.display()))
}

/// Check if a path is inside a git repository
#[must_use]
pub fn is_git_repository(path: &Path) -> bool {
    open_repository(path).is_ok()
}

/// Get the git directory shared by all worktrees of the repository
///
/// # Errors
///
/// Returns an error if the path is not inside a git repository
pub fn common_dir(path: &Path) -> Result<PathBuf> {
    let dir = git_output(
        path,
        &["rev-parse", "--path-format=absolute", "--git-common-dir"],
    )
    .with_context(|| format!("Failed to resolve git common dir for {}", path.display()))?;
    Ok(PathBuf::from(dir))
}

/// Ensure `entry` is listed in the repository's `info/exclude`
///
/// The exclude file lives in the common git directory, so the entry applies
/// to every worktree. Creates the file if it doesn't exist.
///
/// # Errors
///
/// Returns an error if the exclude file cannot be read or written
pub fn ensure_excluded(repo_path: &Path, entry: &str) -> Result<()> {
    let info_dir = common_dir(repo_path)?.join("info");
    let exclude_path = info_dir.join("exclude");

    if !info_dir.exists() {
        fs::create_dir_all(&info_dir)
            .with_context(|| format!("Failed to create {}", info_dir.display()))?;
    }

    if exclude_path.exists() {
        let file = fs::File::open(&exclude_path)
            .with_context(|| format!("Failed to open {}", exclude_path.display()))?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            let line = line.context("Failed to read exclude file")?;
            if line.trim() == entry {
                return Ok(());
            }
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&exclude_path)
        .with_context(|| format!("Failed to open {} for writing", exclude_path.display()))?;

    writeln!(file, "{entry}")
        .with_context(|| format!("Failed to write to {}", exclude_path.display()))?;

    debug!(entry, path = ?exclude_path, "Added git exclude entry");
    Ok(())
}

pub(crate) fn git_command() -> Command {
    let mut cmd = Command::new("git");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd
}

/// Run git in `dir` and return trimmed stdout.
///
/// On failure the error chain ends with git's stderr, verbatim.
pub(crate) fn git_output(dir: &Path, args: &[&str]) -> Result<String> {
    debug!(?dir, ?args, "Running git");
    let output = git_command()
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let diagnostic = if stderr.is_empty() {
            anyhow!("git produced no diagnostic output")
        } else {
            anyhow!("{stderr}")
        };
        return Err(diagnostic.context(format!(
            "git {} exited with {}",
            args.join(" "),
            output.status
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

pub(crate) fn git_run(dir: &Path, args: &[&str]) -> Result<()> {
    git_output(dir, args).map(|_| ())
}
