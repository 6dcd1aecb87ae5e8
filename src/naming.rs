//! Branch and worktree path allocation
//!
//! A task description becomes a slug, the slug becomes `feature/<slug>`
//! and `<base>/<slug>`. The two are disambiguated independently: branches
//! get a numeric suffix one past the highest one in use, paths get a
//! `YYYYMMDD-HHMMSS` timestamp when the bare path already exists on disk.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of every branch this tool creates
pub const BRANCH_PREFIX: &str = "feature/";

/// Base directory used when none is given
pub const DEFAULT_BASE_DIR: &str = ".worktrees";

/// Input errors caught before anything touches git or the filesystem
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// No task description was given
    #[error("Task name is required")]
    EmptyTask,

    /// The task description has nothing to build a slug from
    #[error(
        "Task name must contain English letters or numbers: {task:?}\n\
         提示: 任务名称必须包含英文字母或数字，不支持纯中文命名。\n\
         Example: \"setup-dev-env\" instead of \"搭建开发环境\""
    )]
    EmptySlug {
        /// The rejected task description
        task: String,
    },

    /// The base directory contains characters outside `[A-Za-z0-9._/-]`
    #[error("Invalid base directory {base_dir:?}: only letters, digits, '.', '_', '/' and '-' are allowed")]
    InvalidBaseDir {
        /// The rejected base directory
        base_dir: String,
    },
}

/// Result of allocating names for a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Normalized task slug
    pub slug: String,
    /// Unique branch name, `feature/<slug>[-N]`
    pub branch: String,
    /// Unique worktree path, `<base>/<slug>[-YYYYMMDD-HHMMSS]`
    pub path: PathBuf,
}

/// Normalize a task description into a slug
///
/// Lowercases, turns every character outside `[a-z0-9]` into a hyphen,
/// collapses runs of hyphens and trims them from both ends.
///
/// # Errors
///
/// Returns [`NameError::EmptyTask`] for blank input and
/// [`NameError::EmptySlug`] when no Latin letter or digit survives.
pub fn slugify(task: &str) -> Result<String, NameError> {
    if task.trim().is_empty() {
        return Err(NameError::EmptyTask);
    }

    let mut slug = String::with_capacity(task.len());
    for ch in task.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        return Err(NameError::EmptySlug {
            task: task.to_string(),
        });
    }
    Ok(slug)
}

/// Check that a base directory is a plain path made of safe characters
///
/// # Errors
///
/// Returns [`NameError::InvalidBaseDir`] if any other character is present
pub fn validate_base_dir(base_dir: &str) -> Result<(), NameError> {
    let valid = !base_dir.is_empty()
        && base_dir
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-'));

    if valid {
        Ok(())
    } else {
        Err(NameError::InvalidBaseDir {
            base_dir: base_dir.to_string(),
        })
    }
}

/// Pick a branch name for `slug` that no existing branch uses
///
/// `feature/<slug>` if free; otherwise `feature/<slug>-N` where `N` is one
/// more than the highest numeric suffix already in use (or 2).
#[must_use]
pub fn allocate_branch<S: AsRef<str>>(slug: &str, existing: &[S]) -> String {
    let base = format!("{BRANCH_PREFIX}{slug}");
    if !existing.iter().any(|b| b.as_ref() == base) {
        return base;
    }

    let suffix_prefix = format!("{base}-");
    let next = existing
        .iter()
        .filter_map(|b| b.as_ref().strip_prefix(&suffix_prefix))
        .filter(|n| !n.is_empty() && n.bytes().all(|c| c.is_ascii_digit()))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .map_or(2, |max| max.saturating_add(1));

    format!("{base}-{next}")
}

/// Format a timestamp as the compact `YYYYMMDD-HHMMSS` path suffix
#[must_use]
pub fn timestamp_suffix(now: NaiveDateTime) -> String {
    now.format("%Y%m%d-%H%M%S").to_string()
}

/// Pick a worktree path for `slug` under `base_dir`
///
/// `<base>/<slug>` if `exists` says it is free, otherwise
/// `<base>/<slug>-<YYYYMMDD-HHMMSS>` using `now`. When that is taken too
/// (several tasks in the same second), `-2`, `-3`, ... is appended until
/// the path is free.
#[must_use]
pub fn allocate_path(
    base_dir: &Path,
    slug: &str,
    exists: impl Fn(&Path) -> bool,
    now: NaiveDateTime,
) -> PathBuf {
    let bare = base_dir.join(slug);
    if !exists(&bare) {
        return bare;
    }

    let stamped = format!("{slug}-{}", timestamp_suffix(now));
    let candidate = base_dir.join(&stamped);
    if !exists(&candidate) {
        return candidate;
    }

    let mut n: u64 = 2;
    loop {
        let candidate = base_dir.join(format!("{stamped}-{n}"));
        if !exists(&candidate) {
            return candidate;
        }
        n = n.saturating_add(1);
    }
}

/// Allocate both branch name and worktree path for a task
///
/// # Errors
///
/// Returns a [`NameError`] if the task or base directory is unusable
pub fn allocate<S: AsRef<str>>(
    task: &str,
    base_dir: &str,
    existing_branches: &[S],
    exists: impl Fn(&Path) -> bool,
    now: NaiveDateTime,
) -> Result<Allocation, NameError> {
    validate_base_dir(base_dir)?;
    let slug = slugify(task)?;
    let branch = allocate_branch(&slug, existing_branches);
    let path = allocate_path(Path::new(base_dir), &slug, exists, now);
    Ok(Allocation { slug, branch, path })
}
