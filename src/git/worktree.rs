//! Worktree records parsed from `git worktree list --porcelain`

use std::path::{Path, PathBuf};

/// A live worktree of the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worktree {
    /// Path to the worktree directory
    pub path: PathBuf,
    /// Short branch name, `None` for a detached HEAD
    pub branch: Option<String>,
    /// Whether this is the primary (original) checkout
    pub is_primary: bool,
}

impl Worktree {
    /// Create a record for a linked worktree
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, branch: Option<&str>) -> Self {
        Self {
            path: path.into(),
            branch: branch.map(str::to_string),
            is_primary: false,
        }
    }

    /// Mark this record as the primary checkout
    #[must_use]
    pub const fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    /// Branch name for display, `(detached)` when there is none
    #[must_use]
    pub fn display_branch(&self) -> &str {
        self.branch.as_deref().unwrap_or("(detached)")
    }

    /// Last component of the worktree path
    #[must_use]
    pub fn short_name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.display().to_string(),
            |name| name.to_string_lossy().to_string(),
        )
    }

    /// Whether this worktree lives at `path`
    #[must_use]
    pub fn is_at(&self, path: &Path) -> bool {
        self.path == path
    }
}

/// Parse the output of `git worktree list --porcelain`
///
/// The first record git prints is always the primary worktree.
#[must_use]
pub fn parse_porcelain(output: &str) -> Vec<Worktree> {
    let mut records: Vec<Worktree> = Vec::new();
    let mut current: Option<Worktree> = None;

    for line in output.lines() {
        if let Some(path) = line.strip_prefix("worktree ") {
            if let Some(record) = current.take() {
                records.push(record);
            }
            let mut record = Worktree::new(path.trim(), None);
            record.is_primary = records.is_empty();
            current = Some(record);
            continue;
        }

        let Some(record) = current.as_mut() else {
            continue;
        };

        if let Some(branch) = line.strip_prefix("branch ") {
            let branch = branch.trim();
            let short = branch.strip_prefix("refs/heads/").unwrap_or(branch);
            record.branch = Some(short.to_string());
        }
    }

    if let Some(record) = current.take() {
        records.push(record);
    }

    records
}
