//! In-memory [`Vcs`] used by unit tests

use anyhow::{Result, anyhow, bail};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::{Vcs, Worktree};

#[derive(Debug, Default)]
struct State {
    worktrees: Vec<Worktree>,
    branches: BTreeSet<String>,
    merged: BTreeMap<String, BTreeSet<String>>,
    ahead: BTreeMap<(String, String), usize>,
    changes: BTreeMap<PathBuf, usize>,
    failing_removals: BTreeSet<PathBuf>,
    failing_deletions: BTreeSet<String>,
    removed: Vec<PathBuf>,
    deleted: Vec<String>,
}

/// Fake repository: branches, worktrees and merge facts are set explicitly.
///
/// Queries against a target that is not a known branch fail, the same way
/// git fails on an unknown ref.
#[derive(Debug)]
pub struct FakeVcs {
    current: Option<String>,
    default: String,
    state: RefCell<State>,
}

impl FakeVcs {
    pub fn new(default: &str) -> Self {
        let state = State {
            worktrees: vec![Worktree::new("/repo", Some(default)).primary()],
            branches: BTreeSet::from([default.to_string()]),
            ..State::default()
        };
        Self {
            current: Some(default.to_string()),
            default: default.to_string(),
            state: RefCell::new(state),
        }
    }

    pub fn with_current(mut self, branch: Option<&str>) -> Self {
        self.current = branch.map(str::to_string);
        self
    }

    pub fn with_branch(self, name: &str) -> Self {
        self.state.borrow_mut().branches.insert(name.to_string());
        self
    }

    pub fn with_worktree(self, path: &str, branch: Option<&str>) -> Self {
        {
            let mut state = self.state.borrow_mut();
            if let Some(branch) = branch {
                state.branches.insert(branch.to_string());
            }
            state.worktrees.push(Worktree::new(path, branch));
        }
        self
    }

    /// Record that `branch` is reachable from `target`.
    pub fn with_merged(self, target: &str, branch: &str) -> Self {
        self.state
            .borrow_mut()
            .merged
            .entry(target.to_string())
            .or_default()
            .insert(branch.to_string());
        self
    }

    pub fn with_ahead(self, target: &str, branch: &str, count: usize) -> Self {
        self.state
            .borrow_mut()
            .ahead
            .insert((target.to_string(), branch.to_string()), count);
        self
    }

    pub fn with_changes(self, path: &str, count: usize) -> Self {
        self.state
            .borrow_mut()
            .changes
            .insert(PathBuf::from(path), count);
        self
    }

    pub fn failing_removal(self, path: &str) -> Self {
        self.state
            .borrow_mut()
            .failing_removals
            .insert(PathBuf::from(path));
        self
    }

    pub fn failing_deletion(self, branch: &str) -> Self {
        self.state
            .borrow_mut()
            .failing_deletions
            .insert(branch.to_string());
        self
    }

    pub fn delete_ref(&self, branch: &str) {
        self.state.borrow_mut().branches.remove(branch);
    }

    pub fn removed(&self) -> Vec<PathBuf> {
        self.state.borrow().removed.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.borrow().deleted.clone()
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.state.borrow().branches.contains(name)
    }

    fn require_ref(&self, name: &str) -> Result<()> {
        if self.state.borrow().branches.contains(name) {
            Ok(())
        } else {
            Err(anyhow!("fatal: malformed object name {name}"))
        }
    }
}

impl Vcs for FakeVcs {
    fn list_worktrees(&self) -> Result<Vec<Worktree>> {
        Ok(self.state.borrow().worktrees.clone())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.current.clone())
    }

    fn local_branches(&self) -> Result<Vec<String>> {
        Ok(self.state.borrow().branches.iter().cloned().collect())
    }

    fn default_branch(&self) -> String {
        self.default.clone()
    }

    fn branches_merged_into(&self, target: &str) -> Result<Vec<String>> {
        self.require_ref(target)?;
        let state = self.state.borrow();
        let mut merged: Vec<String> = state
            .merged
            .get(target)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        merged.push(target.to_string());
        Ok(merged)
    }

    fn commits_ahead(&self, target: &str, branch: &str) -> Result<usize> {
        self.require_ref(target)?;
        self.require_ref(branch)?;
        Ok(self
            .state
            .borrow()
            .ahead
            .get(&(target.to_string(), branch.to_string()))
            .copied()
            .unwrap_or(1))
    }

    fn add_worktree(&self, path: &Path, branch: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.branches.contains(branch) {
            bail!("fatal: a branch named '{branch}' already exists");
        }
        if state.worktrees.iter().any(|wt| wt.is_at(path)) {
            bail!("fatal: '{}' already exists", path.display());
        }
        state.branches.insert(branch.to_string());
        state.worktrees.push(Worktree::new(path, Some(branch)));
        Ok(())
    }

    fn remove_worktree(&self, path: &Path) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.failing_removals.contains(path) {
            bail!("fatal: cannot remove '{}'", path.display());
        }
        state.worktrees.retain(|wt| !wt.is_at(path));
        state.removed.push(path.to_path_buf());
        Ok(())
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.failing_deletions.contains(branch) {
            bail!("error: the branch '{branch}' is not fully merged");
        }
        if !state.branches.remove(branch) {
            bail!("error: branch '{branch}' not found");
        }
        state.deleted.push(branch.to_string());
        Ok(())
    }

    fn uncommitted_changes(&self, path: &Path) -> Result<usize> {
        Ok(self.state.borrow().changes.get(path).copied().unwrap_or(0))
    }
}
