//! [`Vcs`] implementation backed by the `git` binary

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{FALLBACK_DEFAULT_BRANCH, Vcs, Worktree, git_command, git_output, git_run};

/// Git CLI handle bound to a working directory
///
/// Every command runs with `workdir` as its current directory, so relative
/// worktree paths resolve against it.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    /// Create a handle that runs git inside `workdir`
    #[must_use]
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    fn ref_exists(&self, refname: &str) -> bool {
        git_command()
            .args(["show-ref", "--verify", "--quiet", refname])
            .current_dir(&self.workdir)
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

fn path_arg(path: &Path) -> Result<&str> {
    path.to_str().context("Worktree path is not valid UTF-8")
}

fn non_empty_lines(output: &str) -> impl Iterator<Item = &str> {
    output.lines().map(str::trim).filter(|line| !line.is_empty())
}

impl Vcs for Git {
    fn list_worktrees(&self) -> Result<Vec<Worktree>> {
        let output = git_output(&self.workdir, &["worktree", "list", "--porcelain"])
            .context("Failed to list worktrees")?;
        Ok(super::parse_porcelain(&output))
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let name = git_output(&self.workdir, &["branch", "--show-current"])
            .context("Failed to read current branch")?;
        Ok((!name.is_empty()).then_some(name))
    }

    fn local_branches(&self) -> Result<Vec<String>> {
        let output = git_output(
            &self.workdir,
            &["for-each-ref", "--format=%(refname:short)", "refs/heads"],
        )
        .context("Failed to list branches")?;

        Ok(non_empty_lines(&output).map(String::from).collect())
    }

    fn default_branch(&self) -> String {
        if let Ok(symbolic) = git_output(
            &self.workdir,
            &["symbolic-ref", "--quiet", "refs/remotes/origin/HEAD"],
        ) && let Some(name) = symbolic.strip_prefix("refs/remotes/origin/")
            && !name.is_empty()
        {
            return name.to_string();
        }

        if self.ref_exists("refs/heads/main") {
            FALLBACK_DEFAULT_BRANCH.to_string()
        } else {
            "master".to_string()
        }
    }

    fn branches_merged_into(&self, target: &str) -> Result<Vec<String>> {
        let output = git_output(
            &self.workdir,
            &["branch", "--merged", target, "--format=%(refname:short)"],
        )
        .with_context(|| format!("Failed to list branches merged into {target}"))?;

        Ok(non_empty_lines(&output).map(String::from).collect())
    }

    fn commits_ahead(&self, target: &str, branch: &str) -> Result<usize> {
        let range = format!("{target}..{branch}");
        let output = git_output(&self.workdir, &["rev-list", "--count", &range, "--"])
            .with_context(|| format!("Failed to count commits in {range}"))?;

        output
            .parse()
            .with_context(|| format!("Unexpected rev-list output: {output}"))
    }

    fn add_worktree(&self, path: &Path, branch: &str) -> Result<()> {
        debug!(branch, ?path, "Creating worktree with new branch");
        git_run(
            &self.workdir,
            &["worktree", "add", path_arg(path)?, "-b", branch],
        )
        .with_context(|| format!("Failed to create worktree at {}", path.display()))?;

        info!(branch, ?path, "Worktree created");
        Ok(())
    }

    fn remove_worktree(&self, path: &Path) -> Result<()> {
        debug!(?path, "Removing worktree");
        git_run(
            &self.workdir,
            &["worktree", "remove", "--force", path_arg(path)?],
        )
        .with_context(|| format!("Failed to remove worktree at {}", path.display()))?;

        info!(?path, "Worktree removed");
        Ok(())
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "Deleting branch");
        git_run(&self.workdir, &["branch", "-d", branch])
            .with_context(|| format!("Failed to delete branch '{branch}'"))?;

        info!(branch, "Branch deleted");
        Ok(())
    }

    fn uncommitted_changes(&self, path: &Path) -> Result<usize> {
        let output = git_output(path, &["status", "--short"])
            .with_context(|| format!("Failed to read status of {}", path.display()))?;
        Ok(non_empty_lines(&output).count())
    }
}
