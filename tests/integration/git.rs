//! Tests for the git CLI backend

use crate::common::{TestFixture, assert_paths_eq};
use pretty_assertions::assert_eq;
use std::path::Path;
use tmux_worktree::git::{self, Vcs};

#[test]
fn test_git_worktree_add_and_remove() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = TestFixture::new()?;
    let git = fixture.git();

    git.add_worktree(Path::new(".worktrees/task"), "feature/task")?;

    let worktree_path = fixture.repo_path.join(".worktrees/task");
    assert!(worktree_path.join(".git").exists());

    let worktrees = git.list_worktrees()?;
    assert_eq!(worktrees.len(), 2);
    assert!(worktrees[0].is_primary);
    assert_eq!(worktrees[1].branch.as_deref(), Some("feature/task"));
    assert_paths_eq(&worktrees[1].path, &worktree_path, "linked worktree path");

    git.remove_worktree(&worktree_path)?;
    assert!(!worktree_path.exists());
    assert_eq!(git.list_worktrees()?.len(), 1);
    Ok(())
}

#[test]
fn test_git_add_worktree_existing_branch_surfaces_stderr()
-> Result<(), Box<dyn std::error::Error>> {
    let fixture = TestFixture::new()?;
    let git = fixture.git();
    fixture.run_git(&["branch", "feature/taken"])?;

    let error = git
        .add_worktree(Path::new(".worktrees/taken"), "feature/taken")
        .err()
        .ok_or("expected failure")?;

    let innermost = error.chain().last().map(ToString::to_string);
    assert!(innermost.is_some_and(|msg| msg.contains("already exists")));
    Ok(())
}

#[test]
fn test_git_current_and_local_branches() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = TestFixture::new()?;
    let git = fixture.git();
    fixture.run_git(&["branch", "feature/x"])?;

    assert_eq!(git.current_branch()?, Some("master".to_string()));
    assert_eq!(git.local_branches()?, vec!["feature/x", "master"]);

    fixture.run_git(&["checkout", "--detach"])?;
    assert_eq!(git.current_branch()?, None);
    Ok(())
}

#[test]
fn test_git_default_branch_fallbacks() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = TestFixture::new()?;
    let git = fixture.git();
    assert_eq!(git.default_branch(), "master");

    fixture.run_git(&["branch", "main"])?;
    assert_eq!(git.default_branch(), "main");
    Ok(())
}

#[test]
fn test_git_default_branch_from_origin_head() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = TestFixture::new()?;
    fixture.run_git(&["branch", "main"])?;
    fixture.run_git(&["update-ref", "refs/remotes/origin/trunk", "HEAD"])?;
    fixture.run_git(&[
        "symbolic-ref",
        "refs/remotes/origin/HEAD",
        "refs/remotes/origin/trunk",
    ])?;

    assert_eq!(fixture.git().default_branch(), "trunk");
    Ok(())
}

#[test]
fn test_git_merge_queries() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = TestFixture::new()?;
    let git = fixture.git();
    let done = fixture.add_worktree("done", "feature/done")?;
    let busy = fixture.add_worktree("busy", "feature/busy")?;
    TestFixture::commit_file(&done, "done.txt", "finish")?;
    TestFixture::commit_file(&busy, "busy.txt", "work")?;
    fixture.run_git(&["merge", "--no-ff", "-m", "merge done", "feature/done"])?;

    let merged = git.branches_merged_into("master")?;
    assert!(merged.contains(&"feature/done".to_string()));
    assert!(!merged.contains(&"feature/busy".to_string()));

    assert_eq!(git.commits_ahead("master", "feature/done")?, 0);
    assert_eq!(git.commits_ahead("master", "feature/busy")?, 1);
    assert!(git.commits_ahead("feature/gone", "feature/busy").is_err());
    assert!(git.branches_merged_into("feature/gone").is_err());
    Ok(())
}

#[test]
fn test_git_delete_branch_is_safe() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = TestFixture::new()?;
    let git = fixture.git();
    let wt = fixture.add_worktree("unmerged", "feature/unmerged")?;
    TestFixture::commit_file(&wt, "x.txt", "unmerged work")?;
    git.remove_worktree(&wt)?;

    assert!(git.delete_branch("feature/unmerged").is_err());
    assert!(git.local_branches()?.contains(&"feature/unmerged".to_string()));

    fixture.run_git(&["branch", "feature/empty"])?;
    git.delete_branch("feature/empty")?;
    assert!(!git.local_branches()?.contains(&"feature/empty".to_string()));
    Ok(())
}

#[test]
fn test_git_uncommitted_changes() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = TestFixture::new()?;
    let git = fixture.git();
    let wt = fixture.add_worktree("dirty", "feature/dirty")?;

    assert_eq!(git.uncommitted_changes(&wt)?, 0);
    std::fs::write(wt.join("a.txt"), "a")?;
    std::fs::write(wt.join("README.md"), "changed")?;
    assert_eq!(git.uncommitted_changes(&wt)?, 2);
    Ok(())
}

#[test]
fn test_git_exclude_sidecar_directory_from_linked_worktree()
-> Result<(), Box<dyn std::error::Error>> {
    let fixture = TestFixture::new()?;
    let git = fixture.git();
    let wt = fixture.add_worktree("task", "feature/task")?;

    git::ensure_excluded(&wt, ".tmux-worktree/")?;
    std::fs::create_dir_all(wt.join(".tmux-worktree"))?;
    std::fs::write(wt.join(".tmux-worktree/progress.md"), "notes")?;

    let exclude = std::fs::read_to_string(fixture.repo_path.join(".git/info/exclude"))?;
    assert!(exclude.contains(".tmux-worktree/"));
    assert_eq!(git.uncommitted_changes(&wt)?, 0);
    Ok(())
}

#[test]
fn test_git_common_dir_is_shared() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = TestFixture::new()?;
    let wt = fixture.add_worktree("task", "feature/task")?;

    assert_paths_eq(
        &git::common_dir(&wt)?,
        &git::common_dir(&fixture.repo_path)?,
        "worktrees share the common git dir",
    );
    Ok(())
}
