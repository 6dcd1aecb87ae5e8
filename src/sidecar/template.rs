//! Progress file template written when a task is set up

use super::Status;

/// Progress file skeleton
///
/// Placeholders: `$STATUS_LINE`, `$LEGEND`, `$PARENT`, `$MAIN`,
/// `$MERGE_TARGET`, `$PARENT_NOTE`, `$TIMESTAMP`.
const PROGRESS_TEMPLATE: &str = r"# Task Progress

## Status
$STATUS_LINE

<!--
Bold exactly one status:
$LEGEND
-->

## Branch Info
- **Current Branch**: {current branch name}
- **Parent Branch**: $PARENT
- **Main Branch**: $MAIN

## Merge Target
$MERGE_TARGET

> **Important**: when opening a PR, target **$PARENT**, not $MAIN unless they are the same.

## Progress Log

### [$TIMESTAMP] Task started
- Read .tmux-worktree/prompt.md for the task goal
- Parent branch: $PARENT_NOTE
- Starting work...

### [add more milestones...]
---

## Final Summary

### Overview
{what you did}

### Changes Made
{summary of the changes}

### Files Modified
{filled from git status}

### Testing
{how it was tested and the result}

### Blockers / Issues
{if Blocked, describe the problem; otherwise None}

### Next Steps
{what should happen next}

### Cleanup Recommendation
Pick one and explain:
- **Ready to merge** -> merge into **$PARENT**
- **Continue working** -> keep the worktree
- **Cleanup recommended** -> the worktree can be removed safely
- **Needs review** -> a human should review before cleanup

---
_Updated: $TIMESTAMP_
";

/// Branch attribution handed from `create` to `setup`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchInfo<'a> {
    /// Branch the worktree was forked from, if known
    pub parent: Option<&'a str>,
    /// Repository default branch
    pub main: &'a str,
}

impl BranchInfo<'_> {
    /// Branch the work should be merged back into
    #[must_use]
    pub fn merge_target(&self) -> &str {
        self.parent.filter(|p| !p.is_empty()).unwrap_or(self.main)
    }
}

fn status_line(current: Status) -> String {
    Status::ALL
        .iter()
        .map(|status| {
            if *status == current {
                format!("**{status}**")
            } else {
                status.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn legend() -> String {
    Status::ALL
        .iter()
        .map(|status| format!("- **{status}**: {}", status.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a fresh progress file
#[must_use]
pub fn render_progress(branches: &BranchInfo<'_>, timestamp: &str) -> String {
    let target = branches.merge_target();
    let merge_target = if target == branches.main {
        format!("Merge into: **{}**", branches.main)
    } else {
        format!(
            "Merge into: **{target}** (parent branch)\nFallback: {} (if {target} has already been merged)",
            branches.main
        )
    };
    let parent_note = branches
        .parent
        .filter(|p| !p.is_empty())
        .unwrap_or("not detected (possibly a detached HEAD)");

    PROGRESS_TEMPLATE
        .replace("$STATUS_LINE", &status_line(Status::InProgress))
        .replace("$LEGEND", &legend())
        .replace("$MERGE_TARGET", &merge_target)
        .replace("$PARENT_NOTE", parent_note)
        .replace("$PARENT", target)
        .replace("$MAIN", branches.main)
        .replace("$TIMESTAMP", timestamp)
}
