//! Agent dispatch into a prepared worktree
//!
//! Writes the sidecar record, opens a tmux window for the task and types
//! the agent pipeline into it. The agent itself runs detached from this
//! process; nothing here waits for it.

use anyhow::{Context, Result, bail};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::command;
use crate::config::Config;
use crate::git;
use crate::sidecar::{self, BranchInfo};
use crate::tmux::{self, Multiplexer};

/// Usage text shown when the prompt is missing
pub const USAGE: &str = "Usage: tmux-worktree setup <worktree-path> <task-name> [ai-tool] <prompt>\n  \
                         If ai-tool is omitted, uses default_ai from config";

/// Pause between opening a window and typing into it, so the shell is ready
pub const SHELL_SETTLE: Duration = Duration::from_millis(500);

/// Entry added to `info/exclude` for the sidecar directory
const EXCLUDE_ENTRY: &str = ".tmux-worktree/";

/// Inputs of a `setup` invocation
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    /// Worktree to dispatch into
    pub path: &'a Path,
    /// Task name, used for the window name
    pub task: &'a str,
    /// Trailing words: optional tool name, then the prompt
    pub rest: &'a [String],
    /// Branch the worktree was forked from
    pub parent_branch: Option<&'a str>,
    /// Repository default branch
    pub main_branch: &'a str,
    /// Whether this process runs inside tmux
    pub inside_tmux: bool,
    /// Timestamp stamped into the progress record
    pub timestamp: &'a str,
    /// Delay before typing into the new window
    pub settle: Duration,
}

/// Where the agent was started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launched {
    /// Tmux session
    pub session: String,
    /// Window name
    pub window: String,
    /// Tool that was started
    pub tool: String,
}

impl fmt::Display for Launched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SESSION={}", self.session)?;
        writeln!(f, "WINDOW={}", self.window)?;
        write!(f, "AI_TOOL={}", self.tool)
    }
}

/// Split the trailing words into an optional tool name and the prompt
///
/// The first word is the tool only if it names a configured tool; the
/// prompt is everything else joined by single spaces.
///
/// # Errors
///
/// Returns the usage text if no prompt remains
pub fn resolve_args<'a>(rest: &'a [String], config: &Config) -> Result<(Option<&'a str>, String)> {
    let (tool, words) = match rest.split_first() {
        Some((first, tail)) if config.has_tool(first) => (Some(first.as_str()), tail),
        _ => (None, rest),
    };

    let prompt = words.join(" ");
    if prompt.trim().is_empty() {
        bail!("{USAGE}");
    }
    Ok((tool, prompt))
}

fn prompt_contents(prompt: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("{prompt}\n\n{suffix}"),
        None => prompt.to_string(),
    }
}

fn worktree_dir(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        bail!("worktree path not found: {}", path.display());
    }
    if !path.is_dir() {
        bail!("worktree path is not a directory: {}", path.display());
    }
    std::path::absolute(path)
        .with_context(|| format!("Failed to resolve absolute path of {}", path.display()))
}

/// Prepare the worktree and start the agent in a tmux window
///
/// # Errors
///
/// Returns an error on bad arguments, a missing worktree, an unusable tool,
/// if the sidecar cannot be written, or if tmux rejects a command
pub fn run(config: &Config, mux: &dyn Multiplexer, request: &Request<'_>) -> Result<Launched> {
    let (requested, prompt) = resolve_args(request.rest, config)?;
    let path = worktree_dir(request.path)?;

    let (tool_name, tool) = config.select_tool(requested)?;
    command::parse_command_line(&tool.command)
        .with_context(|| format!("AI tool \"{tool_name}\" has an unusable command"))?;

    let branches = BranchInfo {
        parent: request.parent_branch.filter(|p| !p.is_empty()),
        main: request.main_branch,
    };
    let contents = prompt_contents(&prompt, config.prompt_suffix(tool));
    sidecar::write(&path, &contents, &branches, request.timestamp)
        .context("Failed to create .tmux-worktree files")?;
    if let Err(e) = git::ensure_excluded(&path, EXCLUDE_ENTRY) {
        warn!(path = ?path, error = %e, "Could not exclude sidecar directory from git");
    }

    let session = tmux::session_name(mux, request.inside_tmux);
    let window = tmux::window_name(request.task);
    let target = mux.open_window(&session, &window, &path)?;
    debug!(%target, "Agent window opened");

    if !request.settle.is_zero() {
        std::thread::sleep(request.settle);
    }

    mux.send_keys(&target, &command::change_dir(&path.to_string_lossy()))?;
    mux.send_keys(
        &target,
        &command::agent_pipeline(&sidecar::relative_prompt_path(), &tool.command),
    )?;

    info!(%session, %window, tool = tool_name, path = ?path, "Agent dispatched");
    Ok(Launched {
        session,
        window,
        tool: tool_name.to_string(),
    })
}
