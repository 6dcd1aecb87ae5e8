//! tmux-worktree - parallel AI tasks in isolated git worktrees
//!
//! Each task gets its own branch and worktree, an AI agent running in a
//! dedicated tmux window, and a progress record the agent keeps up to
//! date. Finished worktrees are found by merge state and removed
//! interactively.

pub mod classify;
pub mod cleanup;
pub mod command;
pub mod config;
pub mod create;
pub mod git;
pub mod list;
pub mod naming;
pub mod paths;
pub mod setup;
pub mod sidecar;
pub mod tmux;

pub use config::Config;
pub use git::{Git, Vcs};
pub use sidecar::Status;
