//! Tmux integration module
//!
//! Agent windows are opened through the [`Multiplexer`] trait so the setup
//! flow can be exercised without a tmux server.

mod session;

pub use session::Manager as SessionManager;

use anyhow::Result;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// Environment variable naming the tmux binary to invoke
pub const TMUX_BIN_ENV: &str = "TMUX_WORKTREE_TMUX_BIN";

/// Session used when not running inside tmux
pub const DEFAULT_SESSION: &str = "worktree-session";

fn tmux_bin() -> OsString {
    std::env::var_os(TMUX_BIN_ENV)
        .filter(|bin| !bin.is_empty())
        .unwrap_or_else(|| OsString::from("tmux"))
}

fn tmux_command() -> Command {
    Command::new(tmux_bin())
}

/// Check if tmux is available on the system
#[must_use]
pub fn is_available() -> bool {
    tmux_command()
        .arg("-V")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Whether this process runs inside a tmux client
#[must_use]
pub fn inside_tmux() -> bool {
    std::env::var_os("TMUX").is_some_and(|v| !v.is_empty())
}

/// Terminal multiplexer operations needed to start an agent
pub trait Multiplexer {
    /// Name of the session this process runs in, if it can be determined
    fn current_session(&self) -> Option<String>;

    /// Open a window named `window` in `session`, starting in `working_dir`
    ///
    /// The session is created if it doesn't exist yet. Returns a target
    /// that addresses the new window.
    ///
    /// # Errors
    ///
    /// Returns an error if neither a session nor a window could be created
    fn open_window(&self, session: &str, window: &str, working_dir: &Path) -> Result<String>;

    /// Type `keys` into `target` followed by Enter
    ///
    /// # Errors
    ///
    /// Returns an error if the keys cannot be sent
    fn send_keys(&self, target: &str, keys: &str) -> Result<()>;
}

/// Session to open agent windows in
///
/// The current session when running inside tmux, otherwise
/// [`DEFAULT_SESSION`].
pub fn session_name(mux: &dyn Multiplexer, inside_tmux: bool) -> String {
    inside_tmux
        .then(|| mux.current_session())
        .flatten()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION.to_string())
}

/// Window name for a task: characters outside `[A-Za-z0-9-]` become `-`,
/// then the first 20 characters are kept
#[must_use]
pub fn window_name(task: &str) -> String {
    task.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .take(20)
        .collect()
}
