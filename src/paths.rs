//! Platform-specific filesystem path helpers.

use std::ffi::OsString;
use std::path::PathBuf;

/// Directory name used under the per-user config directory.
pub const APP_DIR: &str = "tmux-worktree";

/// Environment variable overriding the whole config directory.
pub const CONFIG_DIR_ENV: &str = "TMUX_WORKTREE_CONFIG_DIR";

/// Path to the debug log file.
///
/// This is located in the OS temp directory.
#[must_use]
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("tmux-worktree.log")
}

#[must_use]
fn home_dir_from(var_os: &mut impl FnMut(&'static str) -> Option<OsString>) -> Option<PathBuf> {
    var_os("HOME").map(PathBuf::from)
}

#[must_use]
fn config_dir_from(var_os: &mut impl FnMut(&'static str) -> Option<OsString>) -> Option<PathBuf> {
    if let Some(dir) = var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
        return Some(PathBuf::from(dir));
    }

    var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir_from(var_os).map(|home| home.join(".config")))
        .map(|base| base.join(APP_DIR))
}

/// Resolve the per-user configuration directory for this tool.
///
/// `TMUX_WORKTREE_CONFIG_DIR` wins, then `$XDG_CONFIG_HOME/tmux-worktree`,
/// then `$HOME/.config/tmux-worktree`.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    let mut var_os = |key: &'static str| std::env::var_os(key);
    config_dir_from(&mut var_os)
}
