//! Helper functions for test setup and common operations

use std::path::Path;
use std::process::Command;

/// Check if tmux is available on the system
pub fn tmux_available() -> bool {
    tmux_worktree::tmux::is_available()
}

/// Skip a test if tmux is not available. Returns true if test should be skipped.
pub fn skip_if_no_tmux() -> bool {
    if !tmux_available() {
        eprintln!("Skipping test: tmux not available");
        return true;
    }
    false
}

/// Assert two paths are equal after canonicalization.
///
/// This is necessary on macOS where `/var` is a symlink to `/private/var`,
/// causing path comparisons to fail unexpectedly.
pub fn assert_paths_eq(left: &Path, right: &Path, msg: &str) {
    let left_canonical = left.canonicalize().unwrap_or_else(|_| left.to_path_buf());
    let right_canonical = right.canonicalize().unwrap_or_else(|_| right.to_path_buf());
    assert_eq!(left_canonical, right_canonical, "{msg}");
}

/// Run git in `dir`, failing with its stderr if it exits non-zero
pub fn git_command(dir: &Path, args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
    let output = Command::new("git").args(args).current_dir(dir).output()?;
    if !output.status.success() {
        return Err(format!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        )
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
