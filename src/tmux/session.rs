//! Tmux session and window management

use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::{debug, error, info};

use super::{Multiplexer, tmux_command};

const TARGET_FORMAT: &str = "#{session_name}:#{window_index}";

/// Manager for tmux sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct Manager;

impl Manager {
    /// Create a new session manager
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Create a detached session whose first window is `window`
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created (e.g. it exists)
    pub fn create(&self, name: &str, window: &str, working_dir: &Path) -> Result<String> {
        debug!(name, window, ?working_dir, "Creating tmux session");

        let output = tmux_command()
            .arg("new-session")
            .arg("-d")
            .arg("-s")
            .arg(name)
            .arg("-n")
            .arg(window)
            .arg("-c")
            .arg(working_dir)
            .arg("-P")
            .arg("-F")
            .arg(TARGET_FORMAT)
            .output()
            .context("Failed to execute tmux")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            debug!(name, %stderr, "Session not created");
            bail!("Failed to create session '{name}': {stderr}");
        }

        info!(name, window, "Tmux session created");
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Create a new window in an existing session
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be created
    pub fn create_window(&self, session: &str, window: &str, working_dir: &Path) -> Result<String> {
        debug!(session, window, ?working_dir, "Creating tmux window");

        let output = tmux_command()
            .arg("new-window")
            .arg("-t")
            .arg(format!("{session}:"))
            .arg("-n")
            .arg(window)
            .arg("-c")
            .arg(working_dir)
            .arg("-P")
            .arg("-F")
            .arg(TARGET_FORMAT)
            .output()
            .context("Failed to execute tmux")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            error!(session, window, %stderr, "Failed to create window");
            bail!("Failed to create window in session '{session}': {stderr}");
        }

        let target = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!(session, window, %target, "Tmux window created");
        Ok(target)
    }
}

impl Multiplexer for Manager {
    fn current_session(&self) -> Option<String> {
        let output = tmux_command()
            .arg("display-message")
            .arg("-p")
            .arg("#S")
            .output()
            .ok()?;

        if !output.status.success() {
            debug!("Could not resolve current tmux session");
            return None;
        }
        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!name.is_empty()).then_some(name)
    }

    fn open_window(&self, session: &str, window: &str, working_dir: &Path) -> Result<String> {
        match self.create(session, window, working_dir) {
            Ok(target) => Ok(target),
            Err(e) => {
                debug!(session, error = %e, "Falling back to a window in the existing session");
                self.create_window(session, window, working_dir)
            }
        }
    }

    fn send_keys(&self, target: &str, keys: &str) -> Result<()> {
        debug!(target, keys, "Sending keys");

        let output = tmux_command()
            .arg("send-keys")
            .arg("-t")
            .arg(target)
            .arg(keys)
            .arg("Enter")
            .output()
            .context("Failed to execute tmux")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("Failed to send keys to '{target}': {}", stderr.trim());
        }

        Ok(())
    }
}
