//! Command line helpers for configured agent commands.

use anyhow::{Context, Result, bail};

/// Split a command line into an argv vector.
///
/// This uses Unix shell-style quoting rules. It is used to reject agent
/// command templates that a shell would not be able to run.
///
/// # Errors
///
/// Returns an error if the command line is empty or has unbalanced quotes
pub fn parse_command_line(command_line: &str) -> Result<Vec<String>> {
    let trimmed = command_line.trim();
    if trimmed.is_empty() {
        bail!("Command line is empty");
    }

    let argv = shell_words::split(trimmed).context("Failed to parse command line")?;
    if argv.is_empty() {
        bail!("Command line produced no argv items");
    }

    Ok(argv)
}

/// Build the line typed into the agent window.
///
/// The prompt file is piped into the configured command so the prompt text
/// never has to survive shell quoting.
#[must_use]
pub fn agent_pipeline(prompt_file: &str, command: &str) -> String {
    format!("cat {} | {}", shell_words::quote(prompt_file), command.trim())
}

/// Build a `cd` line for the given directory, quoted for a POSIX shell.
#[must_use]
pub fn change_dir(path: &str) -> String {
    format!("cd {}", shell_words::quote(path))
}
