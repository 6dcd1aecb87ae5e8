//! AI tool configuration
//!
//! Lives in `config.json` under the per-user config directory and is seeded
//! from a bundled template the first time any command needs it.

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::paths;

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.json";

/// Bundled configuration written on first use
pub const TEMPLATE: &str = include_str!("../../assets/config-template.json");

/// One configured AI agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiTool {
    /// Shell command the prompt is piped into
    pub command: String,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Text appended to the prompt for this tool, overriding the global one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_prompt_suffix: Option<String>,
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Tool used when `setup` is not given one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ai: Option<String>,

    /// Text appended to every prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_prompt_suffix: Option<String>,

    /// Configured tools by name
    #[serde(default)]
    pub ai_tools: BTreeMap<String, AiTool>,
}

/// `query-config` entry for one tool
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ToolInfo {
    /// Tool name
    pub name: String,
    /// Description, or the name when none is configured
    pub description: String,
}

/// `query-config` document
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ToolsInfo {
    /// Effective default tool
    pub default_ai: Option<String>,
    /// All configured tools
    pub ai_tools: Vec<ToolInfo>,
}

impl Config {
    /// Get the default configuration file path
    ///
    /// # Errors
    ///
    /// Returns an error if no per-user config directory can be determined
    pub fn default_path() -> Result<PathBuf> {
        paths::config_dir()
            .map(|dir| dir.join(CONFIG_FILE))
            .context("Could not determine config directory: set XDG_CONFIG_HOME or HOME")
    }

    /// Seed `path` from the bundled template if it doesn't exist
    ///
    /// An existing file is left untouched. Returns whether it was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written
    pub fn ensure_at(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }
        fs::write(path, TEMPLATE)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        info!(path = ?path, "Seeded configuration from template");
        Ok(true)
    }

    /// Seed the default config file if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if the location is unknown or cannot be written
    pub fn ensure() -> Result<PathBuf> {
        let path = Self::default_path()?;
        Self::ensure_at(&path)?;
        Ok(path)
    }

    /// Load configuration from the default location, seeding it first
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be seeded, read, or parsed
    pub fn load() -> Result<Self> {
        let path = Self::ensure()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
        debug!(path = ?path, tools = config.ai_tools.len(), "Loaded configuration");
        Ok(config)
    }

    /// Whether `name` is a configured tool
    #[must_use]
    pub fn has_tool(&self, name: &str) -> bool {
        self.ai_tools.contains_key(name)
    }

    /// Pick the tool to run
    ///
    /// `requested`, else `default_ai`, else the first configured tool.
    ///
    /// # Errors
    ///
    /// Returns an error if no tools are configured, the chosen tool is not
    /// configured, or it has an empty command
    pub fn select_tool(&self, requested: Option<&str>) -> Result<(&str, &AiTool)> {
        let Some((first, _)) = self.ai_tools.first_key_value() else {
            bail!("No AI tools defined in config");
        };

        let name = requested
            .or(self.default_ai.as_deref())
            .unwrap_or(first.as_str());

        let (name, tool) = self.ai_tools.get_key_value(name).ok_or_else(|| {
            let available: Vec<&str> = self.ai_tools.keys().map(String::as_str).collect();
            anyhow!(
                "AI tool \"{name}\" not found in config\nAvailable tools: {}",
                available.join(", ")
            )
        })?;

        if tool.command.trim().is_empty() {
            bail!("AI tool \"{name}\" is missing \"command\" field");
        }
        Ok((name.as_str(), tool))
    }

    /// Suffix appended to prompts for `tool`: its own, else the global one
    #[must_use]
    pub fn prompt_suffix<'a>(&'a self, tool: &'a AiTool) -> Option<&'a str> {
        tool.result_prompt_suffix
            .as_deref()
            .or(self.result_prompt_suffix.as_deref())
            .filter(|suffix| !suffix.trim().is_empty())
    }

    /// Tool listing for programmatic discovery
    #[must_use]
    pub fn tools_info(&self) -> ToolsInfo {
        let ai_tools: Vec<ToolInfo> = self
            .ai_tools
            .iter()
            .map(|(name, tool)| ToolInfo {
                name: name.clone(),
                description: tool.description.clone().unwrap_or_else(|| name.clone()),
            })
            .collect();

        ToolsInfo {
            default_ai: self
                .default_ai
                .clone()
                .or_else(|| ai_tools.first().map(|t| t.name.clone())),
            ai_tools,
        }
    }
}
