//! Configuration data model.
//!
//! Every section deserializes with `#[serde(default)]`, so a partial file (or
//! an empty one) yields a complete `Config`.

use serde::{Deserialize, Serialize};

use super::defaults::{
    default_safe_commands, DEFAULT_AGENT_NAME, DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS,
    DEFAULT_BATCH_WINDOW_MS, DEFAULT_MAX_ITERATIONS, DEFAULT_MEMORY_MAX_MESSAGES,
    DEFAULT_MODEL_NAME, DEFAULT_PROVIDER, DEFAULT_SHELL_TIMEOUT_SECS, DEFAULT_SYSTEM_PROMPT,
    DEFAULT_TEMPERATURE,
};
use crate::error::ConfigError;

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub model: ModelConfig,
    pub tools: ToolsConfig,
    pub memory: MemoryConfig,
    pub display: DisplayConfig,
    pub confirmation: ConfirmationConfig,
}

impl Config {
    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.name.trim().is_empty() {
            return Err(ConfigError::Invalid("model.name cannot be empty".into()));
        }
        if self.model.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("model.base_url cannot be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::Invalid(format!(
                "model.temperature must be within 0.0..=2.0, got {}",
                self.model.temperature
            )));
        }
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "agent.max_iterations must be at least 1".into(),
            ));
        }
        if self.memory.max_messages == 0 {
            return Err(ConfigError::Invalid(
                "memory.max_messages must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    /// Display name used in banners and status output.
    pub name: String,
    pub system_prompt: String,
    /// Cap on model round-trips per user turn.
    pub max_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_AGENT_NAME.into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Free-form provider label shown in status output.
    pub provider: String,
    pub name: String,
    /// OpenAI-compatible base URL (no trailing `/chat/completions`).
    pub base_url: String,
    pub api_key: String,
    /// Env var to read the key from when `api_key` is empty.
    pub api_key_env: Option<String>,
    pub temperature: f64,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.into(),
            name: DEFAULT_MODEL_NAME.into(),
            base_url: DEFAULT_API_BASE_URL.into(),
            api_key: String::new(),
            api_key_env: None,
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsConfig {
    pub shell_enabled: bool,
    pub files_enabled: bool,
    pub shell_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            shell_enabled: true,
            files_enabled: true,
            shell_timeout_secs: DEFAULT_SHELL_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct MemoryConfig {
    pub enabled: bool,
    /// Exchanges kept per session before the oldest are dropped.
    pub max_messages: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_messages: DEFAULT_MEMORY_MAX_MESSAGES,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
    /// Draw a box with each tool's output as it completes.
    pub show_tool_output: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_tool_output: true,
        }
    }
}

/// `[confirmation]`: what needs a human yes/no before it runs.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfirmationConfig {
    pub confirm_terminal: bool,
    pub confirm_tools: bool,
    pub whitelist_enabled: bool,
    pub safe_commands: Vec<String>,
    pub batch_window_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            confirm_terminal: false,
            confirm_tools: false,
            whitelist_enabled: true,
            safe_commands: default_safe_commands(),
            batch_window_ms: DEFAULT_BATCH_WINDOW_MS,
        }
    }
}
