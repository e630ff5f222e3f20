//! Classification, payload extraction, and whitelist rules for tool requests.
//!
//! Everything here is pure so the gate's concurrency logic can stay small.

use serde_json::Value;
use std::fmt;
use std::time::Duration;

use crate::config::ConfirmationConfig;

/// Tool-name fragments that mark a tool as able to run arbitrary commands.
const SHELL_KEYWORDS: &[&str] = &[
    "shell",
    "terminal",
    "command",
    "powershell",
    "bash",
    "cmd",
    "run_",
    "execute",
    "system",
    "python_info",
    "get_system",
    "get_python",
    "install",
    "pip",
    "npm",
    "git",
];

/// How strictly a tool request is gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    /// Runs system/terminal commands.
    Shell,
    /// Anything else (file writes, fetches, calculators, ...).
    Generic,
}

impl ToolCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Shell => "Terminal",
            Self::Generic => "Tool",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a tool by case-insensitive keyword containment in its name.
pub fn classify_tool(tool_name: &str) -> ToolCategory {
    let lowered = tool_name.to_ascii_lowercase();
    if SHELL_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        ToolCategory::Shell
    } else {
        ToolCategory::Generic
    }
}

/// Raw input attached to a tool-start event.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInput {
    /// Plain text; may itself be a JSON-encoded object.
    Text(String),
    /// Already-decoded key/value payload.
    Structured(Value),
}

impl ToolInput {
    /// The human-meaningful part of the input: the `command` field of an
    /// object payload when present, the raw input otherwise.
    pub fn resolve(&self) -> String {
        match self {
            Self::Structured(value) => {
                command_field(value).unwrap_or_else(|| match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
            }
            Self::Text(text) => {
                if text.trim_start().starts_with('{') {
                    if let Ok(value) = serde_json::from_str::<Value>(text) {
                        if let Some(command) = command_field(&value) {
                            return command;
                        }
                    }
                }
                text.clone()
            }
        }
    }
}

impl From<&str> for ToolInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ToolInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for ToolInput {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

fn command_field(value: &Value) -> Option<String> {
    match value.as_object()?.get("command")? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Command prefixes exempt from confirmation for shell-like tools.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WhitelistConfig {
    pub enabled: bool,
    pub entries: Vec<String>,
}

impl WhitelistConfig {
    pub fn new(enabled: bool, entries: Vec<String>) -> Self {
        Self { enabled, entries }
    }

    /// True when the command's first token equals an entry, or the whole
    /// command starts with one. Case-insensitive; blank entries never match.
    pub fn matches(&self, command: &str) -> bool {
        let trimmed = command.trim();
        let Some(first) = trimmed.split_whitespace().next() else {
            return false;
        };
        let first = first.to_lowercase();
        let lowered = trimmed.to_lowercase();
        self.entries
            .iter()
            .map(|entry| entry.trim().to_lowercase())
            .filter(|entry| !entry.is_empty())
            .any(|entry| first == entry || lowered.starts_with(&entry))
    }

    /// Add an entry; returns false for blanks and case-insensitive duplicates.
    pub fn add(&mut self, entry: &str) -> bool {
        let entry = entry.trim();
        if entry.is_empty() || self.contains(entry) {
            return false;
        }
        self.entries.push(entry.to_string());
        true
    }

    /// Remove an entry (case-insensitive); returns false if absent.
    pub fn remove(&mut self, entry: &str) -> bool {
        let before = self.entries.len();
        let needle = entry.trim();
        self.entries.retain(|e| !e.eq_ignore_ascii_case(needle));
        self.entries.len() != before
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.eq_ignore_ascii_case(entry.trim()))
    }
}

/// Live toggles the gate evaluates on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationSettings {
    pub confirm_terminal: bool,
    pub confirm_tools: bool,
    pub whitelist: WhitelistConfig,
    /// Grace period the opener waits for sibling requests before prompting.
    pub batch_window: Duration,
}

impl ConfirmationSettings {
    pub fn from_config(config: &ConfirmationConfig) -> Self {
        Self {
            confirm_terminal: config.confirm_terminal,
            confirm_tools: config.confirm_tools,
            whitelist: WhitelistConfig::new(
                config.whitelist_enabled,
                config.safe_commands.clone(),
            ),
            batch_window: Duration::from_millis(config.batch_window_ms),
        }
    }

    /// Whether a request of `category` must be confirmed (whitelist aside).
    pub fn needs_confirmation(&self, category: ToolCategory) -> bool {
        match category {
            ToolCategory::Shell => self.confirm_terminal,
            ToolCategory::Generic => self.confirm_tools,
        }
    }

    /// Whether a shell request is exempt through the whitelist.
    pub fn is_whitelisted(&self, category: ToolCategory, command: &str) -> bool {
        category == ToolCategory::Shell && self.whitelist.enabled && self.whitelist.matches(command)
    }
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self::from_config(&ConfirmationConfig::default())
    }
}
