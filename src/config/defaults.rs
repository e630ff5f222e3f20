//! Built-in configuration defaults.

pub(super) const DEFAULT_AGENT_NAME: &str = "agent";
pub(super) const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub(super) const DEFAULT_MAX_ITERATIONS: usize = 20;

pub(super) const DEFAULT_PROVIDER: &str = "openai";
pub(super) const DEFAULT_MODEL_NAME: &str = "gpt-4o-mini";
pub(super) const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub(super) const DEFAULT_TEMPERATURE: f64 = 0.7;
pub(super) const DEFAULT_API_TIMEOUT_SECS: u64 = 120;

pub(super) const DEFAULT_SHELL_TIMEOUT_SECS: u64 = 120;
pub(super) const DEFAULT_MEMORY_MAX_MESSAGES: usize = 20;
pub(super) const DEFAULT_BATCH_WINDOW_MS: u64 = 200;

/// Config file name looked up locally and under the global config root.
pub const CONFIG_FILE_NAME: &str = "agentgate.toml";
/// Directory under `$XDG_CONFIG_HOME` holding the global config file.
pub const CONFIG_DIR_NAME: &str = "agentgate";

/// Commands that skip confirmation when the whitelist is enabled.
pub(super) fn default_safe_commands() -> Vec<String> {
    [
        "date",
        "Get-Date",
        "time",
        "pwd",
        "Get-Location",
        "ls",
        "dir",
        "Get-ChildItem",
        "whoami",
        "hostname",
        "echo",
        "Write-Output",
        "cat",
        "Get-Content",
        "env",
        "Get-Variable",
        "python --version",
        "node --version",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
