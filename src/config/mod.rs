//! Configuration loading from TOML files and environment variables.
//!
//! Precedence (highest wins):
//! 1. Environment variables (`AGENTGATE_API_KEY`, `AGENTGATE_BASE_URL`,
//!    `AGENTGATE_MODEL`, `AGENTGATE_API_TIMEOUT_SECS`)
//! 2. TOML file given with `--config`
//! 3. `./agentgate.toml`
//! 4. `$XDG_CONFIG_HOME/agentgate/agentgate.toml` (or `~/.config/...`)
//! 5. Built-in defaults
//!
//! Commands that change settings write back to the file the config was
//! loaded from (see [`LoadedConfig::persist_path`]).

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

mod defaults;
mod env;
mod persist;
mod sources;
mod types;

pub use defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
pub use env::{ENV_API_KEY, ENV_API_TIMEOUT_SECS, ENV_BASE_URL, ENV_MODEL};
pub use persist::{persist_confirmation, persist_model_name, persist_system_prompt};
pub use sources::ConfigSource;
pub use types::{
    AgentConfig, Config, ConfirmationConfig, DisplayConfig, MemoryConfig, ModelConfig,
    ToolsConfig,
};

/// A parsed config plus where it was read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

impl LoadedConfig {
    /// File that receives persisted changes: the loaded file, or the global
    /// default location when the config came from built-in defaults.
    pub fn persist_path(&self) -> PathBuf {
        self.source
            .path()
            .map(Path::to_path_buf)
            .or_else(default_global_config_path)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }
}

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from `--config`).
pub fn load_config(path_override: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&Path>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (text, source) =
        sources::read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&text)?;
    env::apply_env_overrides(&mut config, &env_lookup)?;
    config.validate()?;
    tracing::debug!(source = %source.describe(), model = %config.model.name, "loaded config");
    Ok(LoadedConfig { config, source })
}

/// `$XDG_CONFIG_HOME/agentgate/agentgate.toml`, if a config root is known.
pub fn default_global_config_path() -> Option<PathBuf> {
    sources::global_config_path_with(&config_root_dir)
}

/// `$XDG_CONFIG_HOME`, falling back to `~/.config`.
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
}
