//! Environment-variable overrides applied after the file is parsed.

use crate::error::ConfigError;

use super::Config;

pub const ENV_API_KEY: &str = "AGENTGATE_API_KEY";
pub const ENV_BASE_URL: &str = "AGENTGATE_BASE_URL";
pub const ENV_MODEL: &str = "AGENTGATE_MODEL";
pub const ENV_API_TIMEOUT_SECS: &str = "AGENTGATE_API_TIMEOUT_SECS";

pub(super) fn apply_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| env_lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(ENV_BASE_URL) {
        config.model.base_url = url;
    }
    if let Some(model) = non_empty(ENV_MODEL) {
        config.model.name = model;
    }
    if let Some(timeout) = non_empty(ENV_API_TIMEOUT_SECS) {
        let parsed = timeout.trim().parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid {ENV_API_TIMEOUT_SECS} value `{timeout}`: expected positive integer seconds"
            ))
        })?;
        config.model.timeout_secs = parsed.max(1);
    }

    // Key precedence: AGENTGATE_API_KEY > model.api_key > model.api_key_env.
    if let Some(key) = non_empty(ENV_API_KEY) {
        config.model.api_key = key;
    } else if config.model.api_key.trim().is_empty() {
        if let Some(var) = config.model.api_key_env.as_deref() {
            if let Some(key) = non_empty(var) {
                config.model.api_key = key;
            }
        }
    }
    Ok(())
}
