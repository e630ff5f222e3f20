//! Compile-time build metadata for `--help` and the startup banner.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short commit hash, or "unknown" outside a git checkout.
pub const GIT_COMMIT: &str = env!("AGENTGATE_BUILD_GIT_HASH");

pub const BUILD_TIMESTAMP: &str = env!("AGENTGATE_BUILD_TIMESTAMP");

/// Trailer appended to `agentgate --help`.
pub const HELP_BUILD_METADATA: &str = concat!(
    "Build metadata:\n  commit: ",
    env!("AGENTGATE_BUILD_GIT_HASH"),
    "\n  built: ",
    env!("AGENTGATE_BUILD_TIMESTAMP")
);

/// One-line version shown in the banner.
pub fn version_summary() -> String {
    format!("v{VERSION} ({GIT_COMMIT})")
}
