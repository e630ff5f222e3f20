//! CLI argument parsing via clap.

use clap::Parser;
use std::path::PathBuf;

use agentgate::build_info;

/// Conversational tool-using agent with confirmation-gated shell and file tools.
#[derive(Debug, Parser)]
#[command(name = "agentgate", version, after_help = build_info::HELP_BUILD_METADATA)]
pub struct Args {
    /// Project directory the tools operate in.
    #[arg(default_value = ".")]
    pub project_dir: PathBuf,

    /// Path to config file (default: ./agentgate.toml or ~/.config/agentgate/agentgate.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Memory session id (default: session_<agent name>).
    #[arg(long = "session")]
    pub session: Option<String>,

    /// Disable conversation memory.
    #[arg(long = "no-memory")]
    pub no_memory: bool,

    /// Override model name.
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn defaults_to_current_directory() {
        let args = Args::parse_from(["agentgate"]);
        assert_eq!(args.project_dir, PathBuf::from("."));
        assert!(!args.no_memory);
        assert!(args.session.is_none());
    }

    #[test]
    fn parses_all_flags() {
        let args = Args::parse_from([
            "agentgate",
            "/work/app",
            "--config",
            "cfg.toml",
            "--session",
            "s1",
            "--no-memory",
            "-m",
            "llama3",
            "--no-color",
        ]);
        assert_eq!(args.project_dir, PathBuf::from("/work/app"));
        assert_eq!(args.config, Some(PathBuf::from("cfg.toml")));
        assert_eq!(args.session.as_deref(), Some("s1"));
        assert!(args.no_memory);
        assert_eq!(args.model.as_deref(), Some("llama3"));
        assert!(args.no_color);
    }
}
