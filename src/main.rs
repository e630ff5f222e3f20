//! CLI entry point for agentgate.

mod cli;

use std::sync::Arc;

use agentgate::agent::{AgentSession, SessionOptions};
use agentgate::api::ApiClient;
use agentgate::config::load_config;
use agentgate::gate::TerminalPrompter;
use agentgate::render::Renderer;
use agentgate::repl::InteractiveShell;
use agentgate::tools::ToolRegistry;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Env var holding the tracing filter (e.g. `agentgate=debug`).
const LOG_ENV: &str = "AGENTGATE_LOG";

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_tracing();

    let project_dir = match args.project_dir.canonicalize() {
        Ok(path) if path.is_dir() => path,
        Ok(_) => {
            eprintln!("error: not a directory: {}", args.project_dir.display());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!(
                "error: directory does not exist: {} ({e})",
                args.project_dir.display()
            );
            std::process::exit(1);
        }
    };

    let loaded = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    let config_path = loaded.persist_path();
    let mut config = loaded.config;

    // CLI overrides.
    if let Some(model) = &args.model {
        config.model.name = model.clone();
    }
    if args.no_memory {
        config.memory.enabled = false;
    }
    if args.no_color {
        config.display.color = false;
    }

    let renderer = Renderer::new(config.display.color);
    if config.model.api_key.trim().is_empty() {
        renderer.warn("no API key configured; set AGENTGATE_API_KEY or [model].api_key");
    }

    let client = ApiClient::new(&config.model);
    let tools = ToolRegistry::from_config(&config.tools, &project_dir);
    let session_id = args
        .session
        .clone()
        .unwrap_or_else(|| format!("session_{}", config.agent.name));

    let session = AgentSession::new(
        &config,
        Arc::new(client),
        tools,
        Arc::new(TerminalPrompter::new(renderer)),
        SessionOptions {
            session_id,
            config_path: Some(config_path),
        },
    );
    let shell = InteractiveShell::new(session, renderer, config.display.show_tool_output);
    if let Err(e) = shell.run().await {
        renderer.error(&format!("input error: {e}"));
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
