//! agentgate: a terminal agent whose tool calls pass a human confirmation gate.
//!
//! The crate wires an OpenAI-compatible chat client, a small tool set, a
//! `//command` registry, and the batching [`gate::ConfirmationGate`] into an
//! interactive shell.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use agentgate::agent::{AgentSession, SessionOptions};
//! use agentgate::api::ApiClient;
//! use agentgate::config::load_config;
//! use agentgate::gate::TerminalPrompter;
//! use agentgate::render::Renderer;
//! use agentgate::tools::ToolRegistry;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loaded = load_config(None)?;
//! let config = loaded.config;
//! let session = AgentSession::new(
//!     &config,
//!     Arc::new(ApiClient::new(&config.model)),
//!     ToolRegistry::from_config(&config.tools, std::path::Path::new(".")),
//!     Arc::new(TerminalPrompter::new(Renderer::new(true))),
//!     SessionOptions::default(),
//! );
//! println!("{}", session.chat("Hello!", "default").await?);
//! println!("{}", session.execute_command("//status"));
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod api;
pub mod build_info;
pub mod commands;
pub mod config;
pub mod error;
pub mod gate;
pub mod render;
pub mod repl;
#[cfg(test)]
pub mod testsupport;
pub mod textutil;
pub mod tools;
pub mod types;
