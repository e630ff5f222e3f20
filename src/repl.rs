//! Interactive shell: reads lines and routes them to commands or the agent.

use std::io;

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use tracing::debug;

use crate::agent::AgentSession;
use crate::render::{input, BannerInfo, Renderer};

/// What one input line asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Empty,
    Exit,
    ClearScreen,
    /// A `//command` line, marker included.
    Command(&'a str),
    Chat(&'a str),
}

/// Classify a trimmed input line.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Empty;
    }
    if line.starts_with("//") {
        return LineKind::Command(line);
    }
    match line.to_ascii_lowercase().as_str() {
        "exit" | "quit" | "q" => LineKind::Exit,
        "clear" => LineKind::ClearScreen,
        _ => LineKind::Chat(line),
    }
}

/// Whether the loop keeps reading after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    Continue,
    Exit,
}

pub struct InteractiveShell {
    session: AgentSession,
    renderer: Renderer,
    show_tool_output: bool,
}

impl InteractiveShell {
    pub fn new(session: AgentSession, renderer: Renderer, show_tool_output: bool) -> Self {
        Self {
            session,
            renderer,
            show_tool_output,
        }
    }

    pub fn session(&self) -> &AgentSession {
        &self.session
    }

    /// Print the banner and run until exit or end of input.
    pub async fn run(&self) -> io::Result<()> {
        self.print_banner();
        loop {
            self.renderer.prompt();
            let Some(line) = input::read_line().await? else {
                eprintln!();
                break;
            };
            if self.handle_line(&line).await == LineAction::Exit {
                break;
            }
        }
        self.renderer.notice("Goodbye!");
        Ok(())
    }

    pub async fn handle_line(&self, line: &str) -> LineAction {
        match classify_line(line) {
            LineKind::Empty => {}
            LineKind::Exit => return LineAction::Exit,
            LineKind::ClearScreen => {
                let _ = execute!(io::stderr(), Clear(ClearType::All), MoveTo(0, 0));
            }
            LineKind::Command(raw) => {
                debug!(command = raw, "dispatching command");
                let output = self.session.execute_command(raw);
                self.renderer.command_output(&output);
            }
            LineKind::Chat(message) => self.chat(message).await,
        }
        LineAction::Continue
    }

    async fn chat(&self, message: &str) {
        let renderer = self.renderer;
        let show = self.show_tool_output;
        let session_id = self.session.state().session_id.clone();
        let result = self
            .session
            .chat_with_tool_display(message, &session_id, |invocation| {
                if show {
                    renderer.tool_output(&invocation.name, &invocation.output);
                }
            })
            .await;
        match result {
            Ok(outcome) => renderer.assistant_message(&outcome.response),
            Err(err) if err.is_cancelled() => renderer.notice("Cancelled by user."),
            Err(err) => renderer.error(&err.to_string()),
        }
    }

    fn print_banner(&self) {
        let state = self.session.state();
        let confirmation = state.confirmation();
        self.renderer.banner(&BannerInfo {
            name: state.agent_name.clone(),
            provider: state.provider.clone(),
            model: state.model(),
            memory: state.memory_enabled,
            confirm_terminal: confirmation.confirm_terminal,
            confirm_tools: confirmation.confirm_tools,
            tool_count: state.tool_names.len(),
        });
    }
}
