//! Interaction seam between the gate and the human answering it.

use async_trait::async_trait;
use std::io::{self, Write};

use super::PendingToolRequest;
use crate::render::{input, Renderer};

pub const ANSWER_PROMPT: &str = "Execute ALL these tools? (yes/no): ";

/// What the prompter should tell the user after reading an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptFeedback {
    /// Answer was not one of yes/y/no/n; the prompt will repeat.
    Invalid,
    Approved,
    Denied,
}

/// Presents a batch and collects one-line answers.
#[async_trait]
pub trait ConfirmationPrompter: Send + Sync {
    /// Show every request in the batch that needs a decision.
    fn render_batch(&self, batch: &[PendingToolRequest]);

    /// Ask for an answer and read one line. `Ok(None)` means end of input.
    async fn read_answer(&self) -> io::Result<Option<String>>;

    fn acknowledge(&self, feedback: PromptFeedback);
}

/// `Some(true)` for yes/y, `Some(false)` for no/n, `None` otherwise.
pub fn parse_answer(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

/// Reads answers from stdin and draws the batch on stderr.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompter {
    renderer: Renderer,
}

impl TerminalPrompter {
    pub fn new(renderer: Renderer) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl ConfirmationPrompter for TerminalPrompter {
    fn render_batch(&self, batch: &[PendingToolRequest]) {
        self.renderer.confirmation_request(batch);
    }

    async fn read_answer(&self) -> io::Result<Option<String>> {
        self.renderer.confirmation_prompt(ANSWER_PROMPT);
        let mut stderr = io::stderr();
        stderr.flush()?;

        input::read_line().await
    }

    fn acknowledge(&self, feedback: PromptFeedback) {
        self.renderer.confirmation_feedback(feedback);
    }
}
