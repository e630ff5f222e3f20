//! Shared test fixtures for unit-test modules.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::api::ModelClient;
use crate::error::ApiError;
use crate::gate::{ConfirmationPrompter, PendingToolRequest, PromptFeedback};
use crate::types::{ChatRequest, ChatResponse, Choice, FunctionCall, Message, Role, ToolCall};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!("agentgate-{prefix}-{millis}-{suffix}"));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write UTF-8 text to a child path, creating parent directories as needed.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

// ---------------------------------------------------------------------------
// Confirmation prompter
// ---------------------------------------------------------------------------

/// Prompter that replays queued answers and records what it was shown.
///
/// When the queue runs dry it reports end of input, unless built with
/// [`ScriptedPrompter::pending`], in which case reads never complete.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    batches: Mutex<Vec<Vec<PendingToolRequest>>>,
    feedback: Mutex<Vec<PromptFeedback>>,
    hang: bool,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn pending() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn batches(&self) -> Vec<Vec<PendingToolRequest>> {
        self.batches.lock().expect("lock").clone()
    }

    pub fn feedback(&self) -> Vec<PromptFeedback> {
        self.feedback.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ConfirmationPrompter for ScriptedPrompter {
    fn render_batch(&self, batch: &[PendingToolRequest]) {
        self.batches.lock().expect("lock").push(batch.to_vec());
    }

    async fn read_answer(&self) -> io::Result<Option<String>> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(self.answers.lock().expect("lock").pop_front())
    }

    fn acknowledge(&self, feedback: PromptFeedback) {
        self.feedback.lock().expect("lock").push(feedback);
    }
}

// ---------------------------------------------------------------------------
// Model client
// ---------------------------------------------------------------------------

/// Model client that replays queued responses and records each request.
#[derive(Debug, Default)]
pub struct MockModelClient {
    responses: Mutex<VecDeque<ChatResponse>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockModelClient {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.requests.lock().expect("lock").push(request.clone());
        self.responses
            .lock()
            .expect("lock")
            .pop_front()
            .ok_or_else(|| ApiError::InvalidResponse("no mock response queued".to_string()))
    }
}

/// A final assistant answer.
pub fn text_response(text: &str) -> ChatResponse {
    response_with(Message::assistant(text))
}

/// An assistant step requesting the given `(id, tool, json-arguments)` calls.
pub fn tool_call_response(calls: &[(&str, &str, &str)]) -> ChatResponse {
    let tool_calls = calls
        .iter()
        .map(|(id, name, arguments)| ToolCall {
            id: id.to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        })
        .collect();
    response_with(Message {
        role: Role::Assistant,
        content: None,
        tool_calls: Some(tool_calls),
        tool_call_id: None,
        name: None,
    })
}

fn response_with(message: Message) -> ChatResponse {
    ChatResponse {
        id: "mock".to_string(),
        choices: vec![Choice {
            index: 0,
            message,
            finish_reason: Some("stop".to_string()),
        }],
        usage: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_fixture_writes_and_resolves_paths() {
        let fixture = TestTempDir::new("fixture");
        let file = fixture.write_text("nested/file.txt", "hello");
        assert_eq!(fs::read_to_string(file).unwrap(), "hello");
    }

    #[tokio::test]
    async fn scripted_prompter_reports_end_of_input_when_drained() {
        let prompter = ScriptedPrompter::new(&["yes"]);
        assert_eq!(prompter.read_answer().await.unwrap().as_deref(), Some("yes"));
        assert_eq!(prompter.read_answer().await.unwrap(), None);
    }
}
