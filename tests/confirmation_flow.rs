//! End-to-end confirmation behavior through `AgentSession` with a scripted
//! model and a scripted human.

use agentgate::agent::{AgentSession, SessionOptions};
use agentgate::api::ModelClient;
use agentgate::config::Config;
use agentgate::error::{ApiError, ToolError};
use agentgate::gate::{ConfirmationPrompter, PendingToolRequest, PromptFeedback, ToolCategory};
use agentgate::tools::{Tool, ToolRegistry};
use agentgate::types::{
    ChatRequest, ChatResponse, Choice, FunctionCall, Message, Role, ToolCall, ToolDefinition,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct ScriptedModel {
    responses: Mutex<VecDeque<ChatResponse>>,
}

impl ScriptedModel {
    fn new(responses: Vec<ChatResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::InvalidResponse("script exhausted".into()))
    }
}

#[derive(Default)]
struct ScriptedHuman {
    answers: Mutex<VecDeque<String>>,
    shown: Mutex<Vec<Vec<PendingToolRequest>>>,
    feedback: Mutex<Vec<PromptFeedback>>,
}

impl ScriptedHuman {
    fn answering(answers: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            ..Self::default()
        })
    }

    fn shown(&self) -> Vec<Vec<PendingToolRequest>> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfirmationPrompter for ScriptedHuman {
    fn render_batch(&self, batch: &[PendingToolRequest]) {
        self.shown.lock().unwrap().push(batch.to_vec());
    }

    async fn read_answer(&self) -> io::Result<Option<String>> {
        Ok(self.answers.lock().unwrap().pop_front())
    }

    fn acknowledge(&self, feedback: PromptFeedback) {
        self.feedback.lock().unwrap().push(feedback);
    }
}

/// Records commands instead of running them.
struct RecordingTool {
    name: &'static str,
    runs: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &'static str {
        self.name
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(self.name, "test tool", serde_json::json!({"type": "object"}))
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        self.runs.lock().unwrap().push(format!("{}:{arguments}", self.name));
        Ok("ok".to_string())
    }
}

fn tool_step(calls: &[(&str, &str, &str)]) -> ChatResponse {
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
    reply(Message {
        role: Role::Assistant,
        content: None,
        tool_calls: Some(tool_calls),
        tool_call_id: None,
        name: None,
    })
}

fn final_text(text: &str) -> ChatResponse {
    reply(Message::assistant(text))
}

fn reply(message: Message) -> ChatResponse {
    ChatResponse {
        id: "scripted".to_string(),
        choices: vec![Choice {
            index: 0,
            message,
            finish_reason: None,
        }],
        usage: None,
    }
}

struct Harness {
    session: AgentSession,
    human: Arc<ScriptedHuman>,
    runs: Arc<Mutex<Vec<String>>>,
}

fn harness(config: Config, script: Vec<ChatResponse>, answers: &[&str]) -> Harness {
    let runs = Arc::new(Mutex::new(Vec::new()));
    let mut tools = ToolRegistry::new();
    tools.register(RecordingTool {
        name: "run_shell",
        runs: Arc::clone(&runs),
    });
    tools.register(RecordingTool {
        name: "write_file",
        runs: Arc::clone(&runs),
    });
    let human = ScriptedHuman::answering(answers);
    let session = AgentSession::new(
        &config,
        ScriptedModel::new(script),
        tools,
        human.clone(),
        SessionOptions::default(),
    );
    Harness {
        session,
        human,
        runs,
    }
}

fn config(confirm_terminal: bool, confirm_tools: bool, safe: &[&str], whitelist: bool) -> Config {
    let mut config = Config::default();
    config.confirmation.confirm_terminal = confirm_terminal;
    config.confirmation.confirm_tools = confirm_tools;
    config.confirmation.whitelist_enabled = whitelist;
    config.confirmation.safe_commands = safe.iter().map(|s| s.to_string()).collect();
    config.confirmation.batch_window_ms = 50;
    config.memory.enabled = false;
    config
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generic_tool_runs_without_prompt_when_only_terminal_is_gated() {
    let h = harness(
        config(true, false, &[], false),
        vec![
            tool_step(&[("c1", "write_file", r#"{"path":"a.txt"}"#)]),
            final_text("written"),
        ],
        &[],
    );
    let outcome = h
        .session
        .chat_with_tool_display("write it", "t", |_| {})
        .await
        .unwrap();
    assert_eq!(outcome.response, "written");
    assert_eq!(outcome.tool_invocations.len(), 1);
    assert!(h.human.shown().is_empty());
}

#[tokio::test]
async fn denied_shell_call_cancels_and_never_runs() {
    let h = harness(
        config(true, false, &[], false),
        vec![
            tool_step(&[("c1", "run_shell", r#"{"command":"rm -rf /tmp/x"}"#)]),
            final_text("unreachable"),
        ],
        &["no"],
    );
    let err = h.session.chat("clean tmp", "t").await.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.to_string(), "cancelled: User cancelled tool execution");

    let shown = h.human.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].len(), 1);
    assert_eq!(shown[0][0].payload, "rm -rf /tmp/x");
    assert_eq!(shown[0][0].category, ToolCategory::Shell);
    assert!(h.runs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn simultaneous_shell_calls_share_one_prompt() {
    let h = harness(
        config(true, false, &[], false),
        vec![
            tool_step(&[
                ("c1", "run_shell", r#"{"command":"ls"}"#),
                ("c2", "run_shell", r#"{"command":"pwd"}"#),
            ]),
            final_text("listed"),
        ],
        &["yes"],
    );
    let mut completed = Vec::new();
    let outcome = h
        .session
        .chat_with_tool_display("look around", "t", |inv| completed.push(inv.input.clone()))
        .await
        .unwrap();
    assert_eq!(outcome.response, "listed");

    let shown = h.human.shown();
    assert_eq!(shown.len(), 1);
    let mut payloads: Vec<_> = shown[0].iter().map(|r| r.payload.as_str()).collect();
    payloads.sort();
    assert_eq!(payloads, vec!["ls", "pwd"]);

    completed.sort();
    assert_eq!(completed, vec!["ls", "pwd"]);
    assert_eq!(h.runs.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn whitelist_prefix_rules_decide_who_prompts() {
    let h = harness(
        config(true, false, &["pwd"], true),
        vec![
            tool_step(&[
                ("c1", "run_shell", r#"{"command":"pwd"}"#),
                ("c2", "run_shell", r#"{"command":"pwd -P"}"#),
            ]),
            tool_step(&[("c3", "run_shell", r#"{"command":"rm pwd.txt"}"#)]),
            final_text("done"),
        ],
        &["yes"],
    );
    let outcome = h.session.chat("check", "t").await.unwrap();
    assert_eq!(outcome, "done");

    let shown = h.human.shown();
    assert_eq!(shown.len(), 1, "only the rm call prompts");
    assert_eq!(shown[0][0].payload, "rm pwd.txt");
    assert_eq!(h.runs.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn each_tool_round_gets_a_fresh_batch() {
    let h = harness(
        config(false, true, &[], false),
        vec![
            tool_step(&[("c1", "write_file", r#"{"path":"a"}"#)]),
            tool_step(&[("c2", "write_file", r#"{"path":"b"}"#)]),
            final_text("both"),
        ],
        &["yes", "y"],
    );
    assert_eq!(h.session.chat("two writes", "t").await.unwrap(), "both");
    assert_eq!(h.human.shown().len(), 2);
    assert_eq!(
        h.human.feedback.lock().unwrap().clone(),
        vec![PromptFeedback::Approved, PromptFeedback::Approved]
    );
}

#[tokio::test]
async fn a_denied_turn_does_not_poison_the_next_turn() {
    let h = harness(
        config(true, false, &[], false),
        vec![
            tool_step(&[("c1", "run_shell", r#"{"command":"make clean"}"#)]),
            tool_step(&[("c2", "run_shell", r#"{"command":"make"}"#)]),
            final_text("built"),
        ],
        &["n", "yes"],
    );
    assert!(h.session.chat("clean", "t").await.unwrap_err().is_cancelled());
    let snapshot = h.session.gate().batch_snapshot();
    assert!(snapshot.pending.is_empty());
    assert!(!snapshot.prompt_in_progress);

    assert_eq!(h.session.chat("build", "t").await.unwrap(), "built");
    assert_eq!(h.runs.lock().unwrap().clone(), vec![r#"run_shell:{"command":"make"}"#]);
}

#[tokio::test]
async fn toggling_confirmation_by_command_applies_to_next_turn() {
    let h = harness(
        config(false, false, &[], false),
        vec![
            tool_step(&[("c1", "run_shell", r#"{"command":"whoami"}"#)]),
            final_text("unreachable"),
        ],
        &["no"],
    );
    assert_eq!(
        h.session.execute_command("//confirm terminal on"),
        "✓ Terminal confirmation ON"
    );
    assert!(h.session.chat("who", "t").await.unwrap_err().is_cancelled());
    assert_eq!(h.human.shown().len(), 1);
}
