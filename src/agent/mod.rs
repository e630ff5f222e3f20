//! Core agentic loop and the session built around it.
//!
//! The [`Agent`] sends one user message to the model, runs the tool calls
//! the model asks for, re-submits the results, and loops until the model
//! produces a final text reply (or the iteration cap is reached). Tool calls
//! of one model step run concurrently and each one passes the [`ToolGate`]
//! before it touches anything.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::api::ModelClient;
use crate::error::{AgentError, ConfirmationDenied};
use crate::gate::{ToolGate, ToolInput, ToolStart};
use crate::tools::ToolRegistry;
use crate::types::{ChatRequest, Message, ToolCall};

mod commands;
pub mod memory;
mod session;

pub use memory::{ConversationMemory, Exchange};
pub use session::{AgentSession, ChatOutcome, SessionOptions, SessionState};

/// One completed tool call as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub name: String,
    /// Resolved input (the command for shell tools, otherwise the arguments).
    pub input: String,
    pub output: String,
}

/// Per-turn inputs that can change between turns.
#[derive(Debug, Clone)]
pub struct TurnInput<'a> {
    pub model: &'a str,
    pub system_prompt: &'a str,
    pub message: &'a str,
}

/// Result of one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub response: String,
    pub tool_invocations: Vec<ToolInvocation>,
}

/// Stateless turn runner; conversation state lives in the session.
pub struct Agent {
    client: Arc<dyn ModelClient>,
    tools: Arc<ToolRegistry>,
    gate: Arc<dyn ToolGate>,
    temperature: Option<f64>,
    max_iterations: usize,
}

impl Agent {
    pub fn new(
        client: Arc<dyn ModelClient>,
        tools: ToolRegistry,
        gate: Arc<dyn ToolGate>,
        max_iterations: usize,
    ) -> Self {
        Self {
            client,
            tools: Arc::new(tools),
            gate,
            temperature: None,
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one user turn to completion.
    ///
    /// `on_tool` is called once per completed tool call, in completion order.
    /// A denied confirmation aborts the turn with [`AgentError::Cancelled`];
    /// the gate's turn-end hook fires on every exit path.
    pub async fn run_turn<F>(
        &self,
        input: TurnInput<'_>,
        mut on_tool: F,
    ) -> Result<TurnOutcome, AgentError>
    where
        F: FnMut(&ToolInvocation),
    {
        let _turn_end = TurnEndGuard(self.gate.as_ref());

        let mut messages = Vec::new();
        if !input.system_prompt.trim().is_empty() {
            messages.push(Message::system(input.system_prompt));
        }
        messages.push(Message::user(input.message));

        let tool_defs = (!self.tools.is_empty()).then(|| self.tools.definitions());
        let mut invocations = Vec::new();

        for iteration in 1..=self.max_iterations {
            let request = ChatRequest {
                model: input.model.to_string(),
                messages: messages.clone(),
                tools: tool_defs.clone(),
                temperature: self.temperature,
                max_tokens: None,
            };
            debug!(iteration, model = %request.model, "calling model");
            let response = self.client.chat(&request).await?;
            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or(AgentError::EmptyResponse)?;
            let assistant = choice.message;

            let calls = assistant.requested_calls().to_vec();
            if calls.is_empty() {
                return Ok(TurnOutcome {
                    response: assistant.content.unwrap_or_default(),
                    tool_invocations: invocations,
                });
            }

            messages.push(assistant);
            let results = self.run_tool_round(calls, &mut on_tool).await;
            // Next round must prompt afresh.
            self.gate.on_turn_end();
            let results = results?;

            for done in results {
                messages.push(Message::tool_result(&done.call_id, &done.name, &done.output));
                invocations.push(ToolInvocation {
                    name: done.name,
                    input: done.input,
                    output: done.output,
                });
            }
        }

        warn!(max = self.max_iterations, "agent loop hit the iteration cap");
        Err(AgentError::MaxIterationsReached)
    }

    /// Run every call of one model step concurrently.
    ///
    /// Results come back in call order. The first denial aborts the
    /// remaining tasks and fails the round.
    async fn run_tool_round<F>(
        &self,
        calls: Vec<ToolCall>,
        on_tool: &mut F,
    ) -> Result<Vec<CompletedCall>, ConfirmationDenied>
    where
        F: FnMut(&ToolInvocation),
    {
        info!(count = calls.len(), "running tool round");
        let mut set = JoinSet::new();
        let mut task_calls = HashMap::new();

        for (index, call) in calls.into_iter().enumerate() {
            let gate = Arc::clone(&self.gate);
            let tools = Arc::clone(&self.tools);
            let identity = (index, call.id.clone(), call.function.name.clone());
            let handle = set.spawn(async move {
                let input = tool_input(&call.function.arguments);
                let shown = input.resolve();
                gate.on_tool_start(&ToolStart::new(call.function.name.clone(), input))
                    .await?;
                let output = match tools
                    .execute(&call.function.name, &call.function.arguments)
                    .await
                {
                    Ok(output) => output,
                    Err(err) => format!("Tool error: {err}"),
                };
                Ok::<_, ConfirmationDenied>(CompletedCall {
                    index,
                    call_id: call.id,
                    name: call.function.name,
                    input: shown,
                    output,
                })
            });
            task_calls.insert(handle.id(), identity);
        }

        let mut completed = Vec::new();
        let mut denied = None;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Ok(done)) => {
                    on_tool(&ToolInvocation {
                        name: done.name.clone(),
                        input: done.input.clone(),
                        output: done.output.clone(),
                    });
                    completed.push(done);
                }
                Ok(Err(denial)) => {
                    if denied.is_none() {
                        info!("tool batch denied; aborting remaining calls");
                        set.abort_all();
                    }
                    denied = Some(denial);
                }
                Err(err) if err.is_cancelled() => {}
                Err(err) => {
                    let (index, call_id, name) = task_calls
                        .remove(&err.id())
                        .unwrap_or((usize::MAX, String::new(), String::from("unknown")));
                    warn!(tool = %name, error = %err, "tool task panicked");
                    completed.push(CompletedCall {
                        index,
                        call_id,
                        name,
                        input: String::new(),
                        output: format!("Tool error: {err}"),
                    });
                }
            }
        }

        if let Some(denial) = denied {
            return Err(denial);
        }
        completed.sort_by_key(|done| done.index);
        Ok(completed)
    }
}

#[derive(Debug)]
struct CompletedCall {
    index: usize,
    call_id: String,
    name: String,
    input: String,
    output: String,
}

/// Model arguments as gate input: structured when they parse as JSON.
fn tool_input(arguments: &str) -> ToolInput {
    match serde_json::from_str::<Value>(arguments) {
        Ok(value) => ToolInput::Structured(value),
        Err(_) => ToolInput::Text(arguments.to_string()),
    }
}

/// Fires `on_turn_end` when the turn future finishes or is dropped.
struct TurnEndGuard<'a>(&'a dyn ToolGate);

impl Drop for TurnEndGuard<'_> {
    fn drop(&mut self) {
        self.0.on_turn_end();
    }
}
