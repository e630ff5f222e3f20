//! `AgentSession`: the agent loop plus the state `//commands` read and change.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, info};

use super::commands;
use super::memory::ConversationMemory;
use super::{Agent, ToolInvocation, TurnInput};
use crate::api::ModelClient;
use crate::commands::{ArgValue, CommandRegistry};
use crate::config::{Config, ConfirmationConfig};
use crate::error::AgentError;
use crate::gate::{ConfirmationGate, ConfirmationPrompter, ConfirmationSettings};
use crate::tools::ToolRegistry;

/// Final reply plus every tool call that completed during the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    pub response: String,
    pub tool_invocations: Vec<ToolInvocation>,
}

/// Construction options that do not come from the config file.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Default memory session used by the interactive shell.
    pub session_id: String,
    /// File that receives persisted settings; `None` keeps changes in memory.
    pub config_path: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            session_id: "default".to_string(),
            config_path: None,
        }
    }
}

/// State shared between the session and its command handlers.
pub struct SessionState {
    pub agent_name: String,
    pub provider: String,
    pub base_url: String,
    pub temperature: f64,
    pub session_id: String,
    pub config_path: Option<PathBuf>,
    pub tool_names: Vec<&'static str>,
    pub memory_enabled: bool,
    pub gate: Arc<ConfirmationGate>,
    model: RwLock<String>,
    system_prompt: RwLock<String>,
    memory: Mutex<ConversationMemory>,
    confirmation: Mutex<ConfirmationConfig>,
}

impl SessionState {
    pub fn model(&self) -> String {
        self.model.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_model(&self, name: &str) {
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = name.to_string();
    }

    pub fn system_prompt(&self) -> String {
        self.system_prompt
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_system_prompt(&self, prompt: &str) {
        *self
            .system_prompt
            .write()
            .unwrap_or_else(PoisonError::into_inner) = prompt.to_string();
    }

    pub fn memory(&self) -> MutexGuard<'_, ConversationMemory> {
        self.memory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Confirmation config as last persisted (a copy).
    pub fn confirmation(&self) -> ConfirmationConfig {
        self.confirmation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply `f` to the confirmation config, persist it, and push the result
    /// to the live gate. Nothing changes when persisting fails.
    pub fn update_confirmation<R>(
        &self,
        f: impl FnOnce(&mut ConfirmationConfig) -> R,
    ) -> Result<R, crate::error::ConfigError> {
        let mut current = self
            .confirmation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut next = current.clone();
        let out = f(&mut next);
        if let Some(path) = &self.config_path {
            crate::config::persist_confirmation(path, &next)?;
        }
        let settings = ConfirmationSettings::from_config(&next);
        self.gate.update_settings(|live| *live = settings);
        *current = next;
        debug!("confirmation settings updated");
        Ok(out)
    }
}

/// A configured agent with memory, commands, and a confirmation gate.
pub struct AgentSession {
    state: Arc<SessionState>,
    agent: Agent,
    commands: CommandRegistry,
}

impl AgentSession {
    pub fn new(
        config: &Config,
        client: Arc<dyn ModelClient>,
        tools: ToolRegistry,
        prompter: Arc<dyn ConfirmationPrompter>,
        options: SessionOptions,
    ) -> Self {
        let gate = Arc::new(ConfirmationGate::new(
            ConfirmationSettings::from_config(&config.confirmation),
            prompter,
        ));
        let state = Arc::new(SessionState {
            agent_name: config.agent.name.clone(),
            provider: config.model.provider.clone(),
            base_url: config.model.base_url.clone(),
            temperature: config.model.temperature,
            session_id: options.session_id,
            config_path: options.config_path,
            tool_names: tools.names(),
            memory_enabled: config.memory.enabled,
            gate: Arc::clone(&gate),
            model: RwLock::new(config.model.name.clone()),
            system_prompt: RwLock::new(config.agent.system_prompt.clone()),
            memory: Mutex::new(ConversationMemory::new(config.memory.max_messages)),
            confirmation: Mutex::new(config.confirmation.clone()),
        });
        let agent = Agent::new(client, tools, gate, config.agent.max_iterations)
            .with_temperature(config.model.temperature);
        let commands = commands::session_registry(&state);
        info!(
            agent = %state.agent_name,
            tools = state.tool_names.len(),
            commands = commands.len(),
            "session ready"
        );
        Self {
            state,
            agent,
            commands,
        }
    }

    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Mutable access for registering extra commands.
    pub fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    pub fn gate(&self) -> &Arc<ConfirmationGate> {
        &self.state.gate
    }

    /// Send a message and return the final reply.
    pub async fn chat(&self, message: &str, session_id: &str) -> Result<String, AgentError> {
        self.chat_with_tool_display(message, session_id, |_| {})
            .await
            .map(|outcome| outcome.response)
    }

    /// Send a message, reporting each completed tool call to `tool_callback`
    /// as it finishes.
    pub async fn chat_with_tool_display<F>(
        &self,
        message: &str,
        session_id: &str,
        tool_callback: F,
    ) -> Result<ChatOutcome, AgentError>
    where
        F: FnMut(&ToolInvocation),
    {
        let sent = if self.state.memory_enabled {
            self.state.memory().contextualize(session_id, message)
        } else {
            message.to_string()
        };
        let model = self.state.model();
        let system_prompt = self.state.system_prompt();

        let outcome = self
            .agent
            .run_turn(
                TurnInput {
                    model: &model,
                    system_prompt: &system_prompt,
                    message: &sent,
                },
                tool_callback,
            )
            .await?;

        if self.state.memory_enabled {
            self.state
                .memory()
                .add(session_id, message, &outcome.response);
        }
        Ok(ChatOutcome {
            response: outcome.response,
            tool_invocations: outcome.tool_invocations,
        })
    }

    /// Run a `//command` line; never fails, errors come back as text.
    pub fn execute_command(&self, raw: &str) -> String {
        self.commands.execute(raw)
    }

    /// Run a command with keyword arguments; these replace positional ones.
    pub fn execute_command_with(&self, raw: &str, kwargs: &BTreeMap<String, ArgValue>) -> String {
        self.commands.dispatch(raw, kwargs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::{text_response, MockModelClient, ScriptedPrompter};

    fn session(responses: Vec<crate::types::ChatResponse>) -> (AgentSession, Arc<MockModelClient>) {
        let client = Arc::new(MockModelClient::new(responses));
        let session = AgentSession::new(
            &Config::default(),
            client.clone(),
            ToolRegistry::new(),
            Arc::new(ScriptedPrompter::new(&[])),
            SessionOptions::default(),
        );
        (session, client)
    }

    #[tokio::test]
    async fn memory_context_is_sent_on_the_next_turn() {
        let (session, client) = session(vec![text_response("nice to meet you"), text_response("Ada")]);
        session.chat("my name is Ada", "s1").await.unwrap();
        let reply = session.chat("what is my name?", "s1").await.unwrap();
        assert_eq!(reply, "Ada");

        let second = client.requests()[1].messages.last().unwrap().text().to_string();
        assert!(second.starts_with("Previous conversation context:\nUser: my name is Ada"));
        assert!(second.ends_with("Current message: what is my name?"));
        assert_eq!(session.state().memory().count("s1"), 2);
    }

    #[tokio::test]
    async fn sessions_do_not_share_context() {
        let (session, client) = session(vec![text_response("a"), text_response("b")]);
        session.chat("first", "s1").await.unwrap();
        session.chat("second", "s2").await.unwrap();
        assert_eq!(client.requests()[1].messages.last().unwrap().text(), "second");
    }

    #[tokio::test]
    async fn model_switch_applies_to_next_request() {
        let (session, client) = session(vec![text_response("ok")]);
        session.state().set_model("local-llama");
        session.chat("hi", "s").await.unwrap();
        assert_eq!(client.requests()[0].model, "local-llama");
    }

    #[test]
    fn confirmation_update_reaches_the_live_gate() {
        let (session, _) = session(Vec::new());
        session
            .state()
            .update_confirmation(|c| c.confirm_terminal = true)
            .unwrap();
        assert!(session.gate().settings().confirm_terminal);
        assert!(session.state().confirmation().confirm_terminal);
    }

    #[test]
    fn extra_commands_dispatch_with_keyword_arguments() {
        use crate::commands::{CommandDef, ParamKind, ParamSpec};

        let (mut session, _) = session(Vec::new());
        session
            .commands_mut()
            .register(
                CommandDef::new("greet")
                    .param(ParamSpec::with_default("who", ParamKind::Str, "world"))
                    .handler(|inv| Ok(Some(format!("hello, {}", inv.args.str("who").unwrap_or("?"))))),
            )
            .unwrap();

        assert_eq!(session.execute_command("//greet"), "hello, world");
        let mut kwargs = BTreeMap::new();
        kwargs.insert("who".to_string(), ArgValue::from("Ada"));
        assert_eq!(session.execute_command_with("//greet Bob", &kwargs), "hello, Ada");
        assert!(session.commands().list_names().contains(&"greet".to_string()));
    }
}
