//! `//commands` that inspect and change a running session.
//!
//! Handlers share [`SessionState`] with the session. Commands that change
//! settings write them to the config file first and only then apply them.

use std::sync::Arc;

use super::session::SessionState;
use crate::commands::{builtin, convert, CommandDef, CommandRegistry, ParamKind, ParamSpec};
use crate::error::CommandError;
use crate::gate::WhitelistConfig;
use crate::textutil::preview;

/// Exchanges listed by `//memory show`.
const MEMORY_SHOW_LIMIT: usize = 5;
/// Characters of each message shown by `//memory show`.
const MEMORY_PREVIEW_CHARS: usize = 50;

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}

/// Registry with the built-ins plus every session command.
pub(super) fn session_registry(state: &Arc<SessionState>) -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    let defs = vec![
        help(),
        tools(state),
        status(state),
        config(state),
        system_prompt(state),
        model(state),
        memory(state),
        clear(state),
        confirm(state),
        whitelist(state),
        convert::definition(),
    ];
    for def in defs {
        if let Err(err) = registry.register(def) {
            tracing::error!(error = %err, "failed to register session command");
        }
    }
    registry
}

fn help() -> CommandDef {
    CommandDef::new("help")
        .description("Show available commands")
        .usage("//help [command_name]")
        .param(ParamSpec::optional("command_name", ParamKind::Str))
        .handler(|inv| {
            Ok(Some(match inv.args.str("command_name") {
                Some(name) => builtin::command_help(inv.registry, name),
                None => format!(
                    "{}\n\nAnything not starting with // is sent to the agent. Type 'exit' to quit.",
                    builtin::overview(inv.registry)
                ),
            }))
        })
}

fn tools(state: &Arc<SessionState>) -> CommandDef {
    let state = Arc::clone(state);
    CommandDef::new("tools")
        .description("List the tools the agent can call")
        .handler(move |_| {
            if state.tool_names.is_empty() {
                return Ok(Some("No tools currently loaded".to_string()));
            }
            let mut out = String::from("Loaded Tools:\n");
            for (idx, name) in state.tool_names.iter().enumerate() {
                out.push_str(&format!("{:4}. {name}\n", idx + 1));
            }
            out.push_str(&format!("\nTotal: {} tools loaded", state.tool_names.len()));
            Ok(Some(out))
        })
}

fn status(state: &Arc<SessionState>) -> CommandDef {
    let state = Arc::clone(state);
    CommandDef::new("status")
        .description("Show agent status")
        .handler(move |_| {
            let cwd = std::env::current_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            let messages = state.memory().count(&state.session_id);
            Ok(Some(format!(
                "Agent Status:\n  Name: {}\n  Provider: {}\n  Model: {}\n  Temperature: {}\n  Memory: {}\n  Session: {}\n  Messages in context: {messages}\n  Current working directory: {cwd}",
                state.agent_name,
                state.provider,
                state.model(),
                state.temperature,
                if state.memory_enabled { "Enabled" } else { "Disabled" },
                state.session_id,
            )))
        })
}

fn config(state: &Arc<SessionState>) -> CommandDef {
    let state = Arc::clone(state);
    CommandDef::new("config")
        .description("Show current configuration")
        .handler(move |_| {
            let confirmation = state.confirmation();
            let file = state
                .config_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(not persisted)".to_string());
            Ok(Some(format!(
                "Core Settings:\n  Provider: {}\n  Model: {}\n  Base URL: {}\n  Temperature: {}\n\nFeatures:\n  Memory: {}\n  Confirm Terminal: {}\n  Confirm Tools: {}\n  Whitelist: {} ({} commands)\n  Tools: {}\n\nConfig file: {file}",
                state.provider,
                state.model(),
                state.base_url,
                state.temperature,
                on_off(state.memory_enabled),
                on_off(confirmation.confirm_terminal),
                on_off(confirmation.confirm_tools),
                on_off(confirmation.whitelist_enabled),
                confirmation.safe_commands.len(),
                state.tool_names.len(),
            )))
        })
}

fn system_prompt(state: &Arc<SessionState>) -> CommandDef {
    let state = Arc::clone(state);
    CommandDef::new("system_prompt")
        .description("Show or replace the system prompt")
        .usage("//system_prompt [new prompt text]")
        .param(ParamSpec::optional("text", ParamKind::Str).rest())
        .handler(move |inv| match inv.args.str("text") {
            Some(text) => {
                if let Some(path) = &state.config_path {
                    crate::config::persist_system_prompt(path, text)?;
                }
                state.set_system_prompt(text);
                Ok(Some("✓ System prompt updated".to_string()))
            }
            None => Ok(Some(format!("Current system prompt:\n{}", state.system_prompt()))),
        })
}

fn model(state: &Arc<SessionState>) -> CommandDef {
    let state = Arc::clone(state);
    CommandDef::new("model")
        .description("Show or switch the model")
        .usage("//model [model_name]")
        .param(ParamSpec::optional("model_name", ParamKind::Str))
        .handler(move |inv| match inv.args.str("model_name") {
            Some(name) => {
                if let Some(path) = &state.config_path {
                    crate::config::persist_model_name(path, name)?;
                }
                state.set_model(name);
                Ok(Some(format!("✓ Switched to {name}")))
            }
            None => Ok(Some(format!("Current model: {}", state.model()))),
        })
}

fn memory(state: &Arc<SessionState>) -> CommandDef {
    let state = Arc::clone(state);
    CommandDef::new("memory")
        .description("Inspect or clear conversation memory")
        .usage("//memory [status|clear|show]")
        .param(ParamSpec::with_default("action", ParamKind::Str, "status"))
        .handler(move |inv| {
            let action = inv.args.str("action").unwrap_or("status");
            let session = state.session_id.as_str();
            let mut memory = state.memory();
            match action {
                "status" => Ok(Some(format!(
                    "Memory Status:\n  Enabled: {}\n  Messages: {}",
                    state.memory_enabled,
                    memory.count(session)
                ))),
                "clear" => {
                    memory.clear(session);
                    Ok(Some("✓ Memory cleared".to_string()))
                }
                "show" => {
                    let history = memory.history(session, Some(MEMORY_SHOW_LIMIT));
                    if history.is_empty() {
                        return Ok(Some("No conversation history".to_string()));
                    }
                    let mut out = format!("Conversation History ({} messages):\n", history.len());
                    for (idx, exchange) in history.iter().enumerate() {
                        out.push_str(&format!(
                            "  {}. You: {}\n     Agent: {}\n",
                            idx + 1,
                            preview(&exchange.message, MEMORY_PREVIEW_CHARS),
                            preview(&exchange.response, MEMORY_PREVIEW_CHARS),
                        ));
                    }
                    Ok(Some(out.trim_end().to_string()))
                }
                other => Err(CommandError::new(format!("Unknown memory action: {other}"))),
            }
        })
}

fn clear(state: &Arc<SessionState>) -> CommandDef {
    let state = Arc::clone(state);
    CommandDef::new("clear")
        .description("Clear the conversation history of this session")
        .handler(move |_| {
            state.memory().clear(&state.session_id);
            Ok(Some("✓ Conversation cleared".to_string()))
        })
}

fn confirm(state: &Arc<SessionState>) -> CommandDef {
    let state = Arc::clone(state);
    CommandDef::new("confirm")
        .description("Show or change which tool calls need confirmation")
        .usage("//confirm [terminal|tools|all] [on|off]")
        .param(ParamSpec::optional("target", ParamKind::Str))
        .param(ParamSpec::optional("state", ParamKind::Bool))
        .handler(move |inv| {
            let Some(target) = inv.args.str("target") else {
                let current = state.confirmation();
                return Ok(Some(format!(
                    "Confirmation:\n  Terminal: {}\n  Tools: {}",
                    on_off(current.confirm_terminal),
                    on_off(current.confirm_tools)
                )));
            };
            let explicit = inv.args.bool("state");
            let target = target.to_ascii_lowercase();
            if !matches!(target.as_str(), "terminal" | "tools" | "all") {
                return Err(CommandError::new(format!(
                    "Unknown confirmation target '{target}'. Use terminal, tools or all"
                )));
            }
            let summary = state.update_confirmation(|c| match target.as_str() {
                "terminal" => {
                    c.confirm_terminal = explicit.unwrap_or(!c.confirm_terminal);
                    format!("✓ Terminal confirmation {}", on_off(c.confirm_terminal))
                }
                "tools" => {
                    c.confirm_tools = explicit.unwrap_or(!c.confirm_tools);
                    format!("✓ Tool confirmation {}", on_off(c.confirm_tools))
                }
                _ => {
                    let value = explicit.unwrap_or(!(c.confirm_terminal && c.confirm_tools));
                    c.confirm_terminal = value;
                    c.confirm_tools = value;
                    format!("✓ All confirmation {}", on_off(value))
                }
            })?;
            Ok(Some(summary))
        })
}

fn whitelist(state: &Arc<SessionState>) -> CommandDef {
    let state = Arc::clone(state);
    CommandDef::new("whitelist")
        .description("Manage shell commands that skip confirmation")
        .usage("//whitelist [status|on|off|list|add <command>|remove <command>]")
        .param(ParamSpec::with_default("action", ParamKind::Str, "status"))
        .param(ParamSpec::optional("command", ParamKind::Str).rest())
        .handler(move |inv| {
            let action = inv.args.str("action").unwrap_or("status").to_ascii_lowercase();
            let command = inv.args.str("command").map(str::trim).unwrap_or("");
            match action.as_str() {
                "status" => {
                    let current = state.confirmation();
                    Ok(Some(format!(
                        "Whitelist: {} ({} commands)",
                        on_off(current.whitelist_enabled),
                        current.safe_commands.len()
                    )))
                }
                "on" | "off" => {
                    let enabled = action == "on";
                    state.update_confirmation(|c| c.whitelist_enabled = enabled)?;
                    Ok(Some(format!("✓ Whitelist {}", on_off(enabled))))
                }
                "list" => {
                    let current = state.confirmation();
                    if current.safe_commands.is_empty() {
                        return Ok(Some("Whitelist is empty".to_string()));
                    }
                    let mut out = String::from("Whitelisted commands:\n");
                    for (idx, entry) in current.safe_commands.iter().enumerate() {
                        out.push_str(&format!("{:4}. {entry}\n", idx + 1));
                    }
                    Ok(Some(out.trim_end().to_string()))
                }
                "add" | "remove" if command.is_empty() => Err(CommandError::new(format!(
                    "Usage: //whitelist {action} <command>"
                ))),
                "add" => {
                    let current = state.confirmation();
                    let mut list =
                        WhitelistConfig::new(current.whitelist_enabled, current.safe_commands);
                    if !list.add(command) {
                        return Err(CommandError::new(format!("'{command}' is already whitelisted")));
                    }
                    state.update_confirmation(|c| c.safe_commands = list.entries)?;
                    Ok(Some(format!("✓ Added '{command}' to whitelist")))
                }
                "remove" => {
                    let current = state.confirmation();
                    let mut list =
                        WhitelistConfig::new(current.whitelist_enabled, current.safe_commands);
                    if !list.remove(command) {
                        return Err(CommandError::new(format!("'{command}' is not whitelisted")));
                    }
                    state.update_confirmation(|c| c.safe_commands = list.entries)?;
                    Ok(Some(format!("✓ Removed '{command}' from whitelist")))
                }
                other => Err(CommandError::new(format!("Unknown whitelist action: {other}"))),
            }
        })
}

#[cfg(test)]
mod tests {
    use crate::agent::{AgentSession, SessionOptions};
    use crate::config::Config;
    use crate::gate::{ConfirmationPrompter, ToolCategory};
    use crate::testsupport::{MockModelClient, ScriptedPrompter, TestTempDir};
    use crate::tools::ToolRegistry;
    use std::sync::Arc;

    fn session_with(config_path: Option<std::path::PathBuf>) -> AgentSession {
        let tmp = std::env::temp_dir();
        AgentSession::new(
            &Config::default(),
            Arc::new(MockModelClient::new(Vec::new())),
            ToolRegistry::from_config(&Default::default(), &tmp),
            Arc::new(ScriptedPrompter::new(&[])) as Arc<dyn ConfirmationPrompter>,
            SessionOptions {
                session_id: "cli".to_string(),
                config_path,
            },
        )
    }

    #[test]
    fn help_overrides_builtin_and_lists_session_commands() {
        let session = session_with(None);
        let out = session.execute_command("//help");
        assert!(out.contains("//confirm - "));
        assert!(out.contains("//whitelist - "));
        assert!(out.contains("Type 'exit' to quit."));
        assert_eq!(session.commands().list_names()[0], "help");

        let detail = session.execute_command("//help convert");
        assert!(detail.contains("Usage: //convert <value> <from_unit> <to_unit>"));
    }

    #[test]
    fn tools_lists_registered_tools() {
        let session = session_with(None);
        let out = session.execute_command("tools");
        assert!(out.contains("   1. run_shell"));
        assert!(out.ends_with("Total: 3 tools loaded"));
    }

    #[test]
    fn status_reports_session_and_model() {
        let session = session_with(None);
        let out = session.execute_command("//status");
        assert!(out.contains("Model: gpt-4o-mini"));
        assert!(out.contains("Session: cli"));
        assert!(out.contains("Messages in context: 0"));
    }

    #[test]
    fn memory_show_and_clear() {
        let session = session_with(None);
        assert_eq!(session.execute_command("//memory show"), "No conversation history");
        session
            .state()
            .memory()
            .add("cli", "tell me a very long story about the sea and the ships on it", "ok");
        let shown = session.execute_command("//memory show");
        assert!(shown.starts_with("Conversation History (1 messages):"));
        assert!(shown.contains("1. You: tell me a very long story about the sea and the sh..."));
        assert!(shown.contains("Agent: ok..."));
        assert_eq!(session.execute_command("//memory"), "Memory Status:\n  Enabled: true\n  Messages: 1");
        assert_eq!(session.execute_command("//memory clear"), "✓ Memory cleared");
        assert_eq!(
            session.execute_command("//memory wipe"),
            "Error executing command 'memory': Unknown memory action: wipe"
        );
    }

    #[test]
    fn confirm_toggles_persist_and_reach_gate() {
        let tmp = TestTempDir::new("confirm-cmd");
        let path = tmp.write_text("agentgate.toml", "# mine\n[model]\nname = \"m\"\n");
        let session = session_with(Some(path.clone()));

        assert_eq!(
            session.execute_command("//confirm terminal on"),
            "✓ Terminal confirmation ON"
        );
        assert!(session.gate().settings().needs_confirmation(ToolCategory::Shell));
        assert_eq!(session.execute_command("//confirm tools"), "✓ Tool confirmation ON");

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# mine\n[model]\nname = \"m\"\n"));
        assert!(text.contains("confirm_terminal = true"));
        assert!(text.contains("confirm_tools = true"));

        assert_eq!(
            session.execute_command("//confirm all off"),
            "✓ All confirmation OFF"
        );
        assert_eq!(
            session.execute_command("//confirm"),
            "Confirmation:\n  Terminal: OFF\n  Tools: OFF"
        );
    }

    #[test]
    fn confirm_rejects_unknown_target_and_bad_state() {
        let session = session_with(None);
        assert_eq!(
            session.execute_command("//confirm network on"),
            "Error executing command 'confirm': Unknown confirmation target 'network'. Use terminal, tools or all"
        );
        assert_eq!(
            session.execute_command("//confirm terminal maybe"),
            "Error executing command 'confirm': Invalid value 'maybe' for parameter 'state': expected boolean"
        );
    }

    #[test]
    fn whitelist_add_remove_updates_live_gate() {
        let session = session_with(None);
        assert_eq!(
            session.execute_command("//whitelist add cargo check"),
            "✓ Added 'cargo check' to whitelist"
        );
        assert!(session.gate().settings().whitelist.matches("cargo check --all"));
        assert_eq!(
            session.execute_command("//whitelist add CARGO CHECK"),
            "Error executing command 'whitelist': 'CARGO CHECK' is already whitelisted"
        );
        assert_eq!(
            session.execute_command("//whitelist remove cargo check"),
            "✓ Removed 'cargo check' from whitelist"
        );
        assert!(!session.gate().settings().whitelist.contains("cargo check"));
        assert_eq!(session.execute_command("//whitelist off"), "✓ Whitelist OFF");
        assert!(!session.gate().settings().whitelist.enabled);
    }

    #[test]
    fn model_and_system_prompt_commands() {
        let tmp = TestTempDir::new("model-cmd");
        let path = tmp.child("agentgate.toml");
        let session = session_with(Some(path.clone()));
        assert_eq!(session.execute_command("//model"), "Current model: gpt-4o-mini");
        assert_eq!(session.execute_command("//model llama3"), "✓ Switched to llama3");
        assert_eq!(session.state().model(), "llama3");
        assert_eq!(
            session.execute_command("//system_prompt You are terse."),
            "✓ System prompt updated"
        );
        assert_eq!(session.state().system_prompt(), "You are terse.");

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("name = \"llama3\""));
        assert!(text.contains("system_prompt = \"You are terse.\""));
    }

    #[test]
    fn convert_is_available() {
        let session = session_with(None);
        assert_eq!(session.execute_command("//convert 100 lb kg"), "100 lb = 45.3592 kg");
    }
}
