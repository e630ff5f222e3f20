//! `//command` registry and dispatcher.
//!
//! Commands are typed handlers the user calls directly, bypassing the model.
//! Each registration carries its own metadata (description, usage, ordered
//! parameter declarations) so help output and argument binding come from the
//! same source.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{CommandError, DispatchError, RegistrationError};

mod args;
pub(crate) mod builtin;
pub mod convert;

pub use args::{parse_bool_token, ArgValue, BoundArgs, ParamKind, ParamSpec};

/// Text returned when a handler succeeds without output.
pub const SUCCESS_MESSAGE: &str = "Command executed successfully.";

/// Result type returned by command handlers.
pub type CommandResult = Result<Option<String>, CommandError>;

/// Shared handler callable.
pub type Handler = Arc<dyn Fn(&Invocation<'_>) -> CommandResult + Send + Sync>;

/// Everything a handler sees for one call.
pub struct Invocation<'a> {
    /// Registry the command was dispatched from (used by `help`/`list`).
    pub registry: &'a CommandRegistry,
    /// Arguments bound to the handler's declared parameters.
    pub args: BoundArgs,
}

/// Builder for one command registration.
#[derive(Default)]
pub struct CommandDef {
    name: String,
    description: Option<String>,
    usage: Option<String>,
    params: Vec<ParamSpec>,
    handler: Option<Handler>,
}

impl CommandDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> CommandResult + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }
}

/// Immutable metadata for a registered command.
#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
    pub usage: String,
    pub parameters: Vec<ParamSpec>,
    handler: Handler,
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("usage", &self.usage)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl TryFrom<CommandDef> for CommandDescriptor {
    type Error = RegistrationError;

    fn try_from(def: CommandDef) -> Result<Self, Self::Error> {
        if def.name.is_empty() {
            return Err(RegistrationError::MissingName);
        }
        let handler = def
            .handler
            .ok_or_else(|| RegistrationError::MissingHandler(def.name.clone()))?;
        for (idx, param) in def.params.iter().enumerate() {
            if def.params[..idx].iter().any(|p| p.name == param.name) {
                return Err(RegistrationError::DuplicateParameter {
                    command: def.name.clone(),
                    parameter: param.name.clone(),
                });
            }
            if param.rest && idx + 1 != def.params.len() {
                return Err(RegistrationError::RestNotLast {
                    command: def.name.clone(),
                    parameter: param.name.clone(),
                });
            }
        }

        Ok(Self {
            description: def
                .description
                .unwrap_or_else(|| format!("Execute {} command", def.name)),
            usage: def.usage.unwrap_or_else(|| format!("//{}", def.name)),
            name: def.name,
            parameters: def.params,
            handler,
        })
    }
}

/// Name → descriptor mapping with insertion-ordered listing.
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
}

impl CommandRegistry {
    /// Create a registry with the built-in `help` and `list` commands.
    pub fn new() -> Self {
        let mut registry = Self {
            commands: Vec::new(),
        };
        for def in builtin::definitions() {
            // Built-in definitions are static and always well-formed.
            if let Err(err) = registry.register(def) {
                warn!(error = %err, "failed to register built-in command");
            }
        }
        registry
    }

    /// Register a command. A later registration with the same name replaces
    /// the earlier one in place.
    pub fn register(&mut self, def: CommandDef) -> Result<(), RegistrationError> {
        let descriptor = CommandDescriptor::try_from(def)?;
        match self.commands.iter_mut().find(|c| c.name == descriptor.name) {
            Some(slot) => {
                debug!(command = %descriptor.name, "overriding registered command");
                *slot = descriptor;
            }
            None => self.commands.push(descriptor),
        }
        Ok(())
    }

    /// Remove a command; returns false when it was not registered.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.commands.len();
        self.commands.retain(|c| c.name != name);
        self.commands.len() != before
    }

    pub fn descriptor(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Registered names in insertion order.
    pub fn list_names(&self) -> Vec<String> {
        self.commands.iter().map(|c| c.name.clone()).collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Dispatch a raw command line with no keyword arguments.
    pub fn execute(&self, raw: &str) -> String {
        self.dispatch(raw, &BTreeMap::new())
    }

    /// Dispatch a raw command line and render any failure as text.
    pub fn dispatch(&self, raw: &str, extra_kwargs: &BTreeMap<String, ArgValue>) -> String {
        match self.try_dispatch(raw, extra_kwargs) {
            Ok(output) => output,
            Err(err) => {
                debug!(raw, error = %err, "command dispatch failed");
                err.to_string()
            }
        }
    }

    /// Dispatch a raw command line, keeping the failure structured.
    pub fn try_dispatch(
        &self,
        raw: &str,
        extra_kwargs: &BTreeMap<String, ArgValue>,
    ) -> Result<String, DispatchError> {
        let line = raw.trim().trim_start_matches('/');
        let mut tokens = line.split_whitespace();
        let name = tokens.next().ok_or(DispatchError::Empty)?;
        let positional: Vec<&str> = tokens.collect();

        let descriptor = self
            .descriptor(name)
            .ok_or_else(|| DispatchError::NotFound {
                name: name.to_string(),
                available: self.list_names(),
            })?;

        let args = args::bind_arguments(name, &descriptor.parameters, &positional, extra_kwargs)?;
        let invocation = Invocation {
            registry: self,
            args,
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (descriptor.handler)(&invocation)))
            .unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                warn!(command = name, panic = %message, "command handler panicked");
                Err(CommandError::new(format!("handler panicked: {message}")))
            });
        match outcome {
            Ok(Some(output)) => Ok(output),
            Ok(None) => Ok(SUCCESS_MESSAGE.to_string()),
            Err(error) => Err(DispatchError::Handler {
                command: name.to_string(),
                error,
            }),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
