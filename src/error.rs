//! Error types shared across the command, gating, and agent layers.

use std::fmt;

// ---------------------------------------------------------------------------
// ToolError
// ---------------------------------------------------------------------------

/// Errors arising from tool execution.
#[derive(Debug)]
pub enum ToolError {
    /// The model supplied arguments the tool couldn't parse.
    InvalidArguments(String),
    /// The tool ran but encountered a failure.
    ExecutionFailed(String),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArguments(msg) => write!(f, "invalid arguments: {msg}"),
            Self::ExecutionFailed(msg) => write!(f, "execution failed: {msg}"),
        }
    }
}

impl std::error::Error for ToolError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading, parsing, or persisting configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from the model HTTP layer.
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// Non-2xx status from the API.
    Status { code: u16, body: String },
    /// The response body could not be interpreted.
    InvalidResponse(String),
}

impl ApiError {
    /// HTTP status code when the failure was a non-2xx response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::Http(_) | Self::InvalidResponse(_) => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status { code, body } => write!(f, "status {code}: {body}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// Command registry errors
// ---------------------------------------------------------------------------

/// A command definition was rejected at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The definition has no command name.
    MissingName,
    /// The definition has no handler attached.
    MissingHandler(String),
    /// Two parameters share the same name.
    DuplicateParameter { command: String, parameter: String },
    /// A greedy parameter was declared before other parameters.
    RestNotLast { command: String, parameter: String },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => write!(f, "command definition has no name"),
            Self::MissingHandler(name) => write!(f, "command '{name}' has no handler"),
            Self::DuplicateParameter { command, parameter } => {
                write!(f, "command '{command}' declares parameter '{parameter}' twice")
            }
            Self::RestNotLast { command, parameter } => write!(
                f,
                "command '{command}': greedy parameter '{parameter}' must be declared last"
            ),
        }
    }
}

impl std::error::Error for RegistrationError {}

/// Failure reported by a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError(pub String);

impl CommandError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CommandError {}

impl From<ConfigError> for CommandError {
    fn from(e: ConfigError) -> Self {
        Self(e.to_string())
    }
}

/// Reasons a raw command line could not be turned into a handler call.
///
/// These never escape the registry; `dispatch` renders them as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    Empty,
    NotFound { name: String, available: Vec<String> },
    MissingParameter { command: String, parameter: String },
    InvalidArgument {
        command: String,
        parameter: String,
        value: String,
        expected: &'static str,
    },
    Handler { command: String, error: CommandError },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "No command provided."),
            Self::NotFound { name, available } => write!(
                f,
                "Command '{name}' not found. Available commands: {}",
                available.join(", ")
            ),
            Self::MissingParameter { command, parameter } => write!(
                f,
                "Error executing command '{command}': Required parameter '{parameter}' not provided"
            ),
            Self::InvalidArgument {
                command,
                parameter,
                value,
                expected,
            } => write!(
                f,
                "Error executing command '{command}': Invalid value '{value}' for parameter '{parameter}': expected {expected}"
            ),
            Self::Handler { command, error } => {
                write!(f, "Error executing command '{command}': {error}")
            }
        }
    }
}

impl std::error::Error for DispatchError {}

// ---------------------------------------------------------------------------
// ConfirmationDenied
// ---------------------------------------------------------------------------

/// The user rejected a confirmation batch.
///
/// Raised by the gate for every request of the rejected batch. Only the
/// top-level turn driver should swallow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationDenied;

impl fmt::Display for ConfirmationDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User cancelled tool execution")
    }
}

impl std::error::Error for ConfirmationDenied {}

// ---------------------------------------------------------------------------
// AgentError
// ---------------------------------------------------------------------------

/// Top-level error type for one agent turn.
#[derive(Debug)]
pub enum AgentError {
    Config(ConfigError),
    Api(ApiError),
    Tool(ToolError),
    /// A confirmation batch was denied; the turn was aborted.
    Cancelled(ConfirmationDenied),
    /// Model returned no choices in the response.
    EmptyResponse,
    /// The agentic loop exceeded the configured iteration cap.
    MaxIterationsReached,
}

impl AgentError {
    /// True when the turn ended because the user denied a tool batch.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Api(e) => write!(f, "api: {e}"),
            Self::Tool(e) => write!(f, "tool: {e}"),
            Self::Cancelled(e) => write!(f, "cancelled: {e}"),
            Self::EmptyResponse => write!(f, "model returned empty response"),
            Self::MaxIterationsReached => write!(f, "max agentic loop iterations reached"),
        }
    }
}

impl std::error::Error for AgentError {}

impl From<ConfigError> for AgentError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ApiError> for AgentError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

impl From<ToolError> for AgentError {
    fn from(e: ToolError) -> Self {
        Self::Tool(e)
    }
}

impl From<ConfirmationDenied> for AgentError {
    fn from(e: ConfirmationDenied) -> Self {
        Self::Cancelled(e)
    }
}
