//! Tools the model can call during a turn.
//!
//! Tools are async trait objects shared across concurrently running calls,
//! so the registry hands out `Arc`s and must itself be `Send + Sync`.

pub mod files;
pub mod shell;

use std::path::Path;
use std::sync::Arc;

use crate::config::ToolsConfig;
use crate::error::ToolError;
use crate::types::ToolDefinition;
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Tool trait
// ---------------------------------------------------------------------------

/// A tool that can be invoked by the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name matching what the model will call.
    fn name(&self) -> &'static str;

    /// OpenAI-format definition sent with every request.
    fn definition(&self) -> ToolDefinition;

    /// Execute with the model's JSON-encoded arguments.
    async fn execute(&self, arguments: &str) -> Result<String, ToolError>;
}

// ---------------------------------------------------------------------------
// Tool registry
// ---------------------------------------------------------------------------

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tools enabled by `[tools]`, rooted at `workspace`.
    pub fn from_config(config: &ToolsConfig, workspace: &Path) -> Self {
        let mut registry = Self::new();
        if config.shell_enabled {
            registry.register(shell::ShellTool::new(
                workspace,
                std::time::Duration::from_secs(config.shell_timeout_secs.max(1)),
            ));
        }
        if config.files_enabled {
            registry.register(files::ReadFileTool::new(workspace));
            registry.register(files::WriteFileTool::new(workspace));
        }
        registry
    }

    /// Register a tool; a tool with the same name is replaced.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let tool: Arc<dyn Tool> = Arc::new(tool);
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Registered tool names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Find a tool by name and execute it.
    pub async fn execute(&self, name: &str, arguments: &str) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::ExecutionFailed(format!("unknown tool: {name}")))?;
        tool.execute(arguments).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
