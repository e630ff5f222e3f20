//! File read/write tools.
//!
//! - `read_file`: reads a file's contents (truncated if large).
//! - `write_file`: writes content to a file, creating parents as needed.
//!
//! Paths resolve against the workspace root and may not leave it.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use super::Tool;
use crate::error::ToolError;
use crate::textutil::truncate_bytes;
use crate::types::ToolDefinition;

/// Maximum bytes returned when reading a file.
const MAX_READ_LEN: usize = 8000;

/// Resolve `raw` against the workspace, rejecting any path that leaves it.
///
/// The check is lexical: `..` may not climb above the workspace root and
/// absolute paths must lie under it. Symlinks are not resolved.
fn resolve(workspace: &Path, raw: &str) -> Result<PathBuf, ToolError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ToolError::InvalidArguments("path cannot be empty".into()));
    }
    let outside = || ToolError::InvalidArguments(format!("path escapes the workspace: {raw}"));
    let path = Path::new(raw);
    let relative = if path.is_absolute() {
        path.strip_prefix(workspace).map_err(|_| outside())?
    } else {
        path
    };

    let mut resolved = workspace.to_path_buf();
    let mut depth = 0usize;
    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::ParentDir if depth > 0 => {
                resolved.pop();
                depth -= 1;
            }
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(outside())
            }
        }
    }
    Ok(resolved)
}

// ---------------------------------------------------------------------------
// ReadFile
// ---------------------------------------------------------------------------

pub struct ReadFileTool {
    workspace: PathBuf,
}

impl ReadFileTool {
    pub fn new(workspace: &Path) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
        }
    }
}

#[derive(Deserialize)]
struct ReadArgs {
    path: String,
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            self.name(),
            "Read the contents of a file at the given path.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Path to the file to read"}
                },
                "required": ["path"]
            }),
        )
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: ReadArgs = serde_json::from_str(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let path = resolve(&self.workspace, &args.path)?;
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ToolError::ExecutionFailed(format!("failed to read {}: {e}", path.display()))
        })?;
        Ok(truncate_bytes(&content, MAX_READ_LEN, "...[truncated]"))
    }
}

// ---------------------------------------------------------------------------
// WriteFile
// ---------------------------------------------------------------------------

pub struct WriteFileTool {
    workspace: PathBuf,
}

impl WriteFileTool {
    pub fn new(workspace: &Path) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
        }
    }
}

#[derive(Deserialize)]
struct WriteArgs {
    path: String,
    content: String,
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &'static str {
        "write_file"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            self.name(),
            "Write content to a file at the given path. Creates the file if it doesn't exist, overwrites if it does.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Path to the file to write"},
                    "content": {"type": "string", "description": "Content to write to the file"}
                },
                "required": ["path", "content"]
            }),
        )
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: WriteArgs = serde_json::from_str(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let path = resolve(&self.workspace, &args.path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ToolError::ExecutionFailed(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        tokio::fs::write(&path, &args.content).await.map_err(|e| {
            ToolError::ExecutionFailed(format!("failed to write {}: {e}", path.display()))
        })?;
        Ok(format!("Wrote {} bytes to {}", args.content.len(), args.path))
    }
}
