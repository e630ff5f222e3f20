//! Shell command execution tool.
//!
//! Runs a command through the platform shell inside the workspace and returns
//! exit code, stdout, and stderr. Confirmation happens before this tool is
//! reached, in the gate.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::Tool;
use crate::error::ToolError;
use crate::textutil::truncate_bytes;
use crate::types::ToolDefinition;

/// Maximum bytes of each output stream returned to the model.
const MAX_OUTPUT_LEN: usize = 4000;

pub struct ShellTool {
    workspace: PathBuf,
    timeout: Duration,
}

impl ShellTool {
    pub fn new(workspace: &Path, timeout: Duration) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
            timeout,
        }
    }
}

#[derive(Deserialize)]
struct Args {
    command: String,
}

/// Captured process output.
#[derive(Debug)]
struct ExecOutput {
    exit_code: i32,
    stdout: String,
    stderr: String,
}

fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

async fn run_process(mut cmd: Command, workspace: &Path) -> Result<ExecOutput, ToolError> {
    // A denied batch aborts in-flight siblings; take the child down with them.
    cmd.kill_on_drop(true)
        .current_dir(workspace)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let output = cmd
        .output()
        .await
        .map_err(|e| ToolError::ExecutionFailed(format!("failed to spawn shell: {e}")))?;
    Ok(ExecOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &'static str {
        "run_shell"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            self.name(),
            "Run a shell command in the project directory and return its exit code, stdout and stderr.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "command": {"type": "string", "description": "The shell command to execute"}
                },
                "required": ["command"]
            }),
        )
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: Args = serde_json::from_str(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        if args.command.trim().is_empty() {
            return Err(ToolError::InvalidArguments("command cannot be empty".into()));
        }

        tracing::debug!(command = %args.command, "running shell command");
        let output = tokio::time::timeout(
            self.timeout,
            run_process(shell_command(&args.command), &self.workspace),
        )
        .await
        .map_err(|_| {
            ToolError::ExecutionFailed(format!(
                "command timed out after {}s",
                self.timeout.as_secs()
            ))
        })??;

        let stdout = truncate_bytes(&output.stdout, MAX_OUTPUT_LEN, "...[truncated]");
        let stderr = truncate_bytes(&output.stderr, MAX_OUTPUT_LEN, "...[truncated]");
        Ok(format!(
            "exit code: {}\nstdout:\n{stdout}\nstderr:\n{stderr}",
            output.exit_code
        ))
    }
}
