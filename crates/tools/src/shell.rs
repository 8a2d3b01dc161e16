//! Shell tool: execute one command line per call.
//!
//! Runs through the platform shell, inheriting the working directory and
//! environment. No timeout, no retries. An optional allowlist restricts the
//! base command and, while set, rejects chaining, pipes, redirection and
//! command substitution.

use std::path::PathBuf;

use async_trait::async_trait;
use shellwright_core::error::ToolError;
use shellwright_core::tool::{ExecutionResult, Tool};
use tokio::process::Command;
use tracing::{debug, warn};

pub const TOOL_NAME: &str = "executeCommand";

/// Control operators and substitutions that could smuggle a second command
/// past the allowlist.
const SHELL_OPERATORS: &[&str] = &[";", "&", "|", "`", "$(", "<", ">", "\n", "\r"];

/// Execute shell commands requested by the model.
pub struct ShellTool {
    /// If non-empty, only these commands are allowed.
    allowed_commands: Vec<String>,

    /// Any stderr output marks the run as failed, whatever the exit status.
    stderr_is_failure: bool,

    /// Run here instead of the current directory.
    working_dir: Option<PathBuf>,
}

impl ShellTool {
    pub fn new() -> Self {
        Self {
            allowed_commands: Vec::new(),
            stderr_is_failure: true,
            working_dir: None,
        }
    }

    pub fn with_allowed_commands(mut self, allowed: Vec<String>) -> Self {
        self.allowed_commands = allowed;
        self
    }

    pub fn with_stderr_is_failure(mut self, enabled: bool) -> Self {
        self.stderr_is_failure = enabled;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn is_command_allowed(&self, command: &str) -> bool {
        if self.allowed_commands.is_empty() {
            return true;
        }
        if contains_shell_operator(command) {
            return false;
        }

        let base_cmd = command.split_whitespace().next().unwrap_or("").trim();

        self.allowed_commands.iter().any(|a| a == base_cmd)
    }

    /// Run `command` and classify the outcome.
    pub async fn run(&self, command: &str) -> ExecutionResult {
        debug!(command = %command, "Executing shell command");

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        match cmd.output().await {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                let result = classify(
                    command,
                    output.status.success(),
                    output.status.code(),
                    &stdout,
                    &stderr,
                    self.stderr_is_failure,
                );
                if !result.is_success() {
                    warn!(command = %command, exit_code = ?output.status.code(), "Command failed");
                }
                result
            }
            Err(e) => {
                warn!(command = %command, error = %e, "Failed to spawn command");
                ExecutionResult::Failure(e.to_string())
            }
        }
    }
}

fn contains_shell_operator(command: &str) -> bool {
    SHELL_OPERATORS.iter().any(|op| command.contains(op))
}

impl Default for ShellTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide success or failure from a finished process.
///
/// A non-zero exit is always a failure. With `stderr_is_failure`, any stderr
/// text is a failure too, reported verbatim.
fn classify(
    command: &str,
    exited_ok: bool,
    code: Option<i32>,
    stdout: &str,
    stderr: &str,
    stderr_is_failure: bool,
) -> ExecutionResult {
    if !exited_ok {
        return if stderr.is_empty() {
            let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
            ExecutionResult::Failure(format!("Command failed: {command} (exit code {code})"))
        } else {
            ExecutionResult::Failure(format!("Command failed: {command}\n{stderr}"))
        };
    }

    if stderr.is_empty() {
        ExecutionResult::Success(stdout.to_string())
    } else if stderr_is_failure {
        ExecutionResult::Failure(stderr.to_string())
    } else {
        ExecutionResult::Success(format!("{stdout}\n[stderr]: {stderr}"))
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Executes a single terminal or shell command. A command can create a file or folder, write to a file, delete a file, etc."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "A single terminal command, e.g. 'ls -l', 'mkdir new_folder' or 'echo Hello World > hello.txt'"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ExecutionResult, ToolError> {
        let command = arguments["command"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'command' argument".into()))?;
        if command.trim().is_empty() {
            return Err(ToolError::InvalidArguments("'command' must not be empty".into()));
        }

        if !self.is_command_allowed(command) {
            let reason = if contains_shell_operator(command) {
                "Shell operators are not allowed while an allowlist is set".to_string()
            } else {
                format!(
                    "Command '{}' not in allowlist",
                    command.split_whitespace().next().unwrap_or("")
                )
            };
            return Err(ToolError::PermissionDenied {
                tool_name: TOOL_NAME.into(),
                reason,
            });
        }

        Ok(self.run(command).await)
    }
}
