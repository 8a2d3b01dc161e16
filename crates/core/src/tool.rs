//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools are what let the model act on the machine. Shellwright ships one
//! (shell command execution), but the registry is keyed by name so more can
//! be added without touching the agent loop.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ToolError;
use crate::message::ToolCallRequest;

/// Static descriptor sent to the model so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    /// Names of the arguments the schema marks as required.
    pub fn required_arguments(&self) -> Vec<&str> {
        self.parameters["required"]
            .as_array()
            .map(|names| names.iter().filter_map(|n| n.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Tagged outcome of running a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "output", rename_all = "lowercase")]
pub enum ExecutionResult {
    Success(String),
    Failure(String),
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The raw output or error message.
    pub fn output(&self) -> &str {
        match self {
            Self::Success(s) | Self::Failure(s) => s,
        }
    }

    /// Render as the plain text stored in the conversation log.
    pub fn into_text(self) -> String {
        match self {
            Self::Success(out) => format!("Success: {out} || Task completed successfully."),
            Self::Failure(err) => format!("Error: {err}"),
        }
    }
}

impl From<ToolError> for ExecutionResult {
    fn from(err: ToolError) -> Self {
        Self::Failure(err.to_string())
    }
}

/// The core Tool trait.
///
/// Tools are registered in the [`ToolRegistry`] and made available to the
/// agent loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "executeCommand").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    ///
    /// `Err` means the call itself was unusable (bad arguments, policy
    /// refusal). A command that ran and failed is `Ok(ExecutionResult::Failure)`.
    async fn execute(&self, arguments: serde_json::Value) -> Result<ExecutionResult, ToolError>;

    /// Convert this tool into a ToolSpec for sending to the LLM.
    fn to_spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// The agent loop uses this to:
/// 1. Get tool specs to send to the LLM
/// 2. Resolve and execute tools when the LLM requests them
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if name.is_empty() {
            return Err(ToolError::InvalidArguments("tool name must not be empty".into()));
        }
        if self.tools.contains_key(&name) {
            return Err(ToolError::DuplicateName(name));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look a tool up by name.
    pub fn resolve(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tool specs, sorted by name.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<_> = self.tools.values().map(|t| t.to_spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Execute a tool call.
    pub async fn execute(&self, call: &ToolCallRequest) -> Result<ExecutionResult, ToolError> {
        let tool = self
            .resolve(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        tool.execute(call.arguments.clone()).await
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
