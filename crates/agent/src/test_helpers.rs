//! Shared test helpers for agent loop tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shellwright_core::error::{ProviderError, ToolError};
use shellwright_core::provider::{ModelReply, Provider, ProviderRequest, ProviderResponse, Usage};
use shellwright_core::tool::{ExecutionResult, Tool};

/// A mock provider that returns a sequence of scripted replies.
///
/// Each call to `complete` returns the next reply in the queue and records
/// the request it was given. Panics if more calls are made than replies
/// provided.
pub struct ScriptedProvider {
    replies: Mutex<Vec<Result<ModelReply, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<ModelReply>) -> Self {
        Self::with_results(replies.into_iter().map(Ok).collect())
    }

    pub fn with_results(replies: Vec<Result<ModelReply, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let mut replies = self.replies.lock().unwrap();
        assert!(
            !replies.is_empty(),
            "ScriptedProvider: no more replies (call #{})",
            requests.len()
        );
        requests.push(request);
        let reply = replies.remove(0)?;
        Ok(ProviderResponse {
            reply,
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        })
    }
}

/// A tool that records the commands it receives and answers from a script.
pub struct RecordingTool {
    pub name: String,
    pub seen: Arc<Mutex<Vec<serde_json::Value>>>,
    outcome: fn(&str) -> ExecutionResult,
}

impl RecordingTool {
    /// Succeeds with `ran: <command>` for every command.
    pub fn succeeding(name: &str) -> Self {
        Self::with_outcome(name, |cmd| ExecutionResult::Success(format!("ran: {cmd}")))
    }

    pub fn with_outcome(name: &str, outcome: fn(&str) -> ExecutionResult) -> Self {
        Self {
            name: name.into(),
            seen: Arc::new(Mutex::new(Vec::new())),
            outcome,
        }
    }

    pub fn commands(&self) -> Arc<Mutex<Vec<serde_json::Value>>> {
        self.seen.clone()
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Records commands for tests"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {"command": {"type": "string"}},
            "required": ["command"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ExecutionResult, ToolError> {
        self.seen.lock().unwrap().push(arguments.clone());
        let command = arguments["command"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'command' argument".into()))?;
        Ok((self.outcome)(command))
    }
}

/// A reply asking for one `executeCommand` call.
pub fn command(cmd: &str) -> ModelReply {
    ModelReply::tool_call("executeCommand", serde_json::json!({ "command": cmd }))
}
