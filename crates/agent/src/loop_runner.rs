//! The agent tool-call loop implementation.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use shellwright_core::error::ToolError;
use shellwright_core::event::{DomainEvent, EventBus};
use shellwright_core::message::{ConversationLog, ToolCallRequest, ToolCallResult};
use shellwright_core::provider::{ModelReply, Provider, ProviderRequest};
use shellwright_core::tool::{ExecutionResult, ToolRegistry};
use tracing::{debug, info, warn};

use crate::policy::LoopPolicy;

/// Orchestrates model calls and tool execution for one goal at a time.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per response
    max_output_tokens: Option<u32>,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// Fixed system instruction, resent every round
    system_instruction: String,

    /// Round limits and confirmation
    policy: LoopPolicy,

    /// Event bus for domain events
    event_bus: Arc<EventBus>,
}

impl AgentLoop {
    /// Create a new agent loop with the unbounded default policy.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        tools: Arc<ToolRegistry>,
        system_instruction: impl Into<String>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 1.0,
            max_output_tokens: None,
            tools,
            system_instruction: system_instruction.into(),
            policy: LoopPolicy::unbounded(),
            event_bus,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max: Option<u32>) -> Self {
        self.max_output_tokens = max;
        self
    }

    pub fn with_policy(mut self, policy: LoopPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run one session goal to completion.
    ///
    /// Appends `goal` to `log`, then alternates between the model and the
    /// tools until the model answers with text. Returns that text.
    ///
    /// Tool failures are fed back to the model. A provider failure or a call
    /// to an unregistered tool ends the goal with an error; in both cases
    /// the log is left well-formed (no unanswered tool calls).
    pub async fn process(
        &self,
        log: &mut ConversationLog,
        goal: &str,
    ) -> shellwright_core::Result<String> {
        info!(conversation_id = %log.id, turns = log.len(), "Processing session goal");

        log.push_user_text(goal);
        self.event_bus.publish(DomainEvent::GoalReceived {
            conversation_id: log.id.to_string(),
            content_preview: goal.chars().take(80).collect(),
            timestamp: Utc::now(),
        });

        let specs = self.tools.specs();
        let mut rounds: u32 = 0;

        loop {
            debug!(conversation_id = %log.id, round = rounds, "Querying model");

            let request = ProviderRequest {
                model: self.model.clone(),
                system_instruction: self.system_instruction.clone(),
                turns: log.turns().to_vec(),
                tools: specs.clone(),
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            };

            let response = match self.provider.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, "Model request failed");
                    self.event_bus.publish(DomainEvent::ErrorOccurred {
                        context: "provider".into(),
                        error_message: e.to_string(),
                        timestamp: Utc::now(),
                    });
                    return Err(e.into());
                }
            };

            if let Some(usage) = &response.usage {
                self.event_bus.publish(DomainEvent::ResponseGenerated {
                    conversation_id: log.id.to_string(),
                    model: response.model.clone(),
                    tokens_used: usage.total_tokens,
                    timestamp: Utc::now(),
                });
            }

            let mut calls = match response.reply {
                ModelReply::Text { text } => {
                    log.push_model_text(text.clone());
                    info!(conversation_id = %log.id, rounds, "Goal finished");
                    return Ok(text);
                }
                ModelReply::ToolCalls { calls } => calls,
            };

            if self.policy.round_limit_reached(rounds) {
                warn!(conversation_id = %log.id, rounds, "Round limit reached, stopping");
                let notice = round_limit_notice(rounds);
                log.push_model_text(notice.clone());
                return Ok(notice);
            }

            if self.policy.single_tool_call && calls.len() > 1 {
                debug!(dropped = calls.len() - 1, "Keeping only the first tool call");
                calls.truncate(1);
            }

            if let Some(unknown) = calls.iter().find(|c| !self.tools.contains(&c.name)) {
                warn!(tool = %unknown.name, "Model requested an unregistered tool");
                self.event_bus.publish(DomainEvent::ErrorOccurred {
                    context: "tool_dispatch".into(),
                    error_message: format!("unknown tool '{}'", unknown.name),
                    timestamp: Utc::now(),
                });
                return Err(ToolError::NotFound(unknown.name.clone()).into());
            }

            log.push_tool_calls(calls.clone())?;
            rounds += 1;

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                let result = self.dispatch(call).await;
                results.push(ToolCallResult {
                    call_id: call.id.clone(),
                    name: call.name.clone(),
                    result,
                });
            }
            log.push_tool_results(results)?;

            // Loop back: the model sees the results and decides what to do next
        }
    }

    /// Run one tool call and render its outcome as log text.
    async fn dispatch(&self, call: &ToolCallRequest) -> String {
        self.event_bus.publish(DomainEvent::ToolCallRequested {
            tool_name: call.name.clone(),
            arguments: call.arguments.clone(),
            timestamp: Utc::now(),
        });

        let start = Instant::now();
        let outcome = match &self.policy.confirmation {
            Some(hook) if !hook.confirm(call).await => {
                info!(tool = %call.name, "Tool call rejected by operator");
                ExecutionResult::Failure(format!(
                    "Command rejected by operator: {}",
                    describe_arguments(&call.name, &call.arguments)
                ))
            }
            _ => match self.tools.execute(call).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "Bad tool call");
                    ExecutionResult::from(e)
                }
            },
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        let success = outcome.is_success();
        let text = outcome.into_text();
        self.event_bus.publish(DomainEvent::ToolExecuted {
            tool_name: call.name.clone(),
            success,
            output: text.clone(),
            duration_ms,
            timestamp: Utc::now(),
        });
        text
    }
}

fn round_limit_notice(rounds: u32) -> String {
    let plural = if rounds == 1 { "" } else { "s" };
    format!(
        "Stopped after {rounds} tool round{plural} without finishing. Send a follow-up to continue."
    )
}

/// Short human-readable form of a call: the command line when there is one.
pub fn describe_arguments(tool_name: &str, arguments: &serde_json::Value) -> String {
    arguments["command"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{tool_name} {arguments}"))
}
