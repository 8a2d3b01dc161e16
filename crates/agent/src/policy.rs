//! Loop policy: the knobs that bound an otherwise unbounded agent loop.
//!
//! The default policy runs every tool call the model asks for, for as many
//! rounds as it wants, without asking anyone.

use std::sync::Arc;

use async_trait::async_trait;
use shellwright_config::AgentConfig;
use shellwright_core::message::ToolCallRequest;

/// Asked before each tool call runs. Returning `false` skips the call and
/// reports the rejection to the model as the tool result.
#[async_trait]
pub trait ConfirmationHook: Send + Sync {
    async fn confirm(&self, call: &ToolCallRequest) -> bool;
}

/// Limits applied to one session goal.
#[derive(Clone, Default)]
pub struct LoopPolicy {
    /// Maximum tool rounds per goal; `None` is unbounded
    pub max_rounds: Option<u32>,

    /// Act only on the first tool call of each reply
    pub single_tool_call: bool,

    /// Optional per-call operator confirmation
    pub confirmation: Option<Arc<dyn ConfirmationHook>>,
}

impl LoopPolicy {
    /// Unbounded, trusting policy.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            max_rounds: config.max_rounds,
            single_tool_call: config.single_tool_call,
            confirmation: None,
        }
    }

    pub fn with_max_rounds(mut self, max: u32) -> Self {
        self.max_rounds = Some(max);
        self
    }

    pub fn with_confirmation(mut self, hook: Arc<dyn ConfirmationHook>) -> Self {
        self.confirmation = Some(hook);
        self
    }

    /// Whether `completed` rounds exhaust the budget.
    pub fn round_limit_reached(&self, completed: u32) -> bool {
        self.max_rounds.is_some_and(|max| completed >= max)
    }
}

impl std::fmt::Debug for LoopPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopPolicy")
            .field("max_rounds", &self.max_rounds)
            .field("single_tool_call", &self.single_tool_call)
            .field("confirmation", &self.confirmation.is_some())
            .finish()
    }
}
