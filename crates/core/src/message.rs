//! Turn and ConversationLog domain types.
//!
//! These are the value objects that flow through the whole loop:
//! Operator types a goal → Orchestrator appends it → Provider reads the log →
//! tool results are appended → Provider reads the log again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LogError;

/// Unique identifier for a conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a turn.
///
/// Tool results are authored by `User`: the local side reports back to the
/// model on the operator's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A model's request to invoke one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Call ID, unique within the log
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Argument bag, expected to satisfy the tool's schema
    pub arguments: serde_json::Value,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: format!("call_{}", Uuid::new_v4().simple()),
            name: name.into(),
            arguments,
        }
    }
}

/// The text outcome of one tool call, as the model sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// ID of the request this answers
    pub call_id: String,

    /// Name of the tool that ran
    pub name: String,

    /// Rendered result text
    pub result: String,
}

/// One piece of a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Text(String),
    ToolCall(ToolCallRequest),
    ToolResult(ToolCallResult),
}

/// A single role-tagged entry in the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn new(role: Role, parts: Vec<Part>) -> Self {
        Self {
            role,
            parts,
            timestamp: Utc::now(),
        }
    }

    /// Concatenated text parts of this turn.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Tool-call requests carried by this turn, in order.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCallRequest> {
        self.parts.iter().filter_map(|p| match p {
            Part::ToolCall(call) => Some(call),
            _ => None,
        })
    }

    /// Tool-call results carried by this turn, in order.
    pub fn tool_results(&self) -> impl Iterator<Item = &ToolCallResult> {
        self.parts.iter().filter_map(|p| match p {
            Part::ToolResult(result) => Some(result),
            _ => None,
        })
    }

    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls().next().is_some()
    }

    pub fn has_tool_results(&self) -> bool {
        self.tool_results().next().is_some()
    }
}

/// An ordered, append-only sequence of turns.
///
/// Turns cannot be edited or removed once appended. Tool results are only
/// accepted directly after the model turn that requested them, with one
/// result per request in the same order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationLog {
    /// Unique log ID
    pub id: ConversationId,

    turns: Vec<Turn>,

    /// When this log was created
    pub created_at: DateTime<Utc>,

    /// When the last turn was appended
    pub updated_at: DateTime<Utc>,
}

impl ConversationLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn append(&mut self, turn: Turn) {
        self.updated_at = Utc::now();
        self.turns.push(turn);
    }

    /// Append the operator's goal (or any user text).
    pub fn push_user_text(&mut self, text: impl Into<String>) {
        self.append(Turn::new(Role::User, vec![Part::Text(text.into())]));
    }

    /// Append a plain-text model reply.
    pub fn push_model_text(&mut self, text: impl Into<String>) {
        self.append(Turn::new(Role::Model, vec![Part::Text(text.into())]));
    }

    /// Append a model turn requesting one or more tool calls.
    pub fn push_tool_calls(&mut self, calls: Vec<ToolCallRequest>) -> Result<(), LogError> {
        if calls.is_empty() {
            return Err(LogError::EmptyTurn);
        }
        let parts = calls.into_iter().map(Part::ToolCall).collect();
        self.append(Turn::new(Role::Model, parts));
        Ok(())
    }

    /// Append the user turn answering the previous model turn's tool calls.
    pub fn push_tool_results(&mut self, results: Vec<ToolCallResult>) -> Result<(), LogError> {
        let pending = self.pending_tool_calls();
        if pending.is_empty() {
            return Err(LogError::OrphanToolResults);
        }
        if pending.len() != results.len() {
            return Err(LogError::ToolResultCount {
                expected: pending.len(),
                found: results.len(),
            });
        }
        for (call, result) in pending.iter().zip(&results) {
            if call.id != result.call_id || call.name != result.name {
                return Err(LogError::MismatchedToolResult {
                    expected: call.name.clone(),
                    found: result.name.clone(),
                });
            }
        }

        let parts = results.into_iter().map(Part::ToolResult).collect();
        self.append(Turn::new(Role::User, parts));
        Ok(())
    }

    /// Tool calls in the last turn that have not been answered yet.
    pub fn pending_tool_calls(&self) -> Vec<&ToolCallRequest> {
        match self.turns.last() {
            Some(turn) if turn.role == Role::Model => turn.tool_calls().collect(),
            _ => Vec::new(),
        }
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of model turns that requested tools.
    pub fn tool_rounds(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.role == Role::Model && t.has_tool_calls())
            .count()
    }

    /// Re-check the ordering rules over the whole log.
    pub fn check_invariants(&self) -> Result<(), LogError> {
        for (i, turn) in self.turns.iter().enumerate() {
            if turn.parts.is_empty() {
                return Err(LogError::EmptyTurn);
            }
            if !turn.has_tool_results() {
                continue;
            }
            let Some(prev) = i.checked_sub(1).map(|j| &self.turns[j]) else {
                return Err(LogError::OrphanToolResults);
            };
            if turn.role != Role::User || prev.role != Role::Model || !prev.has_tool_calls() {
                return Err(LogError::OrphanToolResults);
            }
            let calls: Vec<_> = prev.tool_calls().collect();
            let results: Vec<_> = turn.tool_results().collect();
            if calls.len() != results.len() {
                return Err(LogError::ToolResultCount {
                    expected: calls.len(),
                    found: results.len(),
                });
            }
            for (call, result) in calls.iter().zip(results) {
                if call.id != result.call_id {
                    return Err(LogError::MismatchedToolResult {
                        expected: call.name.clone(),
                        found: result.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mkdir_call() -> ToolCallRequest {
        ToolCallRequest::new("executeCommand", serde_json::json!({"command": "mkdir demo"}))
    }

    fn result_for(call: &ToolCallRequest, text: &str) -> ToolCallResult {
        ToolCallResult {
            call_id: call.id.clone(),
            name: call.name.clone(),
            result: text.into(),
        }
    }

    #[test]
    fn user_goal_seeds_log() {
        let mut log = ConversationLog::new();
        let created = log.created_at;
        log.push_user_text("build a site");
        assert_eq!(log.len(), 1);
        assert_eq!(log.turns()[0].role, Role::User);
        assert_eq!(log.turns()[0].text(), "build a site");
        assert!(log.updated_at >= created);
    }

    #[test]
    fn tool_results_follow_their_request() {
        let mut log = ConversationLog::new();
        log.push_user_text("make a folder");
        let call = mkdir_call();
        log.push_tool_calls(vec![call.clone()]).unwrap();
        assert_eq!(log.pending_tool_calls().len(), 1);

        log.push_tool_results(vec![result_for(&call, "Success: ")]).unwrap();
        assert!(log.pending_tool_calls().is_empty());
        assert_eq!(log.last().unwrap().role, Role::User);
        assert!(log.check_invariants().is_ok());
        assert_eq!(log.tool_rounds(), 1);
    }

    #[test]
    fn orphan_results_rejected() {
        let mut log = ConversationLog::new();
        log.push_user_text("hi");
        let call = mkdir_call();
        let err = log.push_tool_results(vec![result_for(&call, "x")]).unwrap_err();
        assert_eq!(err, LogError::OrphanToolResults);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn results_for_answered_round_rejected() {
        let mut log = ConversationLog::new();
        let call = mkdir_call();
        log.push_tool_calls(vec![call.clone()]).unwrap();
        log.push_tool_results(vec![result_for(&call, "ok")]).unwrap();
        let err = log.push_tool_results(vec![result_for(&call, "again")]).unwrap_err();
        assert_eq!(err, LogError::OrphanToolResults);
    }

    #[test]
    fn mismatched_result_rejected() {
        let mut log = ConversationLog::new();
        let call = mkdir_call();
        log.push_tool_calls(vec![call]).unwrap();
        let other = ToolCallRequest::new("otherTool", serde_json::json!({}));
        let err = log.push_tool_results(vec![result_for(&other, "x")]).unwrap_err();
        assert!(matches!(err, LogError::MismatchedToolResult { .. }));
    }

    #[test]
    fn result_count_must_match() {
        let mut log = ConversationLog::new();
        let first = mkdir_call();
        let second = ToolCallRequest::new("executeCommand", serde_json::json!({"command": "ls"}));
        log.push_tool_calls(vec![first.clone(), second]).unwrap();
        let err = log.push_tool_results(vec![result_for(&first, "ok")]).unwrap_err();
        assert_eq!(err, LogError::ToolResultCount { expected: 2, found: 1 });
    }

    #[test]
    fn empty_tool_call_turn_rejected() {
        let mut log = ConversationLog::new();
        assert_eq!(log.push_tool_calls(vec![]).unwrap_err(), LogError::EmptyTurn);
        assert!(log.is_empty());
    }

    #[test]
    fn call_ids_are_unique() {
        let a = mkdir_call();
        let b = mkdir_call();
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("call_"));
    }

    #[test]
    fn part_serializes_with_snake_case_tag() {
        let part = Part::ToolCall(mkdir_call());
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["tool_call"]["name"], "executeCommand");
        assert_eq!(json["tool_call"]["arguments"]["command"], "mkdir demo");
    }
}
