//! # Shellwright Core
//!
//! Domain types, traits, and error definitions for the Shellwright agent loop.
//! This crate has **no I/O**: it defines the domain model that all other
//! crates implement against.
//!
//! - [`ConversationLog`]: the append-only sequence of [`Turn`]s sent to the model
//! - [`Provider`]: the request/response boundary to a remote model
//! - [`Tool`] / [`ToolRegistry`]: named, schema-described capabilities
//! - [`EventBus`]: progress events for whoever is watching

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, LogError, ProviderError, Result, ToolError};
pub use event::{DomainEvent, EventBus};
pub use message::{ConversationId, ConversationLog, Part, Role, ToolCallRequest, ToolCallResult, Turn};
pub use provider::{ModelReply, Provider, ProviderRequest, ProviderResponse, Usage};
pub use tool::{ExecutionResult, Tool, ToolRegistry, ToolSpec};
