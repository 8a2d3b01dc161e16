//! The Shellwright agent loop.
//!
//! For each session goal the loop follows a **Query → Act → Observe** cycle:
//!
//! 1. **Append** the goal to the conversation log as a user turn
//! 2. **Send** the whole log, the system instruction and the tool specs to the model
//! 3. **If tool calls**: run them, append the results, loop back to step 2
//! 4. **If text**: append it and hand it back to the caller
//!
//! The loop is unbounded unless a [`LoopPolicy`] caps the number of rounds.

pub mod loop_runner;
pub mod policy;
pub mod prompt;

#[cfg(test)]
mod test_helpers;

pub use loop_runner::AgentLoop;
pub use policy::{ConfirmationHook, LoopPolicy};
pub use prompt::{current_platform, system_instruction};
