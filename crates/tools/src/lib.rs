//! Built-in tool implementations for Shellwright.
//!
//! Currently one tool: `executeCommand`, which runs a shell command line.

pub mod shell;

use shellwright_config::ShellConfig;
use shellwright_core::error::ToolError;
use shellwright_core::tool::ToolRegistry;

pub use shell::ShellTool;

/// Create the tool registry from shell settings.
///
/// Defaults are unrestricted: an empty allowlist lets every command through.
pub fn default_registry(config: &ShellConfig) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(
        ShellTool::new()
            .with_allowed_commands(config.allowed_commands.clone())
            .with_stderr_is_failure(config.stderr_is_failure),
    ))?;
    Ok(registry)
}
