//! Interactive prompt loop: one line in, one session goal out.

use std::io::Write;

use shellwright_agent::AgentLoop;
use shellwright_agent::loop_runner::describe_arguments;
use shellwright_core::event::{DomainEvent, EventBus};
use shellwright_core::message::ConversationLog;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const PROMPT: &str = "Enter your idea: ";
pub const WELCOME: &str = "Welcome to the AI Agentic IDE! You can ask me to build a website or solve problems related to web development.";
pub const FAREWELL: &str = "Goodbye! Thanks for using the AI agent.";

/// Any line containing "stop", in any casing, ends the session.
pub fn is_exit_phrase(line: &str) -> bool {
    line.to_lowercase().contains("stop")
}

/// Prompt loop settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Start every goal with an empty conversation log
    pub fresh: bool,
}

/// Read goals from `input` until an exit phrase or EOF, running each one
/// through `agent` and writing progress and replies to `out`.
///
/// Model or network failures are reported and the loop prompts again.
pub async fn run<R, W>(
    agent: &AgentLoop,
    bus: &EventBus,
    input: R,
    out: &mut W,
    options: SessionOptions,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut log = ConversationLog::new();
    let mut events = bus.subscribe();

    loop {
        writeln!(out, "{WELCOME}")?;
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let goal = line.trim();
        if goal.is_empty() {
            continue;
        }
        if is_exit_phrase(goal) {
            break;
        }

        if options.fresh {
            log = ConversationLog::new();
        }

        let outcome = {
            let work = agent.process(&mut log, goal);
            tokio::pin!(work);
            loop {
                tokio::select! {
                    result = &mut work => break result,
                    Ok(event) = events.recv() => render_event(out, &event)?,
                }
            }
        };
        // Events published just before the goal finished
        while let Ok(event) = events.try_recv() {
            render_event(out, &event)?;
        }

        match outcome {
            Ok(text) => writeln!(out, "{text}")?,
            Err(e) => {
                tracing::warn!(error = %e, "Goal failed");
                writeln!(out, "Error: {e}")?;
            }
        }
    }

    writeln!(out, "{FAREWELL}")?;
    out.flush()
}

fn render_event<W: Write>(out: &mut W, event: &DomainEvent) -> std::io::Result<()> {
    match event {
        DomainEvent::ToolCallRequested {
            tool_name,
            arguments,
            ..
        } => writeln!(out, "Executing: {}", describe_arguments(tool_name, arguments)),
        DomainEvent::ToolExecuted { output, .. } => writeln!(out, "Result: {output}"),
        _ => Ok(()),
    }
}
