//! Shellwright CLI: the main entry point.
//!
//! Reads ideas from the terminal and hands each one to the agent loop,
//! which keeps running shell commands until the model says it is done.
//! Type anything containing "stop" to quit.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use shellwright::interactive::{self, SessionOptions};
use shellwright_agent::{AgentLoop, LoopPolicy, current_platform, system_instruction};
use shellwright_config::AppConfig;
use shellwright_core::event::EventBus;
use tokio::io::BufReader;

#[derive(Parser)]
#[command(
    name = "shellwright",
    about = "Shellwright: describe what to build, watch the shell build it",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file to use instead of ~/.shellwright/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the model
    #[arg(short, long)]
    model: Option<String>,

    /// Stop a goal after this many tool rounds
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Start every goal with an empty conversation
    #[arg(long)]
    fresh: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with command output
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut config = AppConfig::load_with(cli.config.as_deref())
        .map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(max) = cli.max_rounds {
        if max == 0 {
            return Err("--max-rounds must be at least 1".into());
        }
        config.agent.max_rounds = Some(max);
    }

    // Fail before the first prompt rather than on the first request
    if let Err(e) = config.require_api_key() {
        eprintln!("{}", shellwright::startup_error_report(&e));
        std::process::exit(1);
    }

    let provider = shellwright_providers::build_from_config(&config)?;
    let tools = Arc::new(shellwright_tools::default_registry(&config.shell)?);
    let event_bus = Arc::new(EventBus::default());

    let platform = current_platform();
    let instruction = config
        .system_prompt_override
        .clone()
        .unwrap_or_else(|| system_instruction(platform));

    let agent = AgentLoop::new(
        provider,
        config.model.clone(),
        tools.clone(),
        instruction,
        event_bus.clone(),
    )
    .with_temperature(config.temperature)
    .with_max_output_tokens(config.max_output_tokens)
    .with_policy(LoopPolicy::from_config(&config.agent));

    println!("Current Platform: {platform}");
    println!("Model: {}", config.model);
    println!("Tools: {}", tools.names().join(", "));
    println!();

    let options = SessionOptions {
        fresh: cli.fresh || !config.agent.persist_history,
    };
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    interactive::run(&agent, &event_bus, stdin, &mut stdout, options).await?;

    Ok(())
}
