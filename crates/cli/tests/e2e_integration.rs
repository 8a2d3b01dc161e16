//! End-to-end integration tests for Shellwright.
//!
//! These drive the full pipeline from a typed goal to printed output with a
//! scripted model and the real shell tool working inside a temp directory.

use std::path::Path;
use std::sync::{Arc, Mutex};

use shellwright::interactive::{self, FAREWELL, SessionOptions};
use shellwright_agent::{AgentLoop, LoopPolicy};
use shellwright_core::error::ProviderError;
use shellwright_core::event::EventBus;
use shellwright_core::message::{ConversationLog, Role};
use shellwright_core::provider::{
    ModelReply, Provider, ProviderRequest, ProviderResponse, Usage,
};
use shellwright_core::tool::ToolRegistry;
use shellwright_tools::ShellTool;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted replies in sequence.
struct ScriptedProvider {
    replies: Mutex<Vec<ModelReply>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<ModelReply>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_request(&self) -> ProviderRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            panic!("ScriptedProvider exhausted after {} calls", self.calls());
        }
        self.requests.lock().unwrap().push(request);
        Ok(ProviderResponse {
            reply: replies.remove(0),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "e2e-model".into(),
        })
    }
}

fn command(cmd: &str) -> ModelReply {
    ModelReply::tool_call("executeCommand", serde_json::json!({ "command": cmd }))
}

fn shell_agent(provider: Arc<ScriptedProvider>, dir: &Path, bus: Arc<EventBus>) -> AgentLoop {
    let mut tools = ToolRegistry::new();
    tools
        .register(Box::new(ShellTool::new().with_working_dir(dir)))
        .unwrap();
    AgentLoop::new(
        provider,
        "e2e-model",
        Arc::new(tools),
        shellwright_agent::system_instruction("linux"),
        bus,
    )
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[cfg(unix)]
#[tokio::test]
async fn e2e_builds_folder_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::new(vec![
        command("mkdir demo"),
        command("touch demo/index.html"),
        ModelReply::text("Created demo/index.html"),
    ]));
    let agent = shell_agent(provider.clone(), dir.path(), Arc::new(EventBus::default()));

    let mut log = ConversationLog::new();
    let reply = agent
        .process(&mut log, "create a folder named demo and a file demo/index.html inside it")
        .await
        .unwrap();

    assert_eq!(reply, "Created demo/index.html");
    assert!(dir.path().join("demo").is_dir());
    assert!(dir.path().join("demo/index.html").is_file());

    assert_eq!(log.len(), 6);
    assert_eq!(log.tool_rounds(), 2);
    log.check_invariants().unwrap();
    for turn in &log.turns()[2..] {
        for result in turn.tool_results() {
            assert!(result.result.starts_with("Success:"), "{}", result.result);
        }
    }
    assert_eq!(provider.calls(), 3);
}

#[cfg(unix)]
#[tokio::test]
async fn e2e_failed_command_reaches_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::new(vec![
        command("ls xyz"),
        ModelReply::text("There is no xyz directory here."),
    ]));
    let agent = shell_agent(provider.clone(), dir.path(), Arc::new(EventBus::default()));

    let mut log = ConversationLog::new();
    let reply = agent.process(&mut log, "list xyz").await.unwrap();
    assert_eq!(reply, "There is no xyz directory here.");

    let results: Vec<_> = log.turns()[2].tool_results().collect();
    assert_eq!(results.len(), 1);
    assert!(results[0].result.starts_with("Error:"));
    assert!(results[0].result.contains("xyz"));

    // The model saw the failure on its second request
    let second = provider.last_request();
    assert_eq!(second.turns.len(), 3);
    assert_eq!(second.turns[2].role, Role::User);
}

#[cfg(unix)]
#[tokio::test]
async fn e2e_terminal_session_prints_progress() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::new(vec![
        command("mkdir site"),
        ModelReply::text("Your site folder is ready."),
    ]));
    let bus = Arc::new(EventBus::default());
    let agent = shell_agent(provider.clone(), dir.path(), bus.clone());

    let mut out = Vec::new();
    interactive::run(
        &agent,
        &bus,
        "make a site folder\nSTOP\n".as_bytes(),
        &mut out,
        SessionOptions::default(),
    )
    .await
    .unwrap();
    let output = String::from_utf8(out).unwrap();

    assert!(dir.path().join("site").is_dir());
    assert!(output.contains("Executing: mkdir site"));
    assert!(output.contains("Result: Success:"));
    assert!(output.contains("Your site folder is ready."));
    assert!(output.ends_with(&format!("{FAREWELL}\n")));
    assert_eq!(provider.calls(), 2);
}

#[cfg(unix)]
#[tokio::test]
async fn e2e_unstartable_command_is_reported_to_the_model() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        command("echo hi"),
        ModelReply::text("done"),
    ]));
    let agent = shell_agent(
        provider,
        Path::new("/nonexistent/shellwright-e2e"),
        Arc::new(EventBus::default()),
    );

    let mut log = ConversationLog::new();
    let reply = agent.process(&mut log, "say hi").await.unwrap();
    assert_eq!(reply, "done");

    let result = log.turns()[2].tool_results().next().unwrap();
    assert!(result.result.starts_with("Error: No such file or directory"));
    log.check_invariants().unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn e2e_round_limit_keeps_log_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::new(vec![
        command("echo one"),
        command("echo two"),
    ]));
    let agent = shell_agent(provider, dir.path(), Arc::new(EventBus::default()))
        .with_policy(LoopPolicy::unbounded().with_max_rounds(1));

    let mut log = ConversationLog::new();
    let reply = agent.process(&mut log, "echo forever").await.unwrap();
    assert!(reply.contains("Stopped after 1 tool round without finishing"));
    log.check_invariants().unwrap();
    assert_eq!(log.last().unwrap().role, Role::Model);
}
