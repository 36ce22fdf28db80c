//! Shared test support: scripted model provider, recording tools, and a
//! mock workspace.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use docent::agent_loop::{LoopRunner, MemoryThreadStore, TurnExecutor};
use docent::error::{DocentError, Result};
use docent::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use docent::tools::human::HumanAssistanceTool;
use docent::tools::{Tool, ToolParameters, ToolRegistry};
use docent::types::ToolCall;
use docent::workspace::{Comment, Workspace};

/// Provider that replays a fixed script of responses.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<ProviderResponse>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Append a response to the script mid-test.
    pub fn push(&self, response: ProviderResponse) {
        self.responses
            .lock()
            .expect("script lock")
            .push_back(response);
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, _request: &ProviderRequest) -> Result<ProviderResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .expect("script lock")
            .pop_front()
            .ok_or_else(|| DocentError::InvalidState("scripted provider exhausted".to_string()))
    }
}

/// A terminal assistant response.
pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        text: text.to_string(),
        tool_calls: vec![],
    }
}

/// A response requesting one tool call.
pub fn tool_call_response(id: &str, name: &str, arguments: serde_json::Value) -> ProviderResponse {
    ProviderResponse {
        text: String::new(),
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }],
    }
}

/// Tool that records invocations and returns a fixed payload.
pub struct RecordingTool {
    name: String,
    result: serde_json::Value,
    parameters: ToolParameters,
    pub invocations: Mutex<Vec<serde_json::Value>>,
}

impl RecordingTool {
    pub fn new(name: &str, result: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            result,
            parameters: ToolParameters::empty(),
            invocations: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "recording test tool"
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &serde_json::Value) -> Result<serde_json::Value> {
        self.invocations.lock().expect("invocation lock").push(args.clone());
        Ok(self.result.clone())
    }
}

/// Tool that always fails.
pub struct FailingTool {
    parameters: ToolParameters,
}

impl FailingTool {
    pub fn new() -> Self {
        Self {
            parameters: ToolParameters::empty(),
        }
    }
}

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "flaky"
    }

    fn description(&self) -> &str {
        "always fails"
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, _args: &serde_json::Value) -> Result<serde_json::Value> {
        Err(DocentError::tool("flaky", "simulated failure"))
    }
}

/// Build a runner over a scripted provider, a recording `search` tool, and
/// the human-assistance tool.
pub fn runner_with_script(
    responses: Vec<ProviderResponse>,
) -> (Arc<LoopRunner>, Arc<ScriptedProvider>, Arc<RecordingTool>) {
    let provider = Arc::new(ScriptedProvider::new(responses));
    let search = Arc::new(RecordingTool::new(
        "search",
        serde_json::json!({ "results": ["sunny, 72F"] }),
    ));
    let tools: Vec<Arc<dyn Tool>> = vec![search.clone(), Arc::new(HumanAssistanceTool::new())];
    let registry = Arc::new(ToolRegistry::from_tools(tools).expect("registry"));
    let store = Arc::new(MemoryThreadStore::new());
    let runner = Arc::new(LoopRunner::new(
        TurnExecutor::new(provider.clone()),
        registry,
        store,
    ));
    (runner, provider, search)
}

/// Workspace mock: preset comment listing, recorded replies.
#[derive(Default)]
pub struct MockWorkspace {
    pub comments: Mutex<Vec<Comment>>,
    pub replies: Mutex<Vec<(String, String)>>,
    pub list_calls: AtomicUsize,
}

impl MockWorkspace {
    pub fn with_comments(comments: Vec<Comment>) -> Self {
        Self {
            comments: Mutex::new(comments),
            ..Default::default()
        }
    }

    pub fn reply_count(&self) -> usize {
        self.replies.lock().expect("replies lock").len()
    }
}

#[async_trait]
impl Workspace for MockWorkspace {
    async fn list_comments(&self, _block_id: &str) -> Result<Vec<Comment>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.comments.lock().expect("comments lock").clone())
    }

    async fn create_reply(&self, discussion_id: &str, text: &str) -> Result<()> {
        self.replies
            .lock()
            .expect("replies lock")
            .push((discussion_id.to_string(), text.to_string()));
        Ok(())
    }
}
