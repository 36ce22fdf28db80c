//! Turn-taking control loop.
//!
//! Routes each turn between the model and the tool registry until the model
//! stops calling tools, with one special case: a `human_assistance` call
//! suspends the turn, persists a checkpoint, and returns control to the
//! caller. A later `resume` on the same thread completes the suspended call
//! and continues as if the tool had returned synchronously.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{DocentError, Result};
use crate::tools::human::HumanAssistanceTool;
use crate::tools::ToolRegistry;
use crate::types::{ModelMessage, ToolCall};

use super::store::{SuspensionCheckpoint, ThreadLocks, ThreadStore};
use super::turn::TurnExecutor;

/// Upper bound on model round-trips within a single turn.
const MAX_TURN_ITERATIONS: usize = 20;

/// Outcome of one external call into the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Terminal assistant message, surfaced to the adapter's sink.
    Completed { text: String },
    /// The turn is suspended awaiting human input for `query`.
    AwaitingInput { query: String },
}

/// The control loop, constructed once at startup and shared by adapters.
pub struct LoopRunner {
    executor: TurnExecutor,
    registry: Arc<ToolRegistry>,
    store: Arc<dyn ThreadStore>,
    locks: ThreadLocks,
}

impl LoopRunner {
    pub fn new(
        executor: TurnExecutor,
        registry: Arc<ToolRegistry>,
        store: Arc<dyn ThreadStore>,
    ) -> Self {
        Self {
            executor,
            registry,
            store,
            locks: ThreadLocks::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ThreadStore> {
        &self.store
    }

    /// Whether the thread is suspended awaiting human input.
    pub async fn has_pending_interrupt(&self, thread_id: &str) -> Result<bool> {
        Ok(self.store.load_checkpoint(thread_id).await?.is_some())
    }

    /// Run one turn for `thread_id` starting from new user input.
    pub async fn run(&self, thread_id: &str, user_text: &str) -> Result<TurnOutcome> {
        let _guard = self.locks.acquire(thread_id).await;

        if self.store.load_checkpoint(thread_id).await?.is_some() {
            return Err(DocentError::InvalidState(format!(
                "thread {thread_id} is awaiting human input; resume it instead"
            )));
        }

        debug!(thread_id, "turn start");
        let history = self.store.load(thread_id).await?;
        let turn = vec![ModelMessage::user(user_text)];
        self.drive(thread_id, history, turn).await
    }

    /// Resume a suspended turn with the human-provided answer.
    pub async fn resume(&self, thread_id: &str, data: &str) -> Result<TurnOutcome> {
        let _guard = self.locks.acquire(thread_id).await;

        let Some(checkpoint) = self.store.load_checkpoint(thread_id).await? else {
            return Err(DocentError::NoPendingInterrupt(thread_id.to_string()));
        };

        debug!(thread_id, call_id = %checkpoint.tool_call_id, "turn resume");

        // The suspended prefix ([.., user, assistant tool-call]) is already
        // durable; the human answer becomes the tool's result.
        let history = self.store.load(thread_id).await?;
        let turn = vec![ModelMessage::tool_result(
            checkpoint.tool_call_id,
            serde_json::Value::String(data.to_string()),
            false,
        )];
        let outcome = self.drive(thread_id, history, turn).await?;

        // The checkpoint outlives a failed resume so the thread stays
        // resumable; it is cleared only once the answer has been consumed.
        // A fresh suspension has already overwritten it via save_checkpoint.
        if matches!(outcome, TurnOutcome::Completed { .. }) {
            self.store.clear_checkpoint(thread_id).await?;
        }
        Ok(outcome)
    }

    /// State machine: MODEL → {DONE | TOOLS}; TOOLS → MODEL, or SUSPENDED
    /// for the human-assistance tool.
    ///
    /// `turn` buffers this turn's new messages; they are committed to the
    /// store only on DONE or SUSPENDED, so a fatal fault leaves the stored
    /// history untouched.
    async fn drive(
        &self,
        thread_id: &str,
        history: Vec<ModelMessage>,
        mut turn: Vec<ModelMessage>,
    ) -> Result<TurnOutcome> {
        let tool_defs = self.registry.definitions();
        let mut iterations = 0usize;

        loop {
            iterations += 1;
            if iterations > MAX_TURN_ITERATIONS {
                return Err(DocentError::InvalidState(
                    "tool loop exceeded max iterations".to_string(),
                ));
            }

            let combined: Vec<ModelMessage> =
                history.iter().chain(turn.iter()).cloned().collect();
            let assistant = self.executor.next_message(&combined, &tool_defs).await?;

            let Some(call) = assistant.tool_calls().first().map(|c| (*c).clone()) else {
                let text = assistant.text();
                turn.push(assistant);
                self.store.append(thread_id, &turn).await?;
                debug!(thread_id, iterations, "turn done");
                return Ok(TurnOutcome::Completed { text });
            };

            turn.push(assistant);

            if call.name == HumanAssistanceTool::NAME {
                let query = call
                    .arguments
                    .get("query")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                self.store.append(thread_id, &turn).await?;
                self.store
                    .save_checkpoint(thread_id, SuspensionCheckpoint::new(call.id, query.clone()))
                    .await?;
                debug!(thread_id, "turn suspended awaiting human input");
                return Ok(TurnOutcome::AwaitingInput { query });
            }

            turn.push(self.dispatch(&call).await);
        }
    }

    /// Ordinary tool dispatch. Unknown or failing tools become error tool
    /// results so the model can react; they are not retried here.
    async fn dispatch(&self, call: &ToolCall) -> ModelMessage {
        let result = match self.registry.get(&call.name) {
            Ok(tool) => tool.execute(&call.arguments).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(value) => {
                debug!(tool = %call.name, call_id = %call.id, "tool call succeeded");
                ModelMessage::tool_result(call.id.clone(), value, false)
            }
            Err(e) => {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "tool call failed");
                ModelMessage::tool_result(
                    call.id.clone(),
                    serde_json::json!({ "error": e.to_string() }),
                    true,
                )
            }
        }
    }
}
