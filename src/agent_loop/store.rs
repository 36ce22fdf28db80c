//! Conversation state store.
//!
//! Durable, keyed-by-thread storage of message history and suspension
//! checkpoints. The in-memory implementation is the minimal conformance
//! level (durable for the process lifetime); the trait is the seam for
//! externally persisted stores.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::error::Result;
use crate::types::ModelMessage;

/// Snapshot of an in-flight turn suspended at a human-assistance call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuspensionCheckpoint {
    /// The tool call awaiting a human answer.
    pub tool_call_id: String,
    /// The query payload presented to the human.
    pub query: String,
    pub created_at: DateTime<Utc>,
}

impl SuspensionCheckpoint {
    pub fn new(tool_call_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            query: query.into(),
            created_at: Utc::now(),
        }
    }
}

/// Storage contract for conversation threads.
///
/// Operations on different thread ids are independent; callers serialize
/// turns on the same thread (see [`ThreadLocks`]).
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Load the message history for a thread, empty for unseen ids.
    async fn load(&self, thread_id: &str) -> Result<Vec<ModelMessage>>;

    /// Append messages at the end of a thread's history.
    async fn append(&self, thread_id: &str, messages: &[ModelMessage]) -> Result<()>;

    async fn save_checkpoint(
        &self,
        thread_id: &str,
        checkpoint: SuspensionCheckpoint,
    ) -> Result<()>;

    async fn load_checkpoint(&self, thread_id: &str) -> Result<Option<SuspensionCheckpoint>>;

    async fn clear_checkpoint(&self, thread_id: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
struct ThreadEntry {
    messages: Vec<ModelMessage>,
    checkpoint: Option<SuspensionCheckpoint>,
}

/// Process-lifetime in-memory store.
#[derive(Debug, Default)]
pub struct MemoryThreadStore {
    inner: RwLock<HashMap<String, ThreadEntry>>,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn load(&self, thread_id: &str) -> Result<Vec<ModelMessage>> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(thread_id)
            .map(|e| e.messages.clone())
            .unwrap_or_default())
    }

    async fn append(&self, thread_id: &str, messages: &[ModelMessage]) -> Result<()> {
        let mut inner = self.inner.write().await;
        let entry = inner.entry(thread_id.to_string()).or_default();
        entry.messages.extend_from_slice(messages);
        Ok(())
    }

    async fn save_checkpoint(
        &self,
        thread_id: &str,
        checkpoint: SuspensionCheckpoint,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        let entry = inner.entry(thread_id.to_string()).or_default();
        entry.checkpoint = Some(checkpoint);
        Ok(())
    }

    async fn load_checkpoint(&self, thread_id: &str) -> Result<Option<SuspensionCheckpoint>> {
        let inner = self.inner.read().await;
        Ok(inner.get(thread_id).and_then(|e| e.checkpoint.clone()))
    }

    async fn clear_checkpoint(&self, thread_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.get_mut(thread_id) {
            entry.checkpoint = None;
        }
        Ok(())
    }
}

/// Per-thread turn serialization: at most one in-flight turn per thread id.
#[derive(Debug, Default)]
pub struct ThreadLocks {
    inner: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ThreadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the turn lock for a thread, blocking other turns on the
    /// same id until the guard drops.
    pub async fn acquire(&self, thread_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut inner = self.inner.lock().expect("thread lock map poisoned");
            inner
                .entry(thread_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
