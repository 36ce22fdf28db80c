//! Webhook server — translates comment-lifecycle events into loop turns.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::agent_loop::{LoopRunner, TurnOutcome};
use crate::error::{DocentError, Result};
use crate::workspace::Workspace;

/// Shared server state: the engine plus the workspace sink.
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<LoopRunner>,
    pub workspace: Arc<dyn Workspace>,
}

/// JSON envelope returned by every route.
#[derive(Debug, Serialize)]
pub struct StatusEnvelope {
    pub status: &'static str,
    pub message: String,
}

impl StatusEnvelope {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok",
            message: message.into(),
        }
    }

    fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

/// Build the webhook router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/events", post(events))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn liveness() -> Json<StatusEnvelope> {
    Json(StatusEnvelope::ok("docent webhook server is running"))
}

async fn events(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> (StatusCode, Json<StatusEnvelope>) {
    let kind = payload
        .get("type")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    if kind != "comment.created" {
        // Updated/deleted comments and unrelated event types never reach
        // the loop.
        return (
            StatusCode::OK,
            Json(StatusEnvelope::success(format!("ignored event: {kind}"))),
        );
    }

    let author_kind = payload
        .pointer("/authors/0/type")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    if author_kind != "person" {
        // The agent must never react to its own posted replies.
        return (
            StatusCode::OK,
            Json(StatusEnvelope::success("ignored non-person author")),
        );
    }

    match handle_comment_created(&state, &payload).await {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusEnvelope::success("reply posted")),
        ),
        Err(e) => {
            warn!(error = %e, "event handling failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusEnvelope::error(e.to_string())),
            )
        }
    }
}

async fn handle_comment_created(state: &AppState, payload: &serde_json::Value) -> Result<()> {
    let parent_id = payload
        .pointer("/data/parent/id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| DocentError::MalformedEvent("missing data.parent.id".to_string()))?;
    let entity_id = payload
        .pointer("/entity/id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| DocentError::MalformedEvent("missing entity.id".to_string()))?;

    let comments = state.workspace.list_comments(parent_id).await?;
    let comment = comments
        .iter()
        .find(|c| c.id == entity_id)
        .ok_or_else(|| {
            DocentError::MalformedEvent(format!("no comment matching entity {entity_id}"))
        })?;

    let thread_id = comment.discussion_id.clone();
    info!(thread_id, comment_id = %comment.id, "comment event accepted");

    // A comment arriving on a suspended thread is the human's answer.
    let outcome = if state.runner.has_pending_interrupt(&thread_id).await? {
        state.runner.resume(&thread_id, &comment.plain_text).await?
    } else {
        state.runner.run(&thread_id, &comment.plain_text).await?
    };

    let reply = match outcome {
        TurnOutcome::Completed { text } => text,
        TurnOutcome::AwaitingInput { query } => {
            format!("[human assistance requested] {query}")
        }
    };

    state.workspace.create_reply(&thread_id, &reply).await
}
