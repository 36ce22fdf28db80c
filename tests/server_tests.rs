//! Webhook adapter behavior: liveness, event filtering, reply flow.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use common::{runner_with_script, text_response, tool_call_response, MockWorkspace, ScriptedProvider};
use docent::server::{router, AppState};
use docent::workspace::Comment;

fn app(
    responses: Vec<docent::provider::ProviderResponse>,
    comments: Vec<Comment>,
) -> (Router, Arc<ScriptedProvider>, Arc<MockWorkspace>) {
    let (runner, provider, _) = runner_with_script(responses);
    let workspace = Arc::new(MockWorkspace::with_comments(comments));
    let state = AppState {
        runner,
        workspace: workspace.clone(),
    };
    (router(state), provider, workspace)
}

fn post_event(payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/events")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn created_by_person() -> serde_json::Value {
    serde_json::json!({
        "type": "comment.created",
        "authors": [{"type": "person"}],
        "data": {"parent": {"id": "blk-1"}},
        "entity": {"id": "cmt-1"},
    })
}

#[tokio::test]
async fn liveness_always_ok() {
    let (app, _, _) = app(vec![], vec![]);
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn deleted_and_updated_events_never_reach_the_loop() {
    for kind in ["comment.deleted", "comment.updated", "page.created"] {
        let (app, provider, workspace) = app(vec![], vec![]);
        let response = app
            .oneshot(post_event(serde_json::json!({"type": kind})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(provider.call_count(), 0);
        assert_eq!(workspace.reply_count(), 0);
    }
}

#[tokio::test]
async fn bot_authored_comments_never_trigger_recursion() {
    let (app, provider, workspace) = app(vec![], vec![]);
    let payload = serde_json::json!({
        "type": "comment.created",
        "authors": [{"type": "bot"}],
        "data": {"parent": {"id": "blk-1"}},
        "entity": {"id": "cmt-1"},
    });
    let response = app.oneshot(post_event(payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(provider.call_count(), 0);
    assert_eq!(workspace.reply_count(), 0);
}

#[tokio::test]
async fn person_comment_gets_a_reply_in_its_discussion() {
    let (app, provider, workspace) = app(
        vec![text_response("hello from the agent")],
        vec![Comment {
            id: "cmt-1".into(),
            discussion_id: "disc-9".into(),
            plain_text: "hey agent".into(),
        }],
    );

    let response = app.oneshot(post_event(created_by_person())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");

    assert_eq!(provider.call_count(), 1);
    let replies = workspace.replies.lock().unwrap();
    assert_eq!(
        *replies,
        vec![("disc-9".to_string(), "hello from the agent".to_string())]
    );
}

#[tokio::test]
async fn suspension_posts_the_query_into_the_discussion() {
    let (app, _, workspace) = app(
        vec![tool_call_response(
            "call_h",
            "human_assistance",
            serde_json::json!({"query": "which project?"}),
        )],
        vec![Comment {
            id: "cmt-1".into(),
            discussion_id: "disc-9".into(),
            plain_text: "please help".into(),
        }],
    );

    let response = app.oneshot(post_event(created_by_person())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let replies = workspace.replies.lock().unwrap();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].1.contains("which project?"));
}

#[tokio::test]
async fn followup_comment_resumes_a_suspended_thread() {
    let (app, provider, workspace) = app(
        vec![
            tool_call_response(
                "call_h",
                "human_assistance",
                serde_json::json!({"query": "which project?"}),
            ),
            text_response("resolved: the atlas project"),
        ],
        vec![Comment {
            id: "cmt-1".into(),
            discussion_id: "disc-9".into(),
            plain_text: "please help".into(),
        }],
    );

    // First comment suspends the thread.
    let response = app
        .clone()
        .oneshot(post_event(created_by_person()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A followup person comment in the same discussion is the human answer.
    {
        let mut comments = workspace.comments.lock().unwrap();
        comments.push(Comment {
            id: "cmt-2".into(),
            discussion_id: "disc-9".into(),
            plain_text: "atlas".into(),
        });
    }
    let payload = serde_json::json!({
        "type": "comment.created",
        "authors": [{"type": "person"}],
        "data": {"parent": {"id": "blk-1"}},
        "entity": {"id": "cmt-2"},
    });
    let response = app.oneshot(post_event(payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(provider.call_count(), 2);
    let replies = workspace.replies.lock().unwrap();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[1].1, "resolved: the atlas project");
}

#[tokio::test]
async fn missing_fields_return_500_and_leave_state_untouched() {
    let (app, provider, workspace) = app(vec![], vec![]);
    let payload = serde_json::json!({
        "type": "comment.created",
        "authors": [{"type": "person"}],
    });
    let response = app.oneshot(post_event(payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(provider.call_count(), 0);
    assert_eq!(workspace.reply_count(), 0);
}

#[tokio::test]
async fn unmatched_comment_returns_500() {
    let (app, provider, _) = app(
        vec![],
        vec![Comment {
            id: "cmt-other".into(),
            discussion_id: "disc-9".into(),
            plain_text: "unrelated".into(),
        }],
    );
    let response = app.oneshot(post_event(created_by_person())).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn server_survives_a_failed_event() {
    let (app, _, _) = app(vec![], vec![]);

    let bad = serde_json::json!({"type": "comment.created", "authors": [{"type": "person"}]});
    let response = app.clone().oneshot(post_event(bad)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
