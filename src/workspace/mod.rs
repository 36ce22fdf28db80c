//! Document-workspace comment API client.
//!
//! Covers exactly the two outbound calls the webhook adapter needs: list
//! the comments under a block, and post a reply into a discussion thread.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::provider::http::{bearer_headers, shared_client, status_to_error};

const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// A comment in a workspace discussion.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub discussion_id: String,
    pub plain_text: String,
}

/// Comment-thread API surface used by the webhook adapter.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// List comments under a parent block, in the API's order.
    async fn list_comments(&self, block_id: &str) -> Result<Vec<Comment>>;

    /// Post a reply into a discussion thread.
    async fn create_reply(&self, discussion_id: &str, text: &str) -> Result<()>;
}

/// Notion-backed workspace client.
pub struct NotionWorkspace {
    api_key: String,
    base_url: String,
}

impl NotionWorkspace {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = bearer_headers(&self.api_key);
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));
        headers
    }
}

#[async_trait]
impl Workspace for NotionWorkspace {
    async fn list_comments(&self, block_id: &str) -> Result<Vec<Comment>> {
        debug!(block_id, "list workspace comments");

        let resp = shared_client()
            .get(format!("{}/comments", self.base_url))
            .headers(self.headers())
            .query(&[("block_id", block_id)])
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body));
        }

        let data: CommentList = resp.json().await?;
        Ok(data
            .results
            .into_iter()
            .map(|c| Comment {
                id: c.id,
                discussion_id: c.discussion_id,
                plain_text: c
                    .rich_text
                    .iter()
                    .map(|rt| rt.plain_text.as_str())
                    .collect::<Vec<_>>()
                    .join(""),
            })
            .collect())
    }

    async fn create_reply(&self, discussion_id: &str, text: &str) -> Result<()> {
        debug!(discussion_id, "create workspace reply");

        let body = serde_json::json!({
            "parent": { "discussion_id": discussion_id },
            "rich_text": [{ "text": { "content": text } }],
        });

        let resp = shared_client()
            .post(format!("{}/comments", self.base_url))
            .headers(self.headers())
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CommentList {
    #[serde(default)]
    results: Vec<RawComment>,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    id: String,
    discussion_id: String,
    #[serde(default)]
    rich_text: Vec<RichText>,
}

#[derive(Debug, Deserialize)]
struct RichText {
    #[serde(default)]
    plain_text: String,
}
