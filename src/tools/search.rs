//! Tavily web search tool.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{DocentError, Result};
use crate::provider::http::shared_client;

use super::tool::{required_str, Tool, ToolParameters};

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const MAX_RESULTS: u32 = 2;

/// Web search backed by the Tavily API.
pub struct SearchTool {
    api_key: String,
    base_url: String,
    parameters: ToolParameters,
}

impl SearchTool {
    pub const NAME: &'static str = "search";

    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            parameters: ToolParameters::object()
                .string("query", "The search query", true)
                .build(),
        }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Search the web for current information"
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &serde_json::Value) -> Result<serde_json::Value> {
        let query = required_str(args, "query")
            .map_err(|_| DocentError::tool(Self::NAME, "missing required argument: query"))?;

        debug!(query, "tavily search");

        let body = serde_json::json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": MAX_RESULTS,
        });

        let resp = shared_client()
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| DocentError::tool(Self::NAME, e.to_string()))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let text = resp.text().await.unwrap_or_default();
            return Err(DocentError::tool(
                Self::NAME,
                format!("search API returned {status}: {text}"),
            ));
        }

        let data: SearchResponse = resp
            .json()
            .await
            .map_err(|e| DocentError::tool(Self::NAME, e.to_string()))?;

        Ok(serde_json::json!({ "results": data.results }))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}
