//! Model provider trait and the Anthropic implementation.

pub mod anthropic;
pub mod http;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ModelMessage, ToolCall};

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub tools: Option<Vec<ToolDefinition>>,
    pub max_tokens: Option<u32>,
}

/// Tool definition declared to the provider API.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
}

/// Core trait implemented by model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "anthropic").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Produce the next assistant response for an ordered message history.
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse>;
}
