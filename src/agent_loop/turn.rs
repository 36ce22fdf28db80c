//! Turn executor — produces the next assistant message.

use std::sync::Arc;

use crate::error::{DocentError, Result};
use crate::provider::{ModelProvider, ProviderRequest, ToolDefinition};
use crate::types::{ContentPart, ModelMessage, Role};

/// Invokes the model with the full ordered history and the declared tool
/// set, yielding either a terminal assistant message or one carrying
/// exactly one tool call.
pub struct TurnExecutor {
    provider: Arc<dyn ModelProvider>,
}

impl TurnExecutor {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self { provider }
    }

    /// Produce the next message for `history`.
    ///
    /// A model response proposing more than one tool call is an invariant
    /// violation, not a recoverable error: fail loudly rather than pick one.
    pub async fn next_message(
        &self,
        history: &[ModelMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelMessage> {
        let request = ProviderRequest {
            messages: history.to_vec(),
            tools: (!tools.is_empty()).then(|| tools.to_vec()),
            max_tokens: None,
        };

        let response = self.provider.generate(&request).await?;

        if response.tool_calls.len() > 1 {
            return Err(DocentError::InvariantViolation {
                count: response.tool_calls.len(),
            });
        }

        let mut content = Vec::new();
        if !response.text.is_empty() {
            content.push(ContentPart::Text {
                text: response.text,
            });
        }
        for call in response.tool_calls {
            content.push(ContentPart::ToolCall(call));
        }
        if content.is_empty() {
            content.push(ContentPart::Text {
                text: String::new(),
            });
        }

        Ok(ModelMessage {
            role: Role::Assistant,
            content,
            timestamp: Some(chrono::Utc::now()),
        })
    }
}
