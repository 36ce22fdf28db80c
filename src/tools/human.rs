//! Human-assistance tool.
//!
//! Registered so its schema reaches the model, but never executed inline:
//! the control loop intercepts calls by name and suspends the turn until a
//! human answer arrives (see `agent_loop::runner`).

use async_trait::async_trait;

use crate::error::{DocentError, Result};

use super::tool::{Tool, ToolParameters};

pub struct HumanAssistanceTool {
    parameters: ToolParameters,
}

impl HumanAssistanceTool {
    pub const NAME: &'static str = "human_assistance";

    pub fn new() -> Self {
        Self {
            parameters: ToolParameters::object()
                .string("query", "The question to ask a human", true)
                .build(),
        }
    }
}

impl Default for HumanAssistanceTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for HumanAssistanceTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Request assistance from a human"
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, _args: &serde_json::Value) -> Result<serde_json::Value> {
        // The loop must suspend before dispatch ever reaches this point.
        Err(DocentError::InvalidState(
            "human_assistance must be handled by the loop, not dispatched".to_string(),
        ))
    }
}
