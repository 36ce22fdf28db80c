//! Error types for Docent.

use thiserror::Error;

/// Primary error type for all Docent operations.
#[derive(Error, Debug)]
pub enum DocentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool execution error: {tool_name} — {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Turn invariant violated: model proposed {count} tool calls in one turn")]
    InvariantViolation { count: usize },

    #[error("No pending interrupt for thread: {0}")]
    NoPendingInterrupt(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl DocentError {
    /// Create an API error from a status code and response body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a tool execution error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, DocentError>;
