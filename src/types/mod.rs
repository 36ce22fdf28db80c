//! Core data types shared across the crate.

pub mod message;

pub use message::{ContentPart, ModelMessage, Role, ToolCall, ToolResult};
