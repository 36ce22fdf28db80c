//! Tool trait, registry, and the built-in tools.

pub mod human;
pub mod registry;
pub mod search;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, ToolParameters};
