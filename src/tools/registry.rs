//! Static tool registry — name to capability dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DocentError, Result};
use crate::provider::ToolDefinition;

use super::tool::Tool;

/// Maps tool names to callable capabilities. Built once at startup,
/// no mutation thereafter.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a static list, rejecting duplicate names.
    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Result<Self> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Register a tool. Duplicate names are a startup error.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(DocentError::Configuration(format!(
                "duplicate tool registration: {name}"
            )));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up the capability registered under `name`.
    pub fn get(&self, name: &str) -> Result<&Arc<dyn Tool>> {
        self.tools
            .get(name)
            .ok_or_else(|| DocentError::UnknownTool(name.to_string()))
    }

    /// Schema set declared to the model.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters().schema.clone(),
            })
            .collect();
        // Stable declaration order regardless of map iteration.
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}
