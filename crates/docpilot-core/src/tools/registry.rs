//! Tool registry: the static tool definitions advertised to the model.

use std::collections::BTreeMap;

use crate::llm::types::ToolDefinition;

/// Name of the documentation retrieval tool.
pub const SEARCH_DOCUMENTATION: &str = "search_documentation";

/// A registered tool with metadata.
#[derive(Debug, Clone)]
pub struct RegisteredTool {
    /// Tool definition (name, description, parameters schema).
    pub definition: ToolDefinition,
    /// Disabled tools are neither advertised nor executed.
    pub enabled: bool,
}

/// Registry of all available tools, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the documentation search tool.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(RegisteredTool {
            definition: search_documentation_definition(),
            enabled: true,
        });
        registry
    }

    /// Register a tool, replacing any tool of the same name.
    pub fn register(&mut self, tool: RegisteredTool) {
        self.tools.insert(tool.definition.name.clone(), tool);
    }

    /// Enable or disable a tool. Returns `false` if no such tool exists.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.tools.get_mut(name) {
            Some(tool) => {
                tool.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Look up an enabled tool by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name).filter(|t| t.enabled)
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Definitions of enabled tools, for sending to the LLM.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .filter(|t| t.enabled)
            .map(|t| t.definition.clone())
            .collect()
    }
}

fn search_documentation_definition() -> ToolDefinition {
    ToolDefinition {
        name: SEARCH_DOCUMENTATION.to_string(),
        description: "Search the product documentation for sections relevant to a question. \
                      Use this before answering any question about the product."
            .to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Keywords or a natural-language question to look up"
                }
            },
            "required": ["query"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let reg = ToolRegistry::new();
        assert!(reg.names().is_empty());
        assert!(reg.definitions().is_empty());
    }

    #[test]
    fn test_defaults_registered() {
        let reg = ToolRegistry::with_defaults();
        assert_eq!(reg.names(), vec![SEARCH_DOCUMENTATION.to_string()]);
        let def = &reg.definitions()[0];
        assert_eq!(def.parameters["required"][0], "query");
    }

    #[test]
    fn test_disabled_tool_excluded() {
        let mut reg = ToolRegistry::with_defaults();
        assert!(reg.set_enabled(SEARCH_DOCUMENTATION, false));
        assert!(reg.definitions().is_empty());
        assert!(reg.get(SEARCH_DOCUMENTATION).is_none());
    }

    #[test]
    fn test_set_enabled_unknown_tool() {
        let mut reg = ToolRegistry::new();
        assert!(!reg.set_enabled("nope", true));
    }
}
