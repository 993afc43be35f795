// SPDX-License-Identifier: MIT

use crate::adk::error::{AssistantError, Result};
use crate::adk::tool::Tool;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name to tool lookup, fixed once built
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Arc<BTreeMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Build a registry; two tools with the same name are rejected
    pub fn from_tools(tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for tool in tools {
            let name = tool.name().to_string();
            if map.insert(name.clone(), tool).is_some() {
                return Err(AssistantError::config(format!(
                    "tool '{}' registered twice",
                    name
                )));
            }
        }
        log::debug!("Registered {} tools", map.len());
        Ok(Self {
            tools: Arc::new(map),
        })
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// All tools, ordered by name
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.values().cloned().collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use once_cell::sync::Lazy;

    static MOCK_SCHEMA: Lazy<Value> = Lazy::new(|| {
        json!({
            "type": "object",
            "properties": {}
        })
    });

    /// A mock tool for testing
    struct MockTool {
        name: String,
        description: String,
    }

    impl MockTool {
        fn new(name: &str) -> Arc<dyn Tool> {
            Arc::new(Self {
                name: name.to_string(),
                description: format!("Mock tool: {}", name),
            })
        }
    }

    #[async_trait]
    impl Tool for MockTool {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            &self.description
        }

        fn schema(&self) -> &Value {
            &MOCK_SCHEMA
        }

        async fn execute(&self, _input: Value) -> Result<Value> {
            Ok(json!({"result": "mock"}))
        }
    }

    #[test]
    fn test_get_tool() {
        let registry = ToolRegistry::from_tools([MockTool::new("get_active_policies")]).unwrap();

        let retrieved = registry.get("get_active_policies");
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().name(), "get_active_policies");
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_tools_are_sorted_by_name() {
        let registry = ToolRegistry::from_tools([
            MockTool::new("tool3"),
            MockTool::new("tool1"),
            MockTool::new("tool2"),
        ])
        .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["tool1", "tool2", "tool3"]);
        let names: Vec<String> = registry
            .tools()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["tool1", "tool2", "tool3"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = ToolRegistry::from_tools([MockTool::new("same_name"), MockTool::new("same_name")]);
        assert!(matches!(result, Err(AssistantError::Config(_))));
    }

    #[test]
    fn test_registry_clone_shares_tools() {
        let registry = ToolRegistry::from_tools([MockTool::new("tool1")]).unwrap();
        let cloned = registry.clone();
        assert!(cloned.get("tool1").is_some());
        assert!(ToolRegistry::default().is_empty());
    }
}
