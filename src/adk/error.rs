// SPDX-License-Identifier: MIT

//! Typed error handling for claims-assistant
//!
//! Every fallible layer (model client, tools, claims store, workflow graph)
//! reports through [`AssistantError`]. Failures are propagated as values; no
//! layer swallows an error into an empty or placeholder result.

use thiserror::Error;

use crate::claims::store::StoreError;

/// Crate-wide result alias
pub type Result<T, E = AssistantError> = std::result::Result<T, E>;

/// Top-level error type for claims-assistant
#[derive(Debug, Error)]
pub enum AssistantError {
    /// API errors from external services (Mistral, ...)
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// Tool not found during execution
    #[error("Tool '{name}' not found")]
    ToolNotFound { name: String },

    /// Tool called with missing or malformed arguments
    #[error("Invalid arguments for tool '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    /// Configuration errors (missing env vars, invalid values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Workflow graph construction or execution errors
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// Claims database errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Model/LLM errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(String),
}

/// Workflow graph errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// `compile()` called before an entry point was set
    #[error("Graph has no entry point")]
    MissingEntryPoint,

    /// A node name was registered twice (or collides with END)
    #[error("Duplicate node: {0}")]
    DuplicateNode(String),

    /// Edge, entry or finish point refers to a node that was never added
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// A node already has an outgoing edge
    #[error("Node '{0}' already has an outgoing edge")]
    DuplicateEdge(String),

    /// A node has no outgoing edge and is not a finish point
    #[error("Node '{0}' has no outgoing edge and is not a finish point")]
    DanglingNode(String),

    /// Circular dependency detected in the graph
    #[error("Circular dependency detected: {0:?}")]
    CircularDependency(Vec<String>),

    /// A router returned a key missing from its branch map
    #[error("Router for '{node}' returned unknown branch '{branch}'")]
    UnknownBranch { node: String, branch: String },

    /// A node needed a state field that no earlier node provided
    #[error("Missing state field: {0}")]
    MissingField(&'static str),
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Invalid response from model
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),
}

impl AssistantError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a tool not found error
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound { name: name.into() }
    }

    /// Create an invalid arguments error
    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create from a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<&str> for AssistantError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<String> for AssistantError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_error_wraps_into_assistant_error() {
        let err: AssistantError = WorkflowError::MissingField("user_id").into();
        assert_eq!(err.to_string(), "Workflow error: Missing state field: user_id");
    }

    #[test]
    fn test_unknown_branch_message() {
        let err = WorkflowError::UnknownBranch {
            node: "find_user".to_string(),
            branch: "maybe".to_string(),
        };
        assert!(err.to_string().contains("find_user"));
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_invalid_arguments_constructor() {
        let err = AssistantError::invalid_arguments("get_claim_details", "missing claim_id");
        assert_eq!(
            err.to_string(),
            "Invalid arguments for tool 'get_claim_details': missing claim_id"
        );
    }
}
