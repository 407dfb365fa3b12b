use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Synchronous handler for one tool method.
pub type MethodHandler = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCapabilities {
    pub methods: Vec<String>,
    pub config: Value,
    pub providers: Vec<String>,
}

/// Entry of `mcp.listTools`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub capabilities: ToolCapabilities,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToolError {
    #[error("Tool '{0}' not found")]
    NotFound(String),

    #[error("Method '{method}' not found in tool '{tool}'")]
    MethodNotFound { tool: String, method: String },

    #[error("Error executing {tool}.{method}: {reason}")]
    Failed {
        tool: String,
        method: String,
        reason: String,
    },

    #[error("invalid tool registration: {0}")]
    Registration(String),
}

/// A named collaborator invoked through `mcp.executeTool`.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> ToolCapabilities;

    async fn invoke(&self, method: &str, params: Value) -> Result<Value, ToolError>;
}

/// Tool assembled from per-method closures.
pub struct FnTool {
    name: String,
    methods: BTreeMap<String, MethodHandler>,
    config: Value,
    providers: Vec<String>,
}

impl FnTool {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            methods: BTreeMap::new(),
            config: json!({}),
            providers: Vec::new(),
        }
    }

    pub fn method(mut self, name: &str, handler: MethodHandler) -> Self {
        self.methods.insert(name.to_string(), handler);
        self
    }

    pub fn config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn providers(mut self, providers: Vec<String>) -> Self {
        self.providers = providers;
        self
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities {
            methods: self.methods.keys().cloned().collect(),
            config: self.config.clone(),
            providers: self.providers.clone(),
        }
    }

    async fn invoke(&self, method: &str, params: Value) -> Result<Value, ToolError> {
        let handler = self.methods.get(method).ok_or_else(|| ToolError::MethodNotFound {
            tool: self.name.clone(),
            method: method.to_string(),
        })?;
        handler(params).map_err(|reason| ToolError::Failed {
            tool: self.name.clone(),
            method: method.to_string(),
            reason,
        })
    }
}
