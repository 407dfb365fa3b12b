use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, warn};

use super::types::{Tool, ToolError, ToolInfo};

/// Name → tool mapping behind `mcp.listTools` / `mcp.executeTool`.
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, Arc<dyn Tool>>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if name.is_empty() {
            return Err(ToolError::Registration("empty tool name".to_string()));
        }
        let mut map = self
            .tools
            .write()
            .map_err(|_| ToolError::Registration("lock error".to_string()))?;
        if map.contains_key(&name) {
            warn!(tool = %name, "tool already registered");
            return Err(ToolError::Registration(format!("tool already registered: {}", name)));
        }
        debug!(tool = %name, "registered tool");
        map.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let map = self.tools.read().ok()?;
        map.get(name).cloned()
    }

    pub fn list_tools(&self) -> Vec<ToolInfo> {
        let map = match self.tools.read() {
            Ok(lock) => lock,
            Err(_) => return vec![],
        };
        map.iter()
            .map(|(name, tool)| ToolInfo {
                name: name.clone(),
                capabilities: tool.capabilities(),
            })
            .collect()
    }

    pub async fn execute(&self, tool: &str, method: &str, params: Value) -> Result<Value, ToolError> {
        // clone the handle so the lock is not held across the await
        let handle = self.get(tool).ok_or_else(|| ToolError::NotFound(tool.to_string()))?;
        handle.invoke(method, params).await
    }

    pub fn has(&self, name: &str) -> bool {
        match self.tools.read() {
            Ok(map) => map.contains_key(name),
            Err(_) => false,
        }
    }

    pub fn count(&self) -> usize {
        match self.tools.read() {
            Ok(map) => map.len(),
            Err(_) => 0,
        }
    }
}
