use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::RouterConfig;
use crate::helpers::build_selector;
use crate::llm::{ProviderError, ProviderSelector};
use crate::metrics::MetricsAggregator;
use crate::tools::{providers_tool, ToolRegistry};

pub const MCP_VERSION: &str = "1.0.0";

/// Feature flags advertised by `mcp.getCapabilities`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub code_generation: bool,
    pub code_analysis: bool,
    pub meta_cognition: bool,
    pub performance_monitoring: bool,
    pub tools: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            code_generation: true,
            code_analysis: true,
            meta_cognition: false,
            performance_monitoring: true,
            tools: true,
        }
    }
}

/// Everything a request needs: configured providers, tools, and the session
/// metrics buffer. Built once at startup and shared behind an `Arc`; the
/// metrics buffer is the only part that changes afterwards.
pub struct McpContext {
    pub version: String,
    pub capabilities: Capabilities,
    pub selector: Arc<ProviderSelector>,
    pub tools: ToolRegistry,
    pub metrics: MetricsAggregator,
}

impl McpContext {
    pub fn new(selector: ProviderSelector, tools: ToolRegistry) -> Self {
        Self {
            version: MCP_VERSION.to_string(),
            capabilities: Capabilities::default(),
            selector: Arc::new(selector),
            tools,
            metrics: MetricsAggregator::new(),
        }
    }

    /// Build providers from `cfg` and register the built-in tools.
    pub fn from_config(cfg: &RouterConfig) -> Result<Self, ProviderError> {
        let ctx = Self::new(build_selector(cfg)?, ToolRegistry::new());
        ctx.register_builtin_tools();
        Ok(ctx)
    }

    pub fn register_builtin_tools(&self) {
        let tool = providers_tool(self.selector.clone());
        if let Err(err) = self.tools.register(Arc::new(tool)) {
            warn!(error = %err, "built-in tool registration failed");
        }
    }

    pub fn active_providers(&self) -> Vec<String> {
        self.selector.active_providers()
    }
}
