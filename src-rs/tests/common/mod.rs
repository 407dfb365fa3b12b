#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use mcp_router_rs::api::RequestRouter;
use mcp_router_rs::llm::analysis::parse_analysis;
use mcp_router_rs::llm::{
    AnalyzeOptions, ChatOptions, Message, ProviderAdapter, ProviderError, ProviderPicker, ProviderSelector,
};
use mcp_router_rs::tools::ToolRegistry;
use mcp_router_rs::McpContext;

/// In-process adapter that answers every call with a fixed reply (or error)
/// and remembers the options it was given.
pub struct ScriptedAdapter {
    name: &'static str,
    reply: String,
    failure: Option<ProviderError>,
    pub calls: AtomicUsize,
    pub last_options: Mutex<Option<ChatOptions>>,
}

impl ScriptedAdapter {
    pub fn replying(name: &'static str, reply: &str) -> Self {
        Self {
            name,
            reply: reply.to_string(),
            failure: None,
            calls: AtomicUsize::new(0),
            last_options: Mutex::new(None),
        }
    }

    pub fn failing(name: &'static str, failure: ProviderError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::replying(name, "")
        }
    }

    fn answer(&self) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.reply.clone()),
        }
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn name(&self) -> &str {
        self.name
    }

    fn default_model(&self) -> &str {
        "scripted-1"
    }

    async fn chat(&self, _messages: &[Message], options: &ChatOptions) -> Result<String, ProviderError> {
        *self.last_options.lock().unwrap() = Some(options.clone());
        self.answer()
    }

    async fn generate_code(&self, prompt: &str, _context: &Value) -> Result<String, ProviderError> {
        self.answer().map(|reply| format!("{}:{}", reply, prompt))
    }

    async fn code_review(&self, _code: &str, language: &str) -> Result<String, ProviderError> {
        self.answer().map(|reply| format!("{}:{}", reply, language))
    }

    async fn analyze_code(&self, _code: &str, _options: &AnalyzeOptions) -> Result<Value, ProviderError> {
        self.answer().map(|reply| parse_analysis(&reply))
    }
}

pub struct FirstPicker;

impl ProviderPicker for FirstPicker {
    fn pick(&self, _len: usize) -> usize {
        0
    }
}

pub fn router_with(adapters: Vec<Arc<ScriptedAdapter>>) -> RequestRouter {
    let mut selector = ProviderSelector::new(Arc::new(FirstPicker));
    for adapter in adapters {
        selector.register_provider(adapter);
    }
    let ctx = McpContext::new(selector, ToolRegistry::new());
    ctx.register_builtin_tools();
    RequestRouter::new(Arc::new(ctx))
}
