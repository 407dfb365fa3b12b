use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::context::McpContext;
use crate::error::RouterError;
use crate::llm::{AnalyzeOptions, ChatOptions, Message, ProviderAdapter};

/// The method catalog. Meta methods are answered from the context; standard
/// methods go through the provider selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    Chat,
    GenerateCode,
    CodeReview,
    AnalyzeCode,
    GetCapabilities,
    GetState,
    ListTools,
    ExecuteTool,
}

impl RpcMethod {
    pub const ALL: [RpcMethod; 8] = [
        Self::Chat,
        Self::GenerateCode,
        Self::CodeReview,
        Self::AnalyzeCode,
        Self::GetCapabilities,
        Self::GetState,
        Self::ListTools,
        Self::ExecuteTool,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::GenerateCode => "generateCode",
            Self::CodeReview => "codeReview",
            Self::AnalyzeCode => "analyzeCode",
            Self::GetCapabilities => "mcp.getCapabilities",
            Self::GetState => "mcp.getState",
            Self::ListTools => "mcp.listTools",
            Self::ExecuteTool => "mcp.executeTool",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn is_meta(self) -> bool {
        matches!(
            self,
            Self::GetCapabilities | Self::GetState | Self::ListTools | Self::ExecuteTool
        )
    }
}

#[derive(Debug, Deserialize)]
struct ChatParams {
    messages: Vec<Message>,
    #[serde(default)]
    options: Option<ChatOptions>,
}

#[derive(Debug, Deserialize)]
struct GenerateCodeParams {
    prompt: String,
    #[serde(default)]
    context: Value,
}

#[derive(Debug, Deserialize)]
struct CodeReviewParams {
    code: String,
    #[serde(default = "default_language")]
    language: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzeCodeParams {
    code: String,
    #[serde(default)]
    options: Option<AnalyzeOptions>,
}

#[derive(Debug, Deserialize)]
struct ExecuteToolParams {
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    parameters: Value,
}

fn default_language() -> String {
    "text".to_string()
}

/// Read `options.model` without validating anything else, so provider
/// selection happens before the params are checked.
fn model_hint(params: &Value) -> Option<&str> {
    params.pointer("/options/model").and_then(Value::as_str)
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, RouterError> {
    let params = if params.is_null() { json!({}) } else { params };
    serde_json::from_value(params).map_err(|err| RouterError::invalid_params(format!("Invalid params: {}", err)))
}

/// Dispatches JSON-RPC methods and records one metrics entry per request.
pub struct RequestRouter {
    ctx: Arc<McpContext>,
}

impl RequestRouter {
    pub fn new(ctx: Arc<McpContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<McpContext> {
        &self.ctx
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();
        match self.handle(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::from_error(id, &err),
        }
    }

    pub async fn handle(&self, method: &str, params: Value) -> Result<Value, RouterError> {
        let started = Instant::now();
        let mut provider = None;

        let result = match RpcMethod::from_name(method) {
            Some(rpc) => self.dispatch(rpc, params, &mut provider).await,
            None => Err(RouterError::MethodNotFound(method.to_string())),
        };

        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.ctx
            .metrics
            .record(method, result.is_ok(), duration_ms, provider.as_deref());

        match &result {
            Ok(_) => info!(method, provider = ?provider, duration_ms, "request successful"),
            Err(err @ RouterError::Internal(_)) => {
                error!(method, provider = ?provider, duration_ms, error = %err, "request failed")
            }
            Err(err) => warn!(method, provider = ?provider, duration_ms, error = %err, "request failed"),
        }
        result
    }

    async fn dispatch(
        &self,
        method: RpcMethod,
        params: Value,
        provider: &mut Option<String>,
    ) -> Result<Value, RouterError> {
        match method {
            RpcMethod::GetCapabilities => Ok(self.capabilities()),
            RpcMethod::GetState => self.state(),
            RpcMethod::ListTools => Ok(json!({
                "success": true,
                "tools": self.ctx.tools.list_tools(),
            })),
            RpcMethod::ExecuteTool => self.execute_tool(params).await,
            RpcMethod::Chat => {
                let adapter = self.select(model_hint(&params), provider)?;
                let p: ChatParams = parse_params(params)?;
                let text = adapter.chat(&p.messages, &p.options.unwrap_or_default()).await?;
                Ok(Value::String(text))
            }
            RpcMethod::GenerateCode => {
                let adapter = self.select(model_hint(&params), provider)?;
                let p: GenerateCodeParams = parse_params(params)?;
                let text = adapter.generate_code(&p.prompt, &p.context).await?;
                Ok(Value::String(text))
            }
            RpcMethod::CodeReview => {
                let adapter = self.select(model_hint(&params), provider)?;
                let p: CodeReviewParams = parse_params(params)?;
                let text = adapter.code_review(&p.code, &p.language).await?;
                Ok(Value::String(text))
            }
            RpcMethod::AnalyzeCode => {
                let adapter = self.select(model_hint(&params), provider)?;
                let p: AnalyzeCodeParams = parse_params(params)?;
                let started = Instant::now();
                let analysis = adapter.analyze_code(&p.code, &p.options.unwrap_or_default()).await?;
                Ok(json!({
                    "success": true,
                    "provider": adapter.name(),
                    "duration": started.elapsed().as_secs_f64() * 1000.0,
                    "analysis": analysis,
                }))
            }
        }
    }

    fn select(
        &self,
        hint: Option<&str>,
        provider: &mut Option<String>,
    ) -> Result<Arc<dyn ProviderAdapter>, RouterError> {
        let adapter = self.ctx.selector.select(hint)?;
        *provider = Some(adapter.name().to_string());
        Ok(adapter)
    }

    fn capabilities(&self) -> Value {
        let methods: Vec<&str> = RpcMethod::ALL.iter().map(|m| m.name()).collect();
        json!({
            "version": self.ctx.version,
            "capabilities": self.ctx.capabilities,
            "providers": self.ctx.active_providers(),
            "supportedMethods": methods,
            "tools": self.ctx.tools.list_tools(),
        })
    }

    fn state(&self) -> Result<Value, RouterError> {
        Ok(json!({
            "version": self.ctx.version,
            "capabilities": self.ctx.capabilities,
            "activeProviders": self.ctx.active_providers(),
            "sessionMetrics": serde_json::to_value(self.ctx.metrics.records())?,
            "availableTools": self.ctx.tools.list_tools(),
            "metrics": serde_json::to_value(self.ctx.metrics.aggregate())?,
        }))
    }

    async fn execute_tool(&self, params: Value) -> Result<Value, RouterError> {
        let p: ExecuteToolParams = parse_params(params)?;
        let (tool, method) = match (p.tool, p.method) {
            (Some(tool), Some(method)) if !tool.is_empty() && !method.is_empty() => (tool, method),
            _ => return Err(RouterError::invalid_params("Tool and method names are required")),
        };
        let result = self.ctx.tools.execute(&tool, &method, p.parameters).await?;
        Ok(json!({
            "success": true,
            "tool": tool,
            "method": method,
            "result": result,
        }))
    }
}
