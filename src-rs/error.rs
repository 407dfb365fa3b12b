use serde_json::{json, Value};

use crate::llm::ProviderError;
use crate::tools::ToolError;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Errors surfaced by the request router. Each variant maps onto a JSON-RPC
/// error object; see [`RouterError::code`] and [`RouterError::data`].
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// A provider was requested (or needed) but no credential was present at startup.
    #[error("{0}")]
    Configuration(String),

    #[error("Method {0} not found")]
    MethodNotFound(String),

    #[error("{0}")]
    InvalidParams(String),

    /// Upstream vendor failure, passed through as-is.
    #[error("{}", .0.message)]
    Provider(#[from] ProviderError),

    #[error("Tool execution failed: {0}")]
    Tool(#[from] ToolError),

    #[error("{0}")]
    Internal(String),
}

impl RouterError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::MethodNotFound(_) => METHOD_NOT_FOUND,
            Self::InvalidParams(_) => INVALID_PARAMS,
            Self::Configuration(_) | Self::Provider(_) | Self::Tool(_) | Self::Internal(_) => {
                INTERNAL_ERROR
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "ConfigurationError",
            Self::MethodNotFound(_) => "MethodNotFoundError",
            Self::InvalidParams(_) => "InvalidParamsError",
            Self::Provider(_) => "ProviderError",
            Self::Tool(_) => "ToolError",
            Self::Internal(_) => "InternalError",
        }
    }

    /// Structured payload for the `data` member of a JSON-RPC error.
    pub fn data(&self) -> Value {
        match self {
            Self::Provider(err) => json!({
                "type": self.kind(),
                "provider": err.provider,
                "code": err.code,
                "retryable": err.retryable,
            }),
            _ => json!({ "type": self.kind() }),
        }
    }
}

impl From<serde_json::Error> for RouterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
