use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-call overrides accepted by `chat`. Every field falls back to the
/// adapter's configured default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, alias = "maxTokens")]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

impl ChatOptions {
    pub fn with_temperature(temperature: f64) -> Self {
        Self {
            temperature: Some(temperature),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeOptions {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub types: Option<Vec<String>>,
}

/// Settings shared by every vendor adapter.
#[derive(Clone, Debug)]
pub struct AdapterConfig {
    pub api_keys: Vec<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct ProviderError {
    pub provider: String,
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl ProviderError {
    pub fn new(provider: &str, code: &str, message: &str, retryable: bool) -> Self {
        Self {
            provider: provider.to_string(),
            code: code.to_string(),
            message: message.to_string(),
            retryable,
        }
    }

    pub fn malformed(provider: &str, detail: &str) -> Self {
        Self::new(
            provider,
            "parse_error",
            &format!("malformed {} response: {}", provider, detail),
            false,
        )
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.provider, self.code, self.message)
    }
}

impl std::error::Error for ProviderError {}

/// One LLM vendor behind a uniform set of operations.
///
/// Implementations shape requests for their vendor (role mapping, default
/// model, endpoint) but keep identical observable contracts, so the router
/// never needs to know which vendor it is talking to.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Vendor name as listed in the vendor catalog (`openai`, `anthropic`, ...).
    fn name(&self) -> &str;

    fn default_model(&self) -> &str;

    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<String, ProviderError>;

    async fn generate_code(&self, prompt: &str, context: &Value) -> Result<String, ProviderError>;

    async fn code_review(&self, code: &str, language: &str) -> Result<String, ProviderError>;

    /// Returns the parsed JSON analysis, or a diagnostic payload when the
    /// vendor's reply is not JSON. Only transport-level failures are errors.
    async fn analyze_code(&self, code: &str, options: &AnalyzeOptions) -> Result<Value, ProviderError>;
}
