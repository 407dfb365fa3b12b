use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use super::analysis::{focus_areas, parse_analysis, ANALYSIS_TEMPERATURE};
use super::http::{build_client, post_json};
use super::rotation::KeyRing;
use super::types::{AdapterConfig, AnalyzeOptions, ChatOptions, Message, ProviderAdapter, ProviderError, Role};

const PROVIDER: &str = "google";

pub struct GeminiAdapter {
    cfg: AdapterConfig,
    keys: KeyRing,
    client: Client,
}

impl GeminiAdapter {
    pub fn new(cfg: AdapterConfig) -> Result<Self, ProviderError> {
        let client = build_client(PROVIDER, &cfg)?;
        Ok(Self {
            keys: KeyRing::new(cfg.api_keys.clone()),
            cfg,
            client,
        })
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn default_model(&self) -> &str {
        &self.cfg.model
    }

    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<String, ProviderError> {
        let model = options.model.as_deref().unwrap_or(&self.cfg.model);
        let temperature = options.temperature.unwrap_or(self.cfg.temperature);
        let max_tokens = options.max_tokens.unwrap_or(self.cfg.max_tokens);
        let payload = build_payload(messages, temperature, max_tokens);

        let key = self
            .keys
            .next()
            .ok_or_else(|| ProviderError::new(PROVIDER, "auth_error", "no Google API keys", false))?;
        let mut headers = HeaderMap::new();
        let key_header = HeaderValue::from_str(key)
            .map_err(|_| ProviderError::new(PROVIDER, "auth_error", "invalid API key", false))?;
        headers.insert("x-goog-api-key", key_header);

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            self.cfg.base_url.trim_end_matches('/'),
            model
        );
        info!(provider = PROVIDER, model, messages = messages.len(), "preparing Gemini request");
        let raw = post_json(&self.client, PROVIDER, &endpoint, headers, &payload).await?;
        parse_response(&raw)
    }

    async fn generate_code(&self, prompt: &str, context: &Value) -> Result<String, ProviderError> {
        let content = format!(
            "Generate professional code based on:\n\n\
             Prompt: {}\n\
             Context: {}\n\n\
             Provide clean, efficient, and well-commented code.",
            prompt, context
        );
        self.chat(&[Message::user(content)], &ChatOptions::default()).await
    }

    async fn code_review(&self, code: &str, language: &str) -> Result<String, ProviderError> {
        let content = format!(
            "Comprehensive code review for {lang} code:\n\n\
             ```{lang}\n{code}\n```\n\n\
             Evaluate:\n\
             - Code correctness\n\
             - Performance optimization\n\
             - Best practices\n\
             - Potential improvements",
            lang = language,
            code = code
        );
        self.chat(&[Message::user(content)], &ChatOptions::default()).await
    }

    async fn analyze_code(&self, code: &str, options: &AnalyzeOptions) -> Result<Value, ProviderError> {
        let messages = [
            Message::system("You are an expert code analyzer. Respond with JSON only."),
            Message::user(format!(
                "Analyze this code focusing on {}:\n\n```\n{}\n```\n\n\
                 Return the analysis as a JSON object with metrics and recommendations.",
                focus_areas(options),
                code
            )),
        ];
        let mut chat_opts = ChatOptions::with_temperature(ANALYSIS_TEMPERATURE);
        chat_opts.model = options.model.clone();
        let text = self.chat(&messages, &chat_opts).await?;
        Ok(parse_analysis(&text))
    }
}

/// Gemini takes the whole conversation as `contents` history with `user` and
/// `model` roles; system messages move to `systemInstruction`.
fn build_payload(messages: &[Message], temperature: f64, max_tokens: u32) -> Value {
    let mut contents = Vec::new();
    let mut system_parts = Vec::new();

    for msg in messages {
        if msg.role == Role::System {
            system_parts.push(json!({"text": msg.content}));
            continue;
        }
        let role = if msg.role == Role::User { "user" } else { "model" };
        contents.push(json!({
            "role": role,
            "parts": [{"text": msg.content}]
        }));
    }

    let mut payload = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": temperature,
            "maxOutputTokens": max_tokens
        }
    });

    if !system_parts.is_empty() {
        payload["systemInstruction"] = json!({ "parts": system_parts });
    }

    payload
}

fn parse_response(raw: &Value) -> Result<String, ProviderError> {
    let parts = raw
        .get("candidates")
        .and_then(|v| v.as_array())
        .and_then(|list| list.first())
        .and_then(|first| first.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "missing candidates"))?;

    let mut text = String::new();
    for part in parts {
        if let Some(chunk) = part.get("text").and_then(|v| v.as_str()) {
            text.push_str(chunk);
        }
    }
    Ok(text)
}
