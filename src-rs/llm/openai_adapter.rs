use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use super::analysis::{focus_areas, parse_analysis, ANALYSIS_TEMPERATURE};
use super::http::{build_client, post_json};
use super::rotation::KeyRing;
use super::types::{AdapterConfig, AnalyzeOptions, ChatOptions, Message, ProviderAdapter, ProviderError};

const PROVIDER: &str = "openai";

pub struct OpenAiAdapter {
    cfg: AdapterConfig,
    keys: KeyRing,
    client: Client,
}

impl OpenAiAdapter {
    pub fn new(cfg: AdapterConfig) -> Result<Self, ProviderError> {
        let client = build_client(PROVIDER, &cfg)?;
        Ok(Self {
            keys: KeyRing::new(cfg.api_keys.clone()),
            cfg,
            client,
        })
    }

    fn auth_headers(&self) -> Result<HeaderMap, ProviderError> {
        let key = self
            .keys
            .next()
            .ok_or_else(|| ProviderError::new(PROVIDER, "auth_error", "no OpenAI API keys", false))?;
        let value = HeaderValue::from_str(&format!("Bearer {}", key))
            .map_err(|_| ProviderError::new(PROVIDER, "auth_error", "invalid API key", false))?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn default_model(&self) -> &str {
        &self.cfg.model
    }

    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<String, ProviderError> {
        let model = options.model.as_deref().unwrap_or(&self.cfg.model);
        let payload = build_payload(
            model,
            messages,
            options.temperature.unwrap_or(self.cfg.temperature),
            options.max_tokens,
        );
        let endpoint = format!("{}/v1/chat/completions", self.cfg.base_url.trim_end_matches('/'));
        info!(provider = PROVIDER, model, messages = messages.len(), "preparing OpenAI request");
        let raw = post_json(&self.client, PROVIDER, &endpoint, self.auth_headers()?, &payload).await?;
        parse_response(&raw)
    }

    async fn generate_code(&self, prompt: &str, context: &Value) -> Result<String, ProviderError> {
        let messages = [
            Message::system("You are an expert code generation assistant."),
            Message::user(prompt),
            Message::system(format!("Context: {}", context)),
        ];
        self.chat(&messages, &ChatOptions::with_temperature(0.7)).await
    }

    async fn code_review(&self, code: &str, language: &str) -> Result<String, ProviderError> {
        let prompt = format!(
            "Perform a comprehensive code review for this {lang} code, focusing on:\n\
             1. Potential bugs\n\
             2. Performance improvements\n\
             3. Best practices and style\n\
             4. Security vulnerabilities\n\n\
             Code:\n```{lang}\n{code}\n```",
            lang = language,
            code = code
        );
        self.chat(&[Message::user(prompt)], &ChatOptions::default()).await
    }

    async fn analyze_code(&self, code: &str, options: &AnalyzeOptions) -> Result<Value, ProviderError> {
        let messages = [
            Message::system(
                "You are an expert code analyzer. Analyze the provided code and return structured insights.",
            ),
            Message::user(format!(
                "Analyze this code focusing on {}:\n\n```\n{}\n```\n\n\
                 Provide analysis in JSON format with metrics and recommendations.",
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

fn build_payload(model: &str, messages: &[Message], temperature: f64, max_tokens: Option<u32>) -> Value {
    let messages: Vec<Value> = messages
        .iter()
        .map(|msg| json!({"role": msg.role.as_str(), "content": msg.content}))
        .collect();
    let mut payload = json!({
        "model": model,
        "messages": messages,
        "temperature": temperature,
    });
    if let Some(max_tokens) = max_tokens {
        payload["max_tokens"] = json!(max_tokens);
    }
    payload
}

fn parse_response(raw: &Value) -> Result<String, ProviderError> {
    raw.get("choices")
        .and_then(|v| v.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.pointer("/message/content"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "missing choices[0].message.content"))
}
