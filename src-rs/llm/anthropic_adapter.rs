use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{error, info};

use super::analysis::{focus_areas, parse_analysis, ANALYSIS_TEMPERATURE};
use super::http::{build_client, post_json};
use super::rotation::KeyRing;
use super::types::{AdapterConfig, AnalyzeOptions, ChatOptions, Message, ProviderAdapter, ProviderError, Role};

const PROVIDER: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    cfg: AdapterConfig,
    keys: KeyRing,
    client: Client,
}

impl AnthropicAdapter {
    pub fn new(cfg: AdapterConfig) -> Result<Self, ProviderError> {
        let client = build_client(PROVIDER, &cfg)?;
        info!(provider = PROVIDER, keys = cfg.api_keys.len(), "Anthropic provider initialized");
        Ok(Self {
            keys: KeyRing::new(cfg.api_keys.clone()),
            cfg,
            client,
        })
    }

    fn headers(&self) -> Result<HeaderMap, ProviderError> {
        let key = self
            .keys
            .next()
            .ok_or_else(|| ProviderError::new(PROVIDER, "auth_error", "no Anthropic API keys", false))?;
        let key = HeaderValue::from_str(key)
            .map_err(|_| ProviderError::new(PROVIDER, "auth_error", "invalid API key", false))?;
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", key);
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
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
            options.max_tokens.unwrap_or(self.cfg.max_tokens),
        );
        let endpoint = format!("{}/v1/messages", self.cfg.base_url.trim_end_matches('/'));
        info!(provider = PROVIDER, model, messages = messages.len(), "preparing Anthropic request");

        let result = post_json(&self.client, PROVIDER, &endpoint, self.headers()?, &payload).await;
        match result.and_then(|raw| parse_response(&raw)) {
            Ok(text) => Ok(text),
            Err(err) => {
                let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
                error!(provider = PROVIDER, error = %err, ?roles, "Anthropic API error");
                Err(err)
            }
        }
    }

    async fn generate_code(&self, prompt: &str, context: &Value) -> Result<String, ProviderError> {
        let content = format!(
            "Generate high-quality code based on this prompt and context.\n\n\
             Prompt: {}\n\
             Context: {}\n\n\
             Please provide clean, efficient, and well-documented code.",
            prompt, context
        );
        self.chat(&[Message::user(content)], &ChatOptions::with_temperature(0.7)).await
    }

    async fn code_review(&self, code: &str, language: &str) -> Result<String, ProviderError> {
        let content = format!(
            "Perform a detailed code review for this {lang} code:\n\n\
             ```{lang}\n{code}\n```\n\n\
             Please analyze:\n\
             - Potential logical errors\n\
             - Performance considerations\n\
             - Security implications\n\
             - Idiomatic language usage\n\
             - Possible refactoring opportunities",
            lang = language,
            code = code
        );
        self.chat(&[Message::user(content)], &ChatOptions::default()).await
    }

    async fn analyze_code(&self, code: &str, options: &AnalyzeOptions) -> Result<Value, ProviderError> {
        let content = format!(
            "As an expert code analyzer, analyze this code focusing on {}:\n\n\
             ```\n{}\n```\n\n\
             Return a detailed analysis in JSON format including:\n\
             1. Complexity metrics (cyclomatic complexity, cognitive complexity)\n\
             2. Pattern recognition (design patterns, anti-patterns)\n\
             3. Security vulnerabilities\n\
             4. Performance considerations\n\
             5. Recommendations for improvement",
            focus_areas(options),
            code
        );
        let mut chat_opts = ChatOptions::with_temperature(ANALYSIS_TEMPERATURE);
        chat_opts.model = options.model.clone();
        let text = self.chat(&[Message::user(content)], &chat_opts).await?;
        Ok(parse_analysis(&text))
    }
}

/// The Messages API rejects a `system` role inside `messages`; system text
/// goes in the top-level `system` field instead.
fn build_payload(model: &str, messages: &[Message], temperature: f64, max_tokens: u32) -> Value {
    let mut system = Vec::new();
    let mut turns = Vec::new();
    for msg in messages {
        match msg.role {
            Role::System => system.push(msg.content.as_str()),
            Role::User => turns.push(json!({"role": "user", "content": msg.content})),
            Role::Assistant => turns.push(json!({"role": "assistant", "content": msg.content})),
        }
    }

    let mut payload = json!({
        "model": model,
        "max_tokens": max_tokens,
        "temperature": temperature,
        "messages": turns,
    });
    if !system.is_empty() {
        payload["system"] = json!(system.join("\n\n"));
    }
    payload
}

fn parse_response(raw: &Value) -> Result<String, ProviderError> {
    let blocks = raw
        .get("content")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "missing content"))?;
    let text: String = blocks
        .iter()
        .filter(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|block| block.get("text").and_then(|t| t.as_str()))
        .collect();
    if text.is_empty() && !blocks.is_empty() {
        return Err(ProviderError::malformed(PROVIDER, "no text blocks"));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(base_url: &str) -> AnthropicAdapter {
        AnthropicAdapter::new(AdapterConfig {
            api_keys: vec!["ak".to_string()],
            base_url: base_url.to_string(),
            model: "claude-3-5-sonnet-20241022".to_string(),
            temperature: 0.7,
            max_tokens: 4096,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn reply(text: &str) -> Value {
        json!({"content": [{"type": "text", "text": text}], "stop_reason": "end_turn"})
    }

    #[test]
    fn test_system_lifted_out_of_messages() {
        let payload = build_payload(
            "claude-3-haiku",
            &[Message::system("rules"), Message::user("hi"), Message::assistant("yo")],
            0.1,
            100,
        );
        assert_eq!(payload["system"], "rules");
        let turns = payload["messages"].as_array().unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0]["role"], "user");
        assert_eq!(turns[1]["role"], "assistant");
    }

    #[tokio::test]
    async fn test_chat_headers_and_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "ak"))
            .and(header("anthropic-version", API_VERSION))
            .and(body_partial_json(json!({"max_tokens": 4096, "model": "claude-3-5-sonnet-20241022"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("hi there")))
            .expect(1)
            .mount(&server)
            .await;

        let text = adapter(&server.uri())
            .chat(&[Message::user("hi")], &ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(text, "hi there");
    }

    #[tokio::test]
    async fn test_server_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let err = adapter(&server.uri())
            .generate_code("a parser", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code, "server_error");
        assert_eq!(err.provider, "anthropic");
    }

    #[tokio::test]
    async fn test_analyze_code_uses_low_temperature() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"temperature": 0.3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("```json\n{\"ok\": true}\n```")))
            .expect(1)
            .mount(&server)
            .await;

        let value = adapter(&server.uri())
            .analyze_code("SELECT 1", &AnalyzeOptions::default())
            .await
            .unwrap();
        assert_eq!(value["ok"], true);
    }
}
