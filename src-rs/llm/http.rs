use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::types::{AdapterConfig, ProviderError};

pub(crate) fn build_client(provider: &str, cfg: &AdapterConfig) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(cfg.timeout)
        .build()
        .map_err(|err| ProviderError::new(provider, "client_error", &err.to_string(), false))
}

/// POST a JSON payload and classify the outcome. Non-2xx statuses become
/// typed [`ProviderError`]s carrying the vendor's error message.
pub(crate) async fn post_json(
    client: &Client,
    provider: &str,
    endpoint: &str,
    headers: HeaderMap,
    payload: &Value,
) -> Result<Value, ProviderError> {
    debug!(provider, endpoint, "sending vendor request");
    let resp = client
        .post(endpoint)
        .header(CONTENT_TYPE, "application/json")
        .headers(headers)
        .json(payload)
        .send()
        .await
        .map_err(|err| ProviderError::new(provider, "network_error", &err.to_string(), true))?;

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if status.is_client_error() || status.is_server_error() {
        warn!(provider, status = status.as_u16(), "vendor request failed");
        let lowered = body.to_lowercase();
        let message = error_message(&body);
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ProviderError::new(provider, "auth_error", &message, false));
        }
        if status.as_u16() == 429 || lowered.contains("quota") || lowered.contains("resource_exhausted") {
            return Err(ProviderError::new(provider, "rate_limit", &message, true));
        }
        if status.is_server_error() {
            return Err(ProviderError::new(provider, "server_error", &message, true));
        }
        return Err(ProviderError::new(provider, "api_error", &message, false));
    }

    serde_json::from_str(&body).map_err(|_| ProviderError::malformed(provider, "invalid json"))
}

/// OpenAI, Anthropic and Gemini all report failures as
/// `{"error": {"message": ...}}`; anything else is passed through raw.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
