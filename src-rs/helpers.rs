use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{RouterConfig, VendorConfig};
use crate::llm::{
    AdapterConfig, AnthropicAdapter, GeminiAdapter, OpenAiAdapter, ProviderAdapter, ProviderError,
    ProviderPicker, ProviderSelector, RandomPicker, KNOWN_VENDORS,
};

/// Keys come from `<VAR>` (comma separated) plus `<VAR>_2` .. `<VAR>_10`.
pub fn load_keys<F>(lookup: &F, var: &str) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut keys = Vec::new();
    if let Some(raw) = lookup(var) {
        for item in raw.split(',') {
            let trimmed = item.trim();
            if !trimmed.is_empty() {
                keys.push(trimmed.to_string());
            }
        }
    }
    for idx in 2..=10 {
        if let Some(value) = lookup(&format!("{}_{}", var, idx)) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                keys.push(trimmed.to_string());
            }
        }
    }
    keys
}

pub fn build_adapter(vendor: &VendorConfig, cfg: &RouterConfig) -> Result<Arc<dyn ProviderAdapter>, ProviderError> {
    let adapter_cfg = AdapterConfig {
        api_keys: vendor.api_keys.clone(),
        base_url: vendor.base_url.clone(),
        model: vendor.model.clone(),
        temperature: cfg.temperature,
        max_tokens: cfg.max_tokens,
        timeout: cfg.timeout,
    };
    let adapter: Arc<dyn ProviderAdapter> = match vendor.spec.name {
        "openai" => Arc::new(OpenAiAdapter::new(adapter_cfg)?),
        "anthropic" => Arc::new(AnthropicAdapter::new(adapter_cfg)?),
        "google" => Arc::new(GeminiAdapter::new(adapter_cfg)?),
        other => {
            return Err(ProviderError::new(other, "unsupported", "no adapter for vendor", false));
        }
    };
    Ok(adapter)
}

/// Register one adapter per configured vendor, in catalog order.
pub fn build_selector(cfg: &RouterConfig) -> Result<ProviderSelector, ProviderError> {
    let picker: Arc<dyn ProviderPicker> = match cfg.provider_seed {
        Some(seed) => Arc::new(RandomPicker::seeded(seed)),
        None => Arc::new(RandomPicker::from_entropy()),
    };
    let mut selector = ProviderSelector::new(picker);

    for spec in KNOWN_VENDORS {
        match cfg.vendor(spec.name) {
            Some(vendor) => {
                selector.register_provider(build_adapter(vendor, cfg)?);
                info!(provider = spec.name, model = %vendor.model, keys = vendor.api_keys.len(), "provider registered");
            }
            None => info!(provider = spec.name, env = spec.key_var, "no credential, provider disabled"),
        }
    }
    if selector.is_empty() {
        warn!("no LLM providers configured; standard methods will fail");
    }
    Ok(selector)
}

/// Install the global subscriber. `RUST_LOG` wins over `default_level`;
/// `json` switches to one JSON object per line.
pub fn init_tracing(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
