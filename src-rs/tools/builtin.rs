use std::sync::Arc;

use serde_json::{json, Value};

use super::types::FnTool;
use crate::llm::vendors::vendor_for_model;
use crate::llm::ProviderSelector;

pub const PROVIDERS_TOOL: &str = "providers";

/// Introspection over the configured vendors. `list` reports each active
/// adapter with its default model; `resolve` tells which vendor a model name
/// would be routed to, without calling it.
pub fn providers_tool(selector: Arc<ProviderSelector>) -> FnTool {
    let list_selector = selector.clone();
    let resolve_selector = selector.clone();
    FnTool::new(PROVIDERS_TOOL)
        .providers(selector.active_providers())
        .method(
            "list",
            Arc::new(move |_params: Value| -> Result<Value, String> {
                let providers: Vec<Value> = list_selector
                    .active_providers()
                    .iter()
                    .filter_map(|name| list_selector.get(name))
                    .map(|p| json!({"name": p.name(), "defaultModel": p.default_model()}))
                    .collect();
                Ok(json!({ "providers": providers }))
            }),
        )
        .method(
            "resolve",
            Arc::new(move |params: Value| -> Result<Value, String> {
                let model = params
                    .get("model")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| "parameter 'model' is required".to_string())?;
                Ok(match vendor_for_model(model) {
                    Some(vendor) => json!({
                        "model": model,
                        "vendor": vendor.name,
                        "configured": resolve_selector.get(vendor.name).is_some(),
                    }),
                    None => json!({
                        "model": model,
                        "vendor": Value::Null,
                        "routing": "random",
                        "candidates": resolve_selector.active_providers(),
                    }),
                })
            }),
        )
}
