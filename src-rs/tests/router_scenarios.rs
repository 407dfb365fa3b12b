mod common;

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{router_with, ScriptedAdapter};
use mcp_router_rs::api::RequestRouter;
use mcp_router_rs::error::{INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND};
use mcp_router_rs::llm::ProviderError;
use mcp_router_rs::{McpContext, RouterConfig, RouterError};

fn chat_params(model: Option<&str>) -> Value {
    let mut params = json!({"messages": [{"role": "user", "content": "hello"}]});
    if let Some(model) = model {
        params["options"] = json!({"model": model});
    }
    params
}

#[tokio::test]
async fn unknown_methods_return_method_not_found() {
    let router = router_with(vec![Arc::new(ScriptedAdapter::replying("openai", "hi"))]);
    for name in ["", "tools/list", "mcp.getcapabilities", "Chat", "mcp.deleteEverything"] {
        let err = router.handle(name, json!({})).await.unwrap_err();
        assert_eq!(err.code(), METHOD_NOT_FOUND, "{}", name);
    }
}

#[tokio::test]
async fn hint_for_unconfigured_vendor_is_configuration_error() {
    let openai = Arc::new(ScriptedAdapter::replying("openai", "hi"));
    let router = router_with(vec![openai.clone()]);

    let err = router.handle("chat", chat_params(Some("claude-3-opus"))).await.unwrap_err();
    assert!(matches!(err, RouterError::Configuration(_)));
    assert_eq!(err.to_string(), "Anthropic provider not configured");
    assert_eq!(openai.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn hint_for_configured_vendor_is_deterministic() {
    let openai = Arc::new(ScriptedAdapter::replying("openai", "from-openai"));
    let google = Arc::new(ScriptedAdapter::replying("google", "from-google"));
    let router = router_with(vec![openai.clone(), google.clone()]);

    for _ in 0..10 {
        let out = router.handle("chat", chat_params(Some("gemini-1.5-flash"))).await.unwrap();
        assert_eq!(out, json!("from-google"));
    }
    assert_eq!(google.calls.load(Ordering::SeqCst), 10);
    assert_eq!(openai.calls.load(Ordering::SeqCst), 0);

    let options = google.last_options.lock().unwrap().clone().unwrap();
    assert_eq!(options.model.as_deref(), Some("gemini-1.5-flash"));
}

#[tokio::test]
async fn standard_methods_dispatch_to_selected_provider() {
    let router = router_with(vec![Arc::new(ScriptedAdapter::replying("anthropic", "ok"))]);

    let out = router
        .handle("generateCode", json!({"prompt": "sort", "context": {"lang": "go"}}))
        .await
        .unwrap();
    assert_eq!(out, json!("ok:sort"));

    let out = router
        .handle("codeReview", json!({"code": "x := 1", "language": "go"}))
        .await
        .unwrap();
    assert_eq!(out, json!("ok:go"));

    let records = router.context().metrics.records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.success && r.provider.as_deref() == Some("anthropic")));
}

#[tokio::test]
async fn zero_providers_is_configuration_error_for_any_params() {
    let router = router_with(vec![]);
    for method in ["chat", "generateCode", "codeReview", "analyzeCode"] {
        for params in [json!({}), Value::Null, json!({"options": null}), json!({"code": []})] {
            let err = router.handle(method, params.clone()).await.unwrap_err();
            assert!(
                matches!(err, RouterError::Configuration(_)),
                "{} {} -> {:?}",
                method,
                params,
                err
            );
            assert_eq!(err.code(), INTERNAL_ERROR);
        }
    }
}

#[tokio::test]
async fn unconfigured_hint_wins_over_malformed_params() {
    let router = router_with(vec![Arc::new(ScriptedAdapter::replying("openai", "hi"))]);
    let err = router
        .handle("codeReview", json!({"options": {"model": "gemini-pro"}}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Google provider not configured");
}

#[tokio::test]
async fn malformed_params_with_a_provider_are_invalid_params() {
    let openai = Arc::new(ScriptedAdapter::replying("openai", "hi"));
    let router = router_with(vec![openai.clone()]);
    let err = router.handle("chat", json!({"messages": "hi"})).await.unwrap_err();
    assert_eq!(err.code(), INVALID_PARAMS);
    let err = router.handle("codeReview", Value::Null).await.unwrap_err();
    assert_eq!(err.code(), INVALID_PARAMS);
    assert_eq!(openai.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn null_options_are_treated_as_absent() {
    let openai = Arc::new(ScriptedAdapter::replying("openai", "ok"));
    let router = router_with(vec![openai.clone()]);

    let out = router
        .handle("codeReview", json!({"code": "x", "language": "js", "options": null}))
        .await
        .unwrap();
    assert_eq!(out, json!("ok:js"));
    let out = router
        .handle("generateCode", json!({"prompt": "sort", "options": null}))
        .await
        .unwrap();
    assert_eq!(out, json!("ok:sort"));
    let out = router
        .handle("analyzeCode", json!({"code": "x", "options": null}))
        .await
        .unwrap();
    assert_eq!(out["success"], true);

    let mut params = chat_params(None);
    params["options"] = Value::Null;
    assert_eq!(router.handle("chat", params).await.unwrap(), json!("ok"));
    let options = openai.last_options.lock().unwrap().clone().unwrap();
    assert!(options.model.is_none());
    assert!(options.temperature.is_none());
}

#[tokio::test]
async fn provider_errors_pass_through_unretried() {
    let failing = Arc::new(ScriptedAdapter::failing(
        "openai",
        ProviderError::new("openai", "rate_limit", "Rate limit reached", true),
    ));
    let router = router_with(vec![failing.clone()]);

    let err = router.handle("chat", chat_params(None)).await.unwrap_err();
    assert_eq!(err.code(), INTERNAL_ERROR);
    assert_eq!(err.to_string(), "Rate limit reached");
    assert_eq!(err.data()["code"], "rate_limit");
    assert_eq!(failing.calls.load(Ordering::SeqCst), 1);

    let summary = router.context().metrics.aggregate();
    assert_eq!(summary.total_requests, 1);
    assert_eq!(summary.success_rate, 0.0);
    assert_eq!(router.context().metrics.records()[0].provider.as_deref(), Some("openai"));
}

#[tokio::test]
async fn analyze_code_soft_fails_on_non_json() {
    let router = router_with(vec![Arc::new(ScriptedAdapter::replying(
        "openai",
        "This function is fine.",
    ))]);

    let out = router.handle("analyzeCode", json!({"code": "fn a() {}"})).await.unwrap();
    assert_eq!(out["success"], true);
    assert_eq!(out["provider"], "openai");
    assert!(out["duration"].as_f64().unwrap() >= 0.0);
    assert_eq!(
        out["analysis"],
        json!({"error": "Failed to parse analysis response", "rawResponse": "This function is fine."})
    );
}

#[tokio::test]
async fn analyze_code_soft_fails_through_real_adapter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "I cannot produce JSON today."}}]
        })))
        .mount(&server)
        .await;

    let env: HashMap<&str, String> = [
        ("OPENAI_API_KEY", "sk-test".to_string()),
        ("OPENAI_BASE_URL", server.uri()),
    ]
    .into_iter()
    .collect();
    let cfg = RouterConfig::from_lookup(|key| env.get(key).cloned()).unwrap();
    let ctx = McpContext::from_config(&cfg).unwrap();
    assert_eq!(ctx.active_providers(), vec!["openai"]);
    let router = RequestRouter::new(Arc::new(ctx));

    let out = router
        .handle("analyzeCode", json!({"code": "print(1)", "options": {"types": ["security"]}}))
        .await
        .unwrap();
    assert_eq!(out["analysis"]["error"], "Failed to parse analysis response");
    assert_eq!(out["analysis"]["rawResponse"], "I cannot produce JSON today.");
}

#[tokio::test]
async fn metrics_keep_latest_thousand() {
    let router = router_with(vec![Arc::new(ScriptedAdapter::replying("openai", "hi"))]);
    for _ in 0..1001 {
        router.handle("chat", chat_params(None)).await.unwrap();
    }
    let summary = router.context().metrics.aggregate();
    assert_eq!(summary.total_requests, 1000);
    assert_eq!(summary.success_rate, 1.0);
    assert_eq!(summary.method_distribution["chat"], 1000);

    let records = router.context().metrics.records();
    for pair in records.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[tokio::test]
async fn capabilities_are_stable() {
    let router = router_with(vec![
        Arc::new(ScriptedAdapter::replying("openai", "a")),
        Arc::new(ScriptedAdapter::replying("google", "b")),
    ]);
    let first = router.handle("mcp.getCapabilities", Value::Null).await.unwrap();
    router.handle("chat", chat_params(None)).await.unwrap();
    let second = router.handle("mcp.getCapabilities", json!({})).await.unwrap();
    assert_eq!(first, second);

    assert_eq!(first["version"], "1.0.0");
    assert_eq!(first["providers"], json!(["openai", "google"]));
    let methods = first["supportedMethods"].as_array().unwrap();
    assert_eq!(methods.len(), 8);
    assert!(methods.contains(&json!("mcp.executeTool")));
    assert_eq!(first["tools"][0]["name"], "providers");
}

#[tokio::test]
async fn state_reports_metrics_and_history() {
    let router = router_with(vec![Arc::new(ScriptedAdapter::replying("openai", "a"))]);
    router.handle("chat", chat_params(None)).await.unwrap();
    router.handle("nope", Value::Null).await.unwrap_err();

    let state = router.handle("mcp.getState", Value::Null).await.unwrap();
    assert_eq!(state["activeProviders"], json!(["openai"]));
    assert_eq!(state["sessionMetrics"].as_array().unwrap().len(), 2);
    assert_eq!(state["sessionMetrics"][0]["method"], "chat");
    assert_eq!(state["sessionMetrics"][0]["provider"], "openai");
    assert_eq!(state["metrics"]["totalRequests"], 2);
    assert_eq!(state["metrics"]["successRate"], 0.5);
    assert_eq!(state["availableTools"][0]["name"], "providers");

    // the getState call itself is recorded afterwards
    assert_eq!(router.context().metrics.len(), 3);
}

#[tokio::test]
async fn tools_are_listed_and_executed() {
    let router = router_with(vec![Arc::new(ScriptedAdapter::replying("google", "a"))]);

    let listed = router.handle("mcp.listTools", Value::Null).await.unwrap();
    assert_eq!(listed["success"], true);
    assert_eq!(listed["tools"][0]["capabilities"]["methods"], json!(["list", "resolve"]));

    let out = router
        .handle("mcp.executeTool", json!({"tool": "providers", "method": "list"}))
        .await
        .unwrap();
    assert_eq!(out["tool"], "providers");
    assert_eq!(out["result"]["providers"][0], json!({"name": "google", "defaultModel": "scripted-1"}));

    let err = router
        .handle("mcp.executeTool", json!({"tool": "web", "method": "fetch"}))
        .await
        .unwrap_err();
    assert_eq!(err.code(), INTERNAL_ERROR);
    assert_eq!(err.to_string(), "Tool execution failed: Tool 'web' not found");
}
