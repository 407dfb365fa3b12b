use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::{debug, warn};

use super::protocol::{JsonRpcRequest, JsonRpcResponse};
use super::router::RequestRouter;
use crate::error::{INVALID_REQUEST, PARSE_ERROR};

/// Single entry point for every path. POST bodies are JSON-RPC; any other
/// verb is rejected with 405. RPC failures still answer 200 and carry the
/// failure in the `error` member.
pub async fn handle_rpc(
    State(router): State<Arc<RequestRouter>>,
    method: Method,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
    }

    let response = match decode(&body) {
        Ok(request) => {
            debug!(method = %request.method, "received request");
            router.handle_request(request).await
        }
        Err(response) => response,
    };
    (StatusCode::OK, Json(response)).into_response()
}

fn decode(body: &[u8]) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_slice(body).map_err(|err| {
        warn!(error = %err, "unparseable request body");
        JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", err), None)
    })?;
    let id = value.get("id").cloned();
    serde_json::from_value(value).map_err(|err| {
        warn!(error = %err, "invalid JSON-RPC request");
        JsonRpcResponse::error(id, INVALID_REQUEST, format!("Invalid Request: {}", err), None)
    })
}
