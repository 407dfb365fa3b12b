use std::cell::Cell;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::models::{RpcRequest, RpcResponse};

pub struct RpcClient {
    pub base_url: String,
    client: Client,
    next_id: Cell<u64>,
}

impl RpcClient {
    pub fn new(base_url: &str) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|err| err.to_string())?;
        Ok(Self {
            base_url: base_url.to_string(),
            client,
            next_id: Cell::new(1),
        })
    }

    /// Send one JSON-RPC call. The server answers 200 even for RPC failures,
    /// so the `error` member is checked explicitly.
    pub fn call(&self, method: &str, params: Value) -> Result<RpcResponse, String> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let req = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let resp = self
            .client
            .post(self.base_url.trim_end_matches('/'))
            .header(CONTENT_TYPE, "application/json")
            .json(&req)
            .send()
            .map_err(|err| err.to_string())?;

        if resp.status().is_success() {
            resp.json::<RpcResponse>().map_err(|err| err.to_string())
        } else {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            Err(format!("http {}: {}", status.as_u16(), body))
        }
    }

    pub fn call_result(&self, method: &str, params: Value) -> Result<Value, String> {
        let resp = self.call(method, params)?;
        if let Some(err) = resp.error {
            return Err(format!("rpc {}: {}", err.code, err.message));
        }
        Ok(resp.result.unwrap_or(Value::Null))
    }
}
