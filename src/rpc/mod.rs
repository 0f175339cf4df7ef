//! HttpCapability - JSON-RPC 2.0 over HTTP standing in for an injected wallet
//!
//! A local dev node keeps its accounts unlocked, so "requesting" accounts is
//! the same as listing them: `eth_requestAccounts` is sent as `eth_accounts`.

use crate::core::constants::methods;
use crate::session::{CapabilityError, CapabilityResult, ChainCapability};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::cell::Cell;
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

pub struct HttpCapability {
    url: String,
    client: reqwest::Client,
    next_id: Cell<u64>,
}

impl HttpCapability {
    pub fn new(url: impl Into<String>) -> CapabilityResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CapabilityError::Transport(e.to_string()))?;
        Ok(Self { url: url.into(), client, next_id: Cell::new(1) })
    }

    pub fn url(&self) -> &str { &self.url }

    fn envelope(&self, method: &str, params: Value) -> Value {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let method = if method == methods::REQUEST_ACCOUNTS { methods::ACCOUNTS } else { method };
        json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params})
    }
}

fn into_result(response: RpcResponse) -> CapabilityResult<Value> {
    if let Some(err) = response.error {
        return Err(CapabilityError::from_rpc(err.code, err.message));
    }
    // A pending receipt is a legitimate `null` result
    Ok(response.result.unwrap_or(Value::Null))
}

#[async_trait(?Send)]
impl ChainCapability for HttpCapability {
    async fn request(&self, method: &str, params: Value) -> CapabilityResult<Value> {
        let body = self.envelope(method, params);
        trace!(url = %self.url, request = %body, "rpc");
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CapabilityError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| CapabilityError::Transport(e.to_string()))?;
        let parsed: RpcResponse = serde_json::from_str(&text)
            .map_err(|e| CapabilityError::Malformed(format!("HTTP {}: {}: {}", status, e, text)))?;
        into_result(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_rewrites_request_accounts() {
        let cap = HttpCapability::new("http://127.0.0.1:8545").unwrap();
        let first = cap.envelope(methods::REQUEST_ACCOUNTS, json!([]));
        assert_eq!(first["method"], "eth_accounts");
        assert_eq!(first["id"], 1);
        let second = cap.envelope(methods::CHAIN_ID, json!([]));
        assert_eq!(second["method"], "eth_chainId");
        assert_eq!(second["id"], 2);
        assert_eq!(second["jsonrpc"], "2.0");
    }

    #[test]
    fn test_into_result() {
        let ok: RpcResponse = serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": "0x7a69"})).unwrap();
        assert_eq!(into_result(ok).unwrap(), json!("0x7a69"));

        let pending: RpcResponse = serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": null})).unwrap();
        assert_eq!(into_result(pending).unwrap(), Value::Null);

        let rejected: RpcResponse = serde_json::from_value(json!({"error": {"code": 4001, "message": "no"}})).unwrap();
        assert_eq!(into_result(rejected).unwrap_err(), CapabilityError::Rejected);

        let reverted: RpcResponse =
            serde_json::from_value(json!({"error": {"code": -32000, "message": "execution reverted"}})).unwrap();
        assert!(matches!(into_result(reverted), Err(CapabilityError::Rpc { code: -32000, .. })));
    }
}
