//! InjectedCapability - EIP-1193 provider injected by a wallet extension

use crate::session::{CapabilityError, CapabilityResult, ChainCapability};
use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::{json, Value};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

pub struct InjectedCapability {
    ethereum: Object,
}

impl InjectedCapability {
    /// `window.ethereum`, when a wallet extension injected one
    pub fn detect() -> Option<Self> {
        let ethereum = Reflect::get(&js_sys::global(), &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(Self { ethereum: ethereum.unchecked_into() })
    }
}

/// Wallet errors are `{code, message}` objects; anything else is a transport failure
fn js_error(err: JsValue) -> CapabilityError {
    let code = Reflect::get(&err, &JsValue::from_str("code")).ok().and_then(|c| c.as_f64());
    let message = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| "wallet request failed".into());
    match code {
        Some(code) => CapabilityError::from_rpc(code as i64, message),
        None => CapabilityError::Transport(message),
    }
}

#[async_trait(?Send)]
impl ChainCapability for InjectedCapability {
    async fn request(&self, method: &str, params: Value) -> CapabilityResult<Value> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let args = json!({"method": method, "params": params})
            .serialize(&serializer)
            .map_err(|e| CapabilityError::Malformed(e.to_string()))?;
        let request: Function = Reflect::get(&self.ethereum, &JsValue::from_str("request"))
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| CapabilityError::Transport("ethereum.request is not a function".into()))?;
        let promise: Promise = request
            .call1(&self.ethereum, &args)
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| CapabilityError::Malformed("ethereum.request did not return a promise".into()))?;
        let result = JsFuture::from(promise).await.map_err(js_error)?;
        if result.is_undefined() || result.is_null() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result).map_err(|e| CapabilityError::Malformed(e.to_string()))
    }
}
