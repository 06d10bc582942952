//! Browser Wallet
//!
//! `WalletProvider` over the injected `window.ethereum` object.

use async_trait::async_trait;
use club_payments::{ProviderError, RpcRequest, WalletProvider};
use js_sys::{Function, JSON, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Wallet injected by a browser extension
///
/// Holds no handle: the binding is looked up on every call so a wallet that
/// is installed or removed after page load is picked up.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserWallet;

fn ethereum() -> Option<Object> {
    let window = web_sys::window()?;
    let value = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    value.dyn_into::<Object>().ok()
}

fn malformed(message: impl Into<String>) -> ProviderError {
    ProviderError::new(ProviderError::MALFORMED_RESPONSE, message)
}

/// Map a rejected provider promise to `{ code, message }`
#[allow(clippy::cast_possible_truncation)]
fn provider_error(err: &JsValue) -> ProviderError {
    let code = Reflect::get(err, &JsValue::from_str("code"))
        .ok()
        .and_then(|code| code.as_f64())
        .map_or(ProviderError::MALFORMED_RESPONSE, |code| code as i64);
    let message = Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| "Wallet request failed".into());
    ProviderError::new(code, message)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, ProviderError> {
    let text = serde_json::to_string(value).map_err(|e| malformed(e.to_string()))?;
    JSON::parse(&text).map_err(|_| malformed("cannot encode wallet request"))
}

fn from_js(value: &JsValue) -> Result<Value, ProviderError> {
    if value.is_undefined() || value.is_null() {
        return Ok(Value::Null);
    }
    let text: String = JSON::stringify(value)
        .map_err(|_| malformed("cannot decode wallet response"))?
        .into();
    serde_json::from_str(&text).map_err(|e| malformed(e.to_string()))
}

#[async_trait(?Send)]
impl WalletProvider for BrowserWallet {
    fn is_available(&self) -> bool {
        ethereum().is_some()
    }

    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError> {
        let ethereum = ethereum().ok_or_else(ProviderError::disconnected)?;
        let request_fn = Reflect::get(&ethereum, &JsValue::from_str("request"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| malformed("window.ethereum.request is not a function"))?;

        tracing::debug!(method = %request.method, "Wallet request");
        let args = to_js(&request)?;
        let promise = request_fn
            .call1(&ethereum, &args)
            .map_err(|e| provider_error(&e))?
            .dyn_into::<Promise>()
            .map_err(|_| malformed("wallet request did not return a promise"))?;

        let result = JsFuture::from(promise).await.map_err(|e| {
            let err = provider_error(&e);
            tracing::debug!(method = %request.method, code = err.code, "Wallet request rejected");
            err
        })?;
        from_js(&result)
    }
}
