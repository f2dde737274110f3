//! The wallet the browser injected into the page.
//!
//! Modern wallets expose an EIP-1193 object at `window.ethereum`; older
//! dapp browsers exposed `window.web3.currentProvider`. Both are reached
//! through their `request({ method, params })` function, which returns a
//! promise.

use std::sync::Arc;

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect, JSON};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use votelink::{CallRequest, Provider, ProviderError, ProviderLocator};

pub struct InjectedProvider {
    target: JsValue,
    request: Function,
    source: &'static str,
}

impl InjectedProvider {
    /// Wrap `target` if it has a callable `request`.
    fn wrap(target: JsValue, source: &'static str) -> Option<Self> {
        let request = Reflect::get(&target, &JsValue::from_str("request"))
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        Some(Self {
            target,
            request,
            source,
        })
    }

    async fn send(&self, method: &str, params: serde_json::Value) -> Result<JsValue, ProviderError> {
        let args = Object::new();
        let params = JSON::parse(&params.to_string())
            .map_err(|e| ProviderError::Transport(describe_js(&e)))?;
        Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method))
            .and_then(|_| Reflect::set(&args, &JsValue::from_str("params"), &params))
            .map_err(|e| ProviderError::Transport(describe_js(&e)))?;

        let promise: Promise = self
            .request
            .call1(&self.target, &args)
            .and_then(|p| p.dyn_into::<Promise>())
            .map_err(|e| ProviderError::Transport(describe_js(&e)))?;

        JsFuture::from(promise).await.map_err(|e| to_provider_error(&e))
    }
}

#[async_trait(?Send)]
impl Provider for InjectedProvider {
    async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        let result = self
            .send("eth_requestAccounts", serde_json::json!([]))
            .await?;
        let list = result
            .dyn_into::<Array>()
            .map_err(|_| ProviderError::InvalidResponse("accounts result is not an array".into()))?;

        list.iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_string().ok_or_else(|| {
                    ProviderError::InvalidResponse(format!("account {i} is not a string"))
                })
            })
            .collect()
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, ProviderError> {
        let params = serde_json::json!([
            { "to": request.to.to_checksum(), "data": format!("0x{}", hex::encode(&request.data)) },
            "latest"
        ]);
        let raw = self
            .send("eth_call", params)
            .await?
            .as_string()
            .ok_or_else(|| ProviderError::InvalidResponse("eth_call result is not a string".into()))?;
        let body = raw
            .strip_prefix("0x")
            .ok_or_else(|| ProviderError::InvalidResponse(format!("data is not 0x-prefixed: '{raw}'")))?;
        hex::decode(body).map_err(|e| ProviderError::InvalidResponse(format!("bad hex data: {e}")))
    }

    fn describe(&self) -> String {
        format!("injected {}", self.source)
    }
}

/// Finds the injected wallet on the global object.
#[derive(Default)]
pub struct InjectedLocator;

#[async_trait(?Send)]
impl ProviderLocator for InjectedLocator {
    async fn locate(&self) -> Result<Arc<dyn Provider>, ProviderError> {
        let global = js_sys::global();

        let ethereum = property(&global, "ethereum");
        if let Some(p) = ethereum.and_then(|e| InjectedProvider::wrap(e, "window.ethereum")) {
            return Ok(Arc::new(p));
        }

        let legacy = property(&global, "web3").and_then(|w| property(&w, "currentProvider"));
        if let Some(p) = legacy.and_then(|c| InjectedProvider::wrap(c, "window.web3.currentProvider")) {
            return Ok(Arc::new(p));
        }

        Err(ProviderError::Unavailable(
            "no injected wallet (window.ethereum or window.web3.currentProvider)".into(),
        ))
    }
}

fn property(target: &JsValue, name: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// Map a rejected wallet promise. EIP-1193 errors carry a numeric `code`.
fn to_provider_error(error: &JsValue) -> ProviderError {
    let message = property(error, "message")
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| describe_js(error));
    match property(error, "code").and_then(|c| c.as_f64()) {
        Some(code) => ProviderError::from_code(code as i64, message),
        None => ProviderError::Transport(message),
    }
}

fn describe_js(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| JSON::stringify(value).ok().map(String::from))
        .unwrap_or_else(|| format!("{value:?}"))
}
