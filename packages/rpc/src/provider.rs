//! [`Provider`] over HTTP JSON-RPC.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use votelink::{CallRequest, Provider, ProviderError};

use crate::wire::{self, CallObject, RpcRequest, RpcResponse};

/// Talks to one Ethereum JSON-RPC endpoint (a local dev node, a hosted RPC
/// service).
///
/// The [`reqwest::Client`] is shared: it pools connections internally and
/// carries whatever timeout the caller configured.
pub struct HttpProvider {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpProvider {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one JSON-RPC request and return its `result`.
    ///
    /// Transport failures and non-2xx statuses become
    /// [`ProviderError::Transport`]; JSON-RPC error objects are mapped with
    /// [`ProviderError::from_code`].
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest::new(id, method, params);
        debug!("rpc: -> {} {method} #{id}", self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("{}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Transport(format!(
                "{} returned HTTP {}",
                self.url,
                status.as_u16()
            )));
        }

        let envelope: RpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("{method}: {e}")))?;

        if envelope.id != Value::from(id) {
            return Err(ProviderError::InvalidResponse(format!(
                "{method}: response id {} does not match request id {id}",
                envelope.id
            )));
        }
        envelope.into_result()
    }

    async fn request_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ProviderError> {
        let value = self.request(method, params).await?;
        serde_json::from_value(value)
            .map_err(|e| ProviderError::InvalidResponse(format!("{method}: {e}")))
    }

    /// `eth_chainId`.
    pub async fn chain_id(&self) -> Result<u64, ProviderError> {
        let raw: String = self.request_as("eth_chainId", json!([])).await?;
        wire::decode_quantity(&raw)
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.request_as("eth_accounts", json!([])).await
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, ProviderError> {
        let call = CallObject {
            to: request.to,
            data: wire::encode_data(&request.data),
        };
        let raw: String = self
            .request_as("eth_call", json!([call, wire::LATEST]))
            .await?;
        wire::decode_data(&raw)
    }

    fn describe(&self) -> String {
        format!("json-rpc {}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on loopback is closed on any sane test host.
        let p = HttpProvider::new(Client::new(), "http://127.0.0.1:9");
        assert!(matches!(
            p.accounts().await,
            Err(ProviderError::Transport(_))
        ));
    }

    #[test]
    fn describe_names_the_endpoint() {
        let p = HttpProvider::new(Client::new(), "http://127.0.0.1:8545");
        assert_eq!(p.describe(), "json-rpc http://127.0.0.1:8545");
    }
}
