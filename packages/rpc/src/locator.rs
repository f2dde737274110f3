//! Endpoint discovery.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use votelink::{Provider, ProviderError, ProviderLocator};

use crate::provider::HttpProvider;

/// Where a local development node listens by default.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8545";

/// Probes JSON-RPC endpoints in order and yields the first that answers
/// `eth_chainId`.
pub struct HttpLocator {
    client: Client,
    endpoints: Vec<String>,
}

impl HttpLocator {
    pub fn new<I, S>(client: Client, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            client,
            endpoints: endpoints.into_iter().map(Into::into).collect(),
        }
    }

    /// Probe only [`DEFAULT_ENDPOINT`].
    pub fn local(client: Client) -> Self {
        Self::new(client, [DEFAULT_ENDPOINT])
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }
}

#[async_trait]
impl ProviderLocator for HttpLocator {
    async fn locate(&self) -> Result<Arc<dyn Provider>, ProviderError> {
        let mut attempts = Vec::with_capacity(self.endpoints.len());

        for url in &self.endpoints {
            let provider = HttpProvider::new(self.client.clone(), url.clone());
            match provider.chain_id().await {
                Ok(chain) => {
                    info!("rpc: using {url} (chain id {chain})");
                    return Ok(Arc::new(provider));
                }
                Err(e) => {
                    debug!("rpc: {url} unusable: {e}");
                    attempts.push(format!("{url}: {e}"));
                }
            }
        }

        if attempts.is_empty() {
            return Err(ProviderError::Unavailable(
                "no JSON-RPC endpoints configured".into(),
            ));
        }
        Err(ProviderError::Unavailable(attempts.join("; ")))
    }
}
