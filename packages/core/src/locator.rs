//! Provider discovery.
//!
//! A [`ProviderLocator`] turns the ambient environment into a usable
//! [`Provider`]. Hosts usually chain several with [`FallbackLocator`]: an
//! injected wallet first, then one or more JSON-RPC endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::provider::{MaybeSendSync, Provider, ProviderError};

/// Finds a provider for the current environment.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait ProviderLocator: MaybeSendSync {
    /// Return a usable provider, or [`ProviderError::Unavailable`] when there
    /// is none.
    async fn locate(&self) -> Result<Arc<dyn Provider>, ProviderError>;
}

/// Always yields the same, already-known provider.
pub struct StaticLocator {
    provider: Arc<dyn Provider>,
}

impl StaticLocator {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ProviderLocator for StaticLocator {
    async fn locate(&self) -> Result<Arc<dyn Provider>, ProviderError> {
        Ok(Arc::clone(&self.provider))
    }
}

/// Tries each candidate in order and returns the first provider found.
///
/// When every candidate fails the error lists each attempt, so the log line
/// shows why the injected wallet *and* every endpoint were passed over.
#[derive(Default)]
pub struct FallbackLocator {
    candidates: Vec<Box<dyn ProviderLocator>>,
}

impl FallbackLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate. Candidates are tried in insertion order.
    pub fn or_else(mut self, candidate: impl ProviderLocator + 'static) -> Self {
        self.candidates.push(Box::new(candidate));
        self
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ProviderLocator for FallbackLocator {
    async fn locate(&self) -> Result<Arc<dyn Provider>, ProviderError> {
        let mut attempts = Vec::with_capacity(self.candidates.len());

        for (i, candidate) in self.candidates.iter().enumerate() {
            match candidate.locate().await {
                Ok(provider) => {
                    debug!("locator: candidate {i} yielded {}", provider.describe());
                    return Ok(provider);
                }
                Err(e) => {
                    debug!("locator: candidate {i} unavailable: {e}");
                    attempts.push(e.to_string());
                }
            }
        }

        if attempts.is_empty() {
            return Err(ProviderError::Unavailable(
                "no provider candidates configured".into(),
            ));
        }
        Err(ProviderError::Unavailable(attempts.join("; ")))
    }
}
