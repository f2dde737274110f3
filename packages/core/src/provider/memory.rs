//! In-memory provider.
//!
//! Replies are scripted up front and every request is recorded, so tests can
//! assert both what a session concluded and which calls it made to get
//! there. Also handy for demos that run without a wallet or node.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{CallRequest, Provider, ProviderError};
use crate::address::Address;
use crate::codec;

/// Selector of `owner()`.
const OWNER_SELECTOR: [u8; 4] = [0x8d, 0xa5, 0xcb, 0x5b];

/// A request the provider received, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRequest {
    Accounts,
    Call(CallRequest),
}

struct Inner {
    accounts: Result<Vec<String>, ProviderError>,
    replies: HashMap<(Address, [u8; 4]), Result<Vec<u8>, ProviderError>>,
    log: Vec<ProviderRequest>,
}

/// Thread-safe scripted [`Provider`].
///
/// Calls that have no scripted reply fail the way a node does for a revert.
pub struct MemoryProvider {
    inner: RwLock<Inner>,
}

impl MemoryProvider {
    /// A provider with no accounts and no scripted calls.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                accounts: Ok(Vec::new()),
                replies: HashMap::new(),
                log: Vec::new(),
            }),
        }
    }

    /// Answer [`Provider::accounts`] with these addresses.
    pub fn with_accounts<I, S>(self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.write().accounts = Ok(accounts.into_iter().map(Into::into).collect());
        self
    }

    /// Fail [`Provider::accounts`] with `error`.
    pub fn with_accounts_error(self, error: ProviderError) -> Self {
        self.write().accounts = Err(error);
        self
    }

    /// Make `owner()` on `contract` return `owner`.
    pub fn with_owner(self, contract: Address, owner: Address) -> Self {
        let data = codec::encode_outputs(&[codec::address(owner)]);
        self.with_reply(contract, OWNER_SELECTOR, data)
    }

    /// Make calls to `contract` with `selector` return `data`.
    pub fn with_reply(self, contract: Address, selector: [u8; 4], data: Vec<u8>) -> Self {
        self.write().replies.insert((contract, selector), Ok(data));
        self
    }

    /// Make calls to `contract` with `selector` fail with `error`.
    pub fn with_call_error(self, contract: Address, selector: [u8; 4], error: ProviderError) -> Self {
        self.write().replies.insert((contract, selector), Err(error));
        self
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.read().log.clone()
    }

    /// Only the message calls received so far.
    pub fn calls(&self) -> Vec<CallRequest> {
        self.read()
            .log
            .iter()
            .filter_map(|r| match r {
                ProviderRequest::Call(c) => Some(c.clone()),
                ProviderRequest::Accounts => None,
            })
            .collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|p| p.into_inner())
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl Provider for MemoryProvider {
    async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        let mut inner = self.write();
        inner.log.push(ProviderRequest::Accounts);
        inner.accounts.clone()
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, ProviderError> {
        let mut inner = self.write();
        inner.log.push(ProviderRequest::Call(request.clone()));
        let key = request.selector().map(|s| (request.to, s));
        match key.and_then(|k| inner.replies.get(&k)) {
            Some(reply) => reply.clone(),
            None => Err(ProviderError::Rpc {
                code: -32000,
                message: "execution reverted".into(),
            }),
        }
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}
