//! The provider capability.
//!
//! A [`Provider`] is whatever lets this crate talk to the chain: an injected
//! browser wallet, a JSON-RPC endpoint, or the in-memory stand-in used by
//! tests. The session layer needs exactly two things from it:
//!
//! | Method | JSON-RPC equivalent |
//! |---|---|
//! | [`Provider::accounts`] | `eth_requestAccounts` / `eth_accounts` |
//! | [`Provider::call`] | `eth_call` against the `latest` block |
//!
//! The provider is owned by its environment. This crate holds it behind an
//! `Arc` for the lifetime of a session and never shuts it down.
//!
//! # Implementations
//!
//! | Type | Where |
//! |------|-------|
//! | [`MemoryProvider`] | Tests and demos; scripted replies, records every request |
//! | `HttpProvider` | `votelink-rpc`; JSON-RPC over HTTP |
//! | `InjectedProvider` | `votelink-wasm`; `window.ethereum` in a browser |
//!
//! [`MemoryProvider`]: memory::MemoryProvider

pub mod memory;

use async_trait::async_trait;

use crate::address::Address;

/// EIP-1193: the user rejected the request.
pub const USER_REJECTED: i64 = 4001;

/// EIP-1193: the requested account or method is not authorized.
pub const UNAUTHORIZED: i64 = 4100;

// ---------------------------------------------------------------------------
// ProviderError
// ---------------------------------------------------------------------------

/// Errors a provider can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// No provider could be found or reached.
    #[error("no provider available: {0}")]
    Unavailable(String),

    /// The user (or wallet policy) refused the request.
    #[error("request rejected by the wallet (code {code}): {message}")]
    Rejected { code: i64, message: String },

    /// The node answered with a JSON-RPC error, e.g. an execution revert.
    #[error("provider returned error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The request never got an answer.
    #[error("transport error: {0}")]
    Transport(String),

    /// The answer could not be understood.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Classify a JSON-RPC / EIP-1193 error object.
    pub fn from_code(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            USER_REJECTED | UNAUTHORIZED => Self::Rejected { code, message },
            _ => Self::Rpc { code, message },
        }
    }
}

// ---------------------------------------------------------------------------
// CallRequest
// ---------------------------------------------------------------------------

/// A read-only message call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    /// The contract being called.
    pub to: Address,
    /// Selector followed by ABI-encoded arguments.
    pub data: Vec<u8>,
}

impl CallRequest {
    /// The 4-byte selector at the front of `data`, if there is one.
    pub fn selector(&self) -> Option<[u8; 4]> {
        let mut out = [0u8; 4];
        out.copy_from_slice(self.data.get(..4)?);
        Some(out)
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// `Send + Sync` on native targets; nothing on `wasm32`, where JavaScript
/// handles are confined to the one thread there is.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}

/// A connection to a wallet or node.
///
/// Native implementations must be `Send + Sync` so they can be shared as an
/// `Arc<dyn Provider>` across tasks. On `wasm32` neither the provider nor
/// its futures need to be, since JavaScript promises never leave their
/// thread.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Provider: MaybeSendSync {
    /// The accounts the user controls, in the provider's order. Wallets may
    /// show their own approval prompt before answering.
    async fn accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Execute a message call without creating a transaction and return the
    /// raw return data.
    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, ProviderError>;

    /// Short human-readable label for logs, e.g. the endpoint URL.
    fn describe(&self) -> String {
        "provider".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_codes_are_classified() {
        assert!(matches!(
            ProviderError::from_code(4001, "User rejected the request."),
            ProviderError::Rejected { code: 4001, .. }
        ));
        assert!(matches!(
            ProviderError::from_code(4100, "unauthorized"),
            ProviderError::Rejected { code: 4100, .. }
        ));
        assert!(matches!(
            ProviderError::from_code(-32000, "execution reverted"),
            ProviderError::Rpc { code: -32000, .. }
        ));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn native_seams_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Provider>();
        assert_send_sync::<dyn crate::locator::ProviderLocator>();
        assert_send_sync::<memory::MemoryProvider>();
    }

    #[test]
    fn selector_is_first_four_bytes() {
        let req = CallRequest {
            to: Address::from_bytes([0; 20]),
            data: vec![0x8d, 0xa5, 0xcb, 0x5b, 0x00],
        };
        assert_eq!(req.selector(), Some([0x8d, 0xa5, 0xcb, 0x5b]));
        let short = CallRequest {
            to: Address::from_bytes([0; 20]),
            data: vec![0x8d],
        };
        assert_eq!(short.selector(), None);
    }
}
