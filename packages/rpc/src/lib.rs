//! Ethereum JSON-RPC transport for `votelink`.
//!
//! Provides [`HttpProvider`], a [`votelink::Provider`] that speaks JSON-RPC
//! 2.0 over HTTP (`eth_accounts`, `eth_call`), and [`HttpLocator`], which
//! probes a list of endpoints with `eth_chainId` and hands back the first
//! that answers. Hosts without an injected wallet (the CLI, tests) use these
//! as their provider source.
//!
//! The [`wire`] module holds the request/response envelopes so that servers
//! answering this client can share them.

use std::time::Duration;

pub mod locator;
pub mod provider;
pub mod wire;

pub use locator::{HttpLocator, DEFAULT_ENDPOINT};
pub use provider::HttpProvider;

/// A client with `timeout` applied to every request.
pub fn client_with_timeout(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}
