//! CLI configuration, populated from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use votelink::artifacts::VOTING_CONTRACT_ADDRESS;
use votelink_rpc::DEFAULT_ENDPOINT;

/// Runtime configuration for the `votelink` CLI.
///
/// Every field has a default, so the CLI runs against a local development
/// node with zero configuration. Command-line flags override these values.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `VOTELINK_RPC_URLS` | `http://127.0.0.1:8545` | Comma-separated JSON-RPC endpoints, probed in order |
/// | `VOTELINK_CONTRACT` | bundled deployment address | Address of the voting contract |
/// | `VOTELINK_ABI` | (absent = bundled `Voting.json`) | Path to an ABI or build artifact |
/// | `VOTELINK_TIMEOUT_SECS` | `10` | HTTP timeout per JSON-RPC request |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Endpoints handed to the locator, in probe order.
    pub rpc_urls: Vec<String>,

    /// Address of the deployed voting contract. Validated when the session
    /// binds the contract, not here.
    pub contract: String,

    /// Interface description to bind with. `None` means the bundled artifact.
    pub abi_path: Option<PathBuf>,

    pub timeout: Duration,
}

impl CliConfig {
    /// Populate config from the process environment.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Populate config from `lookup`, applying defaults where it yields
    /// nothing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let rpc_urls = match lookup("VOTELINK_RPC_URLS") {
            Some(raw) => {
                let urls = split_urls(&raw);
                if urls.is_empty() {
                    return Err("VOTELINK_RPC_URLS is set but lists no endpoints".into());
                }
                urls
            }
            None => vec![DEFAULT_ENDPOINT.to_string()],
        };

        let timeout_secs = match lookup("VOTELINK_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                format!("VOTELINK_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'")
            })?,
            None => 10,
        };

        Ok(Self {
            rpc_urls,
            contract: lookup("VOTELINK_CONTRACT")
                .unwrap_or_else(|| VOTING_CONTRACT_ADDRESS.to_string()),
            abi_path: lookup("VOTELINK_ABI").map(PathBuf::from),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Split a comma-separated endpoint list, dropping blanks.
pub fn split_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = CliConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.rpc_urls, vec![DEFAULT_ENDPOINT.to_string()]);
        assert_eq!(config.contract, VOTING_CONTRACT_ADDRESS);
        assert_eq!(config.abi_path, None);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn overrides() {
        let config = CliConfig::from_lookup(lookup(&[
            ("VOTELINK_RPC_URLS", "http://a:8545, http://b:8545,"),
            ("VOTELINK_CONTRACT", "0x1111111111111111111111111111111111111111"),
            ("VOTELINK_ABI", "build/Voting.json"),
            ("VOTELINK_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.rpc_urls, ["http://a:8545", "http://b:8545"]);
        assert_eq!(config.contract, "0x1111111111111111111111111111111111111111");
        assert_eq!(config.abi_path, Some(PathBuf::from("build/Voting.json")));
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn bad_timeout_is_an_error() {
        let err = CliConfig::from_lookup(lookup(&[("VOTELINK_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(err.contains("VOTELINK_TIMEOUT_SECS"), "got: {err}");
    }

    #[test]
    fn blank_url_list_is_an_error() {
        assert!(CliConfig::from_lookup(lookup(&[("VOTELINK_RPC_URLS", " , ")])).is_err());
    }
}
