//! JSON-RPC 2.0 wire types.
//!
//! Shared by [`HttpProvider`](crate::HttpProvider) and by anything that has
//! to answer it (the conformance crate's fake node), so both sides agree on
//! field names and hex conventions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use votelink::{Address, ProviderError};

pub const JSONRPC_VERSION: &str = "2.0";

/// Block tag every `eth_call` is evaluated against.
pub const LATEST: &str = "latest";

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id: Value::from(id),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC response. Exactly one of `result` / `error` is set by a
/// conforming server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            result: None,
            error: Some(RpcErrorObject {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// The result value, or the error object mapped to a [`ProviderError`].
    pub fn into_result(self) -> Result<Value, ProviderError> {
        match (self.error, self.result) {
            (Some(e), _) => Err(ProviderError::from_code(e.code, e.message)),
            (None, Some(v)) => Ok(v),
            (None, None) => Err(ProviderError::InvalidResponse(
                "response has neither result nor error".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// ---------------------------------------------------------------------------
// eth_call
// ---------------------------------------------------------------------------

/// The transaction object of an `eth_call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallObject {
    pub to: Address,
    pub data: String,
}

// ---------------------------------------------------------------------------
// Hex helpers
// ---------------------------------------------------------------------------

/// `0x`-prefixed lowercase hex, `0x` for empty input.
pub fn encode_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse `0x`-prefixed hex data. `"0x"` is empty data.
pub fn decode_data(s: &str) -> Result<Vec<u8>, ProviderError> {
    let body = s
        .strip_prefix("0x")
        .ok_or_else(|| ProviderError::InvalidResponse(format!("data is not 0x-prefixed: '{s}'")))?;
    hex::decode(body).map_err(|e| ProviderError::InvalidResponse(format!("bad hex data: {e}")))
}

/// Parse a hex quantity such as `0x7a69`.
pub fn decode_quantity(s: &str) -> Result<u64, ProviderError> {
    let body = s
        .strip_prefix("0x")
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ProviderError::InvalidResponse(format!("bad quantity: '{s}'")))?;
    u64::from_str_radix(body, 16)
        .map_err(|_| ProviderError::InvalidResponse(format!("bad quantity: '{s}'")))
}

pub fn encode_quantity(n: u64) -> String {
    format!("0x{n:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_shape() {
        let req = RpcRequest::new(7, "eth_accounts", json!([]));
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "jsonrpc": "2.0", "id": 7, "method": "eth_accounts", "params": [] })
        );
    }

    #[test]
    fn error_object_maps_user_rejection() {
        let resp: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": 1,
            "error": { "code": 4001, "message": "User rejected the request." }
        }))
        .unwrap();
        assert!(matches!(
            resp.into_result(),
            Err(ProviderError::Rejected { code: 4001, .. })
        ));
    }

    #[test]
    fn error_object_maps_node_error() {
        let resp = RpcResponse::failure(json!(1), -32000, "execution reverted");
        assert_eq!(
            resp.into_result(),
            Err(ProviderError::Rpc {
                code: -32000,
                message: "execution reverted".into()
            })
        );
    }

    #[test]
    fn empty_response_is_invalid() {
        let resp: RpcResponse =
            serde_json::from_value(json!({ "jsonrpc": "2.0", "id": 1 })).unwrap();
        assert!(matches!(
            resp.into_result(),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn data_hex() {
        assert_eq!(encode_data(&[]), "0x");
        assert_eq!(encode_data(&[0x8d, 0xa5]), "0x8da5");
        assert_eq!(decode_data("0x").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_data("0x8DA5").unwrap(), vec![0x8d, 0xa5]);
        assert!(decode_data("8da5").is_err());
        assert!(decode_data("0x8da").is_err());
    }

    #[test]
    fn quantity_hex() {
        assert_eq!(decode_quantity("0x7a69").unwrap(), 31337);
        assert_eq!(encode_quantity(31337), "0x7a69");
        assert!(decode_quantity("0x").is_err());
        assert!(decode_quantity("31337").is_err());
    }

    #[test]
    fn call_object_uses_checksum_address() {
        let call = CallObject {
            to: Address::parse("0x59d88ad5bd90ebbbbcb135d65011e386f17f6359").unwrap(),
            data: "0x8da5cb5b".into(),
        };
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({ "to": "0x59D88aD5bD90ebbBBcb135D65011e386f17f6359", "data": "0x8da5cb5b" })
        );
    }
}
