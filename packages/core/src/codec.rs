//! Argument parsing and display for contract values.
//!
//! Encoding and decoding themselves are done by [`alloy_dyn_abi`]; this
//! module only turns command-line style strings into [`DynSolValue`]s and
//! decoded values into JSON for display.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::U256;
use serde_json::{json, Value};
use thiserror::Error;

use crate::abi::{param_type, Function};
use crate::address::Address;

/// Errors raised while preparing arguments or reading return data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("cannot read '{raw}' as {kind}: {reason}")]
    InvalidArgument {
        raw: String,
        kind: String,
        reason: String,
    },

    #[error("{0}")]
    Encode(String),

    #[error("return data is {got} bytes, outputs need at least {needed}")]
    ShortData { needed: usize, got: usize },

    #[error("{0}")]
    Decode(String),
}

/// An unsigned 256-bit value.
pub fn uint(v: u64) -> DynSolValue {
    DynSolValue::Uint(U256::from(v), 256)
}

/// An address value.
pub fn address(a: Address) -> DynSolValue {
    DynSolValue::Address(a.into())
}

/// The address held by `value`, if it is one.
pub fn as_address(value: &DynSolValue) -> Option<Address> {
    value.as_address().map(Address::from)
}

/// Read a command-line style argument as a value of type `kind`.
///
/// Integers accept decimal or `0x` hex; byte types accept `0x` hex;
/// addresses are checked like [`Address::parse`].
pub fn parse_arg(kind: &DynSolType, raw: &str) -> Result<DynSolValue, CodecError> {
    let invalid = |reason: String| CodecError::InvalidArgument {
        raw: raw.to_string(),
        kind: kind.sol_type_name().into_owned(),
        reason,
    };
    if let DynSolType::Address = kind {
        return Address::parse(raw)
            .map(address)
            .map_err(|e| invalid(e.to_string()));
    }
    kind.coerce_str(raw).map_err(|e| invalid(e.to_string()))
}

/// Parse `raw` against the declared inputs of `function`, in order.
pub fn parse_args(function: &Function, raw: &[String]) -> Result<Vec<DynSolValue>, CodecError> {
    function
        .inputs
        .iter()
        .zip(raw)
        .map(|(param, arg)| {
            let kind = param_type(param).map_err(|e| CodecError::InvalidArgument {
                raw: arg.clone(),
                kind: param.ty.clone(),
                reason: e.to_string(),
            })?;
            parse_arg(&kind, arg)
        })
        .collect()
}

/// ABI-encode `values` the way a function returns them.
pub fn encode_outputs(values: &[DynSolValue]) -> Vec<u8> {
    DynSolValue::Tuple(values.to_vec()).abi_encode_params()
}

/// JSON rendering for display.
///
/// Integers become decimal strings; byte strings become `0x` hex;
/// addresses use their checksum form.
pub fn to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Address(a) => json!(Address::from(*a).to_checksum()),
        DynSolValue::Bool(b) => json!(b),
        DynSolValue::Uint(v, _) => json!(v.to_string()),
        DynSolValue::Int(v, _) => json!(v.to_string()),
        DynSolValue::FixedBytes(word, size) => {
            json!(format!("0x{}", hex::encode(&word[..*size])))
        }
        DynSolValue::Function(f) => json!(format!("0x{}", hex::encode(f))),
        DynSolValue::Bytes(b) => json!(format!("0x{}", hex::encode(b))),
        DynSolValue::String(s) => json!(s),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(to_json).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::I256;

    #[test]
    fn parse_uint_decimal_and_hex() {
        assert_eq!(parse_arg(&DynSolType::Uint(256), "2").unwrap(), uint(2));
        assert_eq!(parse_arg(&DynSolType::Uint(256), "0x10").unwrap(), uint(16));
    }

    #[test]
    fn parse_address_checks_checksum() {
        let ok = parse_arg(&DynSolType::Address, "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert!(ok.is_ok());
        let err = parse_arg(&DynSolType::Address, "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")
            .unwrap_err();
        assert!(err.to_string().contains("checksum"), "got {err}");
    }

    #[test]
    fn parse_bool_rejects_garbage() {
        assert_eq!(
            parse_arg(&DynSolType::Bool, "true").unwrap(),
            DynSolValue::Bool(true)
        );
        assert!(matches!(
            parse_arg(&DynSolType::Bool, "maybe"),
            Err(CodecError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn owner_reply_is_one_padded_word() {
        let owner = Address::from_bytes([0x42; 20]);
        let data = encode_outputs(&[address(owner)]);
        assert_eq!(data.len(), 32);
        assert_eq!(&data[..12], &[0u8; 12]);
        assert_eq!(&data[12..], owner.as_bytes());
    }

    #[test]
    fn json_rendering() {
        let value = DynSolValue::Tuple(vec![
            DynSolValue::String("Alice".into()),
            uint(3),
            DynSolValue::Int("-5".parse::<I256>().unwrap(), 256),
            DynSolValue::Bytes(vec![0xde, 0xad]),
            address(Address::from_bytes([0x11; 20])),
        ]);
        assert_eq!(
            to_json(&value),
            json!([
                "Alice",
                "3",
                "-5",
                "0xdead",
                "0x1111111111111111111111111111111111111111"
            ])
        );
    }
}
