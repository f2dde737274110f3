//! Contract interface descriptions (ABI).
//!
//! An [`Abi`] is loaded from the JSON emitted by the Solidity toolchain,
//! either as a bare array of entries or wrapped in a Hardhat/Truffle build
//! artifact that carries it under an `"abi"` key. Entries are parsed into
//! [`alloy_json_abi`] items and validated once at load time: every parameter
//! type must resolve to a [`DynSolType`] of bounded size. The description is
//! never modified afterwards.
//!
//! ```json
//! [
//!   { "type": "function", "name": "owner", "inputs": [],
//!     "outputs": [{ "name": "", "type": "address" }],
//!     "stateMutability": "view" }
//! ]
//! ```

use alloy_dyn_abi::{DynSolType, Specifier};
use alloy_json_abi::{Constructor, Event, Fallback, JsonAbi, Receive};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

pub use alloy_json_abi::{Function, Param, StateMutability};

/// Upper bound on the number of values one parameter type may expand to.
///
/// Fixed-size arrays are materialised element by element when return data
/// is decoded, so `address[9223372036854775807]` must be refused up front.
pub const MAX_TYPE_FOOTPRINT: usize = 1 << 16;

/// Errors that can occur when loading an interface description.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("interface description is not valid JSON: {0}")]
    Json(String),

    #[error("interface description must be an array or an artifact with an 'abi' array")]
    NotAnInterface,

    #[error("interface description declares no entries")]
    Empty,

    #[error("entry {index} is malformed: {message}")]
    MalformedEntry { index: usize, message: String },

    #[error("function at entry {0} has no name")]
    UnnamedFunction(usize),

    #[error("unsupported parameter type '{0}'")]
    UnsupportedType(String),
}

/// `pure` and `view` functions can be evaluated with `eth_call` alone.
pub fn is_read_only(mutability: StateMutability) -> bool {
    matches!(mutability, StateMutability::Pure | StateMutability::View)
}

/// The JSON spelling of `mutability`, e.g. `nonpayable`.
pub fn mutability_name(mutability: StateMutability) -> &'static str {
    match mutability {
        StateMutability::Pure => "pure",
        StateMutability::View => "view",
        StateMutability::NonPayable => "nonpayable",
        StateMutability::Payable => "payable",
    }
}

/// Resolve a parameter to its Solidity type, refusing types whose decoded
/// form would exceed [`MAX_TYPE_FOOTPRINT`] values.
pub fn param_type(param: &Param) -> Result<DynSolType, AbiError> {
    let ty = param
        .resolve()
        .map_err(|_| AbiError::UnsupportedType(param.ty.clone()))?;
    match footprint(&ty) {
        Some(n) if n <= MAX_TYPE_FOOTPRINT => Ok(ty),
        _ => Err(AbiError::UnsupportedType(param.ty.clone())),
    }
}

/// Number of values a decoder allocates for `ty` before reading any data.
/// Dynamic arrays count once; their length comes from (bounded) input.
fn footprint(ty: &DynSolType) -> Option<usize> {
    match ty {
        DynSolType::FixedArray(inner, n) => footprint(inner)?.checked_mul(*n),
        DynSolType::Array(inner) => footprint(inner)?.checked_add(1),
        DynSolType::Tuple(items) => items
            .iter()
            .try_fold(1usize, |acc, t| acc.checked_add(footprint(t)?)),
        _ => Some(1),
    }
}

/// Size in bytes of the head `types` occupy when ABI-encoded as a sequence.
///
/// Encoded data shorter than this cannot be valid. Types are expected to
/// have passed [`param_type`]; overflow saturates.
pub fn head_size(types: &[DynSolType]) -> usize {
    types
        .iter()
        .fold(0usize, |acc, t| acc.saturating_add(head_words(t).saturating_mul(32)))
}

fn head_words(ty: &DynSolType) -> usize {
    if ty.is_dynamic() {
        return 1;
    }
    match ty {
        DynSolType::FixedArray(inner, n) => head_words(inner).saturating_mul(*n),
        DynSolType::Tuple(items) => items
            .iter()
            .fold(0usize, |acc, t| acc.saturating_add(head_words(t))),
        _ => 1,
    }
}

/// A validated interface description.
#[derive(Debug, Clone)]
pub struct Abi {
    inner: JsonAbi,
}

impl Abi {
    /// Parse a bare ABI array or a build artifact containing one.
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let value: Value = serde_json::from_str(json).map_err(|e| AbiError::Json(e.to_string()))?;
        Self::from_value(value)
    }

    /// As [`Abi::from_json`], from an already-parsed document.
    pub fn from_value(value: Value) -> Result<Self, AbiError> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut obj) => match obj.remove("abi") {
                Some(Value::Array(items)) => items,
                _ => return Err(AbiError::NotAnInterface),
            },
            _ => return Err(AbiError::NotAnInterface),
        };
        if items.is_empty() {
            return Err(AbiError::Empty);
        }

        let mut inner = JsonAbi::default();
        for (index, item) in items.into_iter().enumerate() {
            let Value::Object(mut obj) = item else {
                return Err(malformed(index, "entry is not an object"));
            };
            // Entries without a `type` are functions.
            let kind = match obj.remove("type") {
                None => "function".to_string(),
                Some(Value::String(kind)) => kind,
                Some(other) => return Err(malformed(index, format!("bad type {other}"))),
            };
            fill_defaults(&kind, &mut obj);

            match kind.as_str() {
                "function" => {
                    let f: Function = entry(index, obj)?;
                    if f.name.trim().is_empty() {
                        return Err(AbiError::UnnamedFunction(index));
                    }
                    for p in f.inputs.iter().chain(&f.outputs) {
                        param_type(p)?;
                    }
                    inner.functions.entry(f.name.clone()).or_default().push(f);
                }
                "event" => {
                    let e: Event = entry(index, obj)?;
                    for p in &e.inputs {
                        let ty = p
                            .resolve()
                            .map_err(|_| AbiError::UnsupportedType(p.ty.clone()))?;
                        if !footprint(&ty).is_some_and(|n| n <= MAX_TYPE_FOOTPRINT) {
                            return Err(AbiError::UnsupportedType(p.ty.clone()));
                        }
                    }
                    inner.events.entry(e.name.clone()).or_default().push(e);
                }
                "error" => {
                    let e: alloy_json_abi::Error = entry(index, obj)?;
                    for p in &e.inputs {
                        param_type(p)?;
                    }
                    inner.errors.entry(e.name.clone()).or_default().push(e);
                }
                "constructor" => {
                    let c: Constructor = entry(index, obj)?;
                    for p in &c.inputs {
                        param_type(p)?;
                    }
                    inner.constructor = Some(c);
                }
                "fallback" => inner.fallback = Some(entry::<Fallback>(index, obj)?),
                "receive" => inner.receive = Some(entry::<Receive>(index, obj)?),
                other => return Err(malformed(index, format!("unknown entry type '{other}'"))),
            }
        }

        Ok(Self { inner })
    }

    /// The underlying description.
    pub fn json_abi(&self) -> &JsonAbi {
        &self.inner
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.inner.functions.values().flatten()
    }

    /// The function named `name` taking `arity` inputs. Overloads are told
    /// apart by input count only.
    pub fn function(&self, name: &str, arity: usize) -> Option<&Function> {
        self.inner
            .functions
            .get(name)?
            .iter()
            .find(|f| f.inputs.len() == arity)
    }

    /// `true` if any function has this name, regardless of arity.
    pub fn has_function(&self, name: &str) -> bool {
        self.inner.functions.contains_key(name)
    }

    /// Input counts of every overload of `name`.
    pub fn arities(&self, name: &str) -> Vec<usize> {
        self.inner
            .functions
            .get(name)
            .map(|fs| fs.iter().map(|f| f.inputs.len()).collect())
            .unwrap_or_default()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.inner.events.values().flatten()
    }
}

fn malformed(index: usize, message: impl Into<String>) -> AbiError {
    AbiError::MalformedEntry {
        index,
        message: message.into(),
    }
}

fn entry<T: DeserializeOwned>(index: usize, obj: Map<String, Value>) -> Result<T, AbiError> {
    serde_json::from_value(Value::Object(obj)).map_err(|e| malformed(index, e.to_string()))
}

/// Fill fields older or hand-written descriptions leave out: empty
/// parameter lists, unnamed parameters, non-indexed event fields, and
/// `stateMutability` derived from the pre-0.4.16 `constant`/`payable` flags.
fn fill_defaults(kind: &str, obj: &mut Map<String, Value>) {
    for key in ["inputs", "outputs"] {
        if key == "outputs" && kind != "function" {
            continue;
        }
        if matches!(kind, "fallback" | "receive") {
            continue;
        }
        let params = obj
            .entry(key)
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(params) = params {
            for p in params {
                fill_param(p, kind == "event");
            }
        }
    }

    if matches!(kind, "function" | "constructor" | "fallback" | "receive")
        && !obj.contains_key("stateMutability")
    {
        let constant = obj.get("constant").and_then(Value::as_bool).unwrap_or(false);
        let payable = obj.get("payable").and_then(Value::as_bool).unwrap_or(false);
        let mutability = match (kind, constant, payable) {
            ("receive", _, _) => "payable",
            (_, true, _) => "view",
            (_, _, true) => "payable",
            _ => "nonpayable",
        };
        obj.insert("stateMutability".into(), Value::from(mutability));
    }
    obj.remove("constant");
    obj.remove("payable");

    if kind == "event" {
        obj.entry("anonymous").or_insert(Value::Bool(false));
    }
}

fn fill_param(param: &mut Value, indexed: bool) {
    let Value::Object(obj) = param else { return };
    obj.entry("name").or_insert_with(|| Value::from(""));
    if indexed {
        obj.entry("indexed").or_insert(Value::Bool(false));
    }
    if let Some(Value::Array(components)) = obj.get_mut("components") {
        for c in components {
            fill_param(c, false);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::keccak256;

    const OWNABLE: &str = r#"[
        { "type": "function", "name": "owner", "inputs": [],
          "outputs": [{ "name": "", "type": "address", "internalType": "address" }],
          "stateMutability": "view" },
        { "type": "function", "name": "transferOwnership",
          "inputs": [{ "name": "newOwner", "type": "address" }],
          "outputs": [], "stateMutability": "nonpayable" },
        { "type": "event", "name": "OwnershipTransferred", "anonymous": false,
          "inputs": [
            { "name": "previousOwner", "type": "address", "indexed": true },
            { "name": "newOwner", "type": "address", "indexed": true }
          ] }
    ]"#;

    fn function_abi(outputs: &str) -> String {
        format!(
            r#"[{{ "type": "function", "name": "owner", "inputs": [],
                  "outputs": [{{ "name": "", "type": "{outputs}" }}],
                  "stateMutability": "view" }}]"#
        )
    }

    #[test]
    fn parse_bare_array() {
        let abi = Abi::from_json(OWNABLE).unwrap();
        assert_eq!(abi.functions().count(), 2);
        assert_eq!(abi.events().count(), 1);
    }

    #[test]
    fn parse_artifact_wrapper() {
        let artifact = format!(r#"{{"contractName":"Ownable","abi":{OWNABLE},"bytecode":"0x"}}"#);
        let abi = Abi::from_json(&artifact).unwrap();
        assert!(abi.has_function("owner"));
    }

    #[test]
    fn owner_selector() {
        let abi = Abi::from_json(OWNABLE).unwrap();
        let owner = abi.function("owner", 0).unwrap();
        assert_eq!(owner.signature(), "owner()");
        assert_eq!(owner.selector().0, keccak256("owner()")[..4]);
        assert_eq!(hex::encode(owner.selector()), "8da5cb5b");
        assert!(is_read_only(owner.state_mutability));
    }

    #[test]
    fn transfer_ownership_selector() {
        let abi = Abi::from_json(OWNABLE).unwrap();
        let f = abi.function("transferOwnership", 1).unwrap();
        assert_eq!(hex::encode(f.selector()), "f2fde38b");
        assert!(!is_read_only(f.state_mutability));
        assert_eq!(mutability_name(f.state_mutability), "nonpayable");
    }

    #[test]
    fn tuple_outputs_resolve() {
        let json = r#"[{ "type": "function", "name": "getOneProposal",
            "inputs": [{ "name": "_id", "type": "uint256" }],
            "outputs": [{ "name": "", "type": "tuple", "components": [
                { "name": "description", "type": "string" },
                { "name": "voteCount", "type": "uint256" } ] }],
            "stateMutability": "view" }]"#;
        let abi = Abi::from_json(json).unwrap();
        let f = abi.function("getOneProposal", 1).unwrap();
        assert_eq!(hex::encode(f.selector()), "a2788cce");
        assert_eq!(
            param_type(&f.outputs[0]).unwrap(),
            DynSolType::Tuple(vec![DynSolType::String, DynSolType::Uint(256)])
        );
    }

    #[test]
    fn legacy_entry_without_type_is_view_function() {
        let abi = Abi::from_json(r#"[{ "name": "owner", "outputs": [{ "type": "address" }], "constant": true }]"#)
            .unwrap();
        let f = abi.function("owner", 0).unwrap();
        assert_eq!(f.state_mutability, StateMutability::View);
    }

    #[test]
    fn overloads_by_arity() {
        let json = r#"[
            { "type": "function", "name": "get", "inputs": [], "outputs": [], "stateMutability": "view" },
            { "type": "function", "name": "get", "inputs": [{ "name": "i", "type": "uint8" }],
              "outputs": [], "stateMutability": "view" }
        ]"#;
        let abi = Abi::from_json(json).unwrap();
        assert_eq!(abi.arities("get"), vec![0, 1]);
        assert_eq!(abi.function("get", 1).unwrap().signature(), "get(uint8)");
        assert!(abi.function("get", 2).is_none());
    }

    #[test]
    fn head_size_of_static_and_dynamic_types() {
        let types = [
            DynSolType::Address,
            DynSolType::FixedArray(Box::new(DynSolType::Uint(256)), 3),
            DynSolType::String,
        ];
        assert_eq!(head_size(&types), 32 * 5);
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(Abi::from_json("{not json"), Err(AbiError::Json(_))));
    }

    #[test]
    fn rejects_non_interface_documents() {
        assert!(matches!(Abi::from_json("42"), Err(AbiError::NotAnInterface)));
        assert!(matches!(
            Abi::from_json(r#"{"contractName":"X"}"#),
            Err(AbiError::NotAnInterface)
        ));
    }

    #[test]
    fn rejects_empty_interface() {
        assert!(matches!(Abi::from_json("[]"), Err(AbiError::Empty)));
    }

    #[test]
    fn rejects_unknown_entry_type() {
        assert!(matches!(
            Abi::from_json(r#"[{ "type": "modifier", "name": "onlyOwner" }]"#),
            Err(AbiError::MalformedEntry { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_unnamed_function() {
        assert!(matches!(
            Abi::from_json(r#"[{ "type": "function", "name": " ", "inputs": [] }]"#),
            Err(AbiError::UnnamedFunction(0))
        ));
    }

    #[test]
    fn rejects_unsupported_param_type() {
        assert!(Abi::from_json(
            r#"[{ "type": "function", "name": "f", "inputs": [{ "type": "uint7" }] }]"#
        )
        .is_err());
    }

    #[test]
    fn rejects_oversized_fixed_array() {
        let err = Abi::from_json(&function_abi("address[9223372036854775807]")).unwrap_err();
        assert!(
            matches!(err, AbiError::UnsupportedType(_) | AbiError::MalformedEntry { .. }),
            "got {err:?}"
        );
        assert!(Abi::from_json(&function_abi("uint256[65536][65536]")).is_err());
    }

    #[test]
    fn accepts_reasonable_fixed_array() {
        assert!(Abi::from_json(&function_abi("address[16]")).is_ok());
    }
}
