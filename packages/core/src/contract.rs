//! Contract binding and read-only calls.
//!
//! [`bind_contract`] pairs a provider with a deployed address and an
//! interface description. It does no I/O; the first network traffic happens
//! when [`ContractHandle::call`] is used.

use std::fmt;
use std::sync::Arc;

use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use thiserror::Error;

use crate::abi::{self, Abi, AbiError};
use crate::address::{Address, AddressError};
use crate::codec::CodecError;
use crate::provider::{CallRequest, Provider, ProviderError};

/// Why a contract handle could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("invalid contract address: {0}")]
    Address(#[from] AddressError),

    #[error("invalid interface description: {0}")]
    Interface(#[from] AbiError),
}

/// Why a read-only call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("the interface has no method '{0}'")]
    UnknownMethod(String),

    #[error("method '{name}' takes {expected:?} arguments, got {got}")]
    ArgumentCount {
        name: String,
        expected: Vec<usize>,
        got: usize,
    },

    #[error("method '{0}' is {1} and cannot be called read-only")]
    NotReadOnly(String, &'static str),

    #[error("interface entry for '{0}' is unusable: {1}")]
    Interface(String, AbiError),

    #[error("could not encode arguments: {0}")]
    Encode(CodecError),

    #[error("could not decode return data: {0}")]
    Decode(CodecError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// A bound contract: provider, address, and interface.
///
/// Cheap to clone; all clones share the provider and the interface.
#[derive(Clone)]
pub struct ContractHandle {
    provider: Arc<dyn Provider>,
    address: Address,
    abi: Arc<Abi>,
}

/// Build a [`ContractHandle`] for the contract at `address`.
///
/// `address` must be `0x` plus 40 hex digits with a valid checksum if it is
/// mixed-case.
pub fn bind_contract(
    provider: Arc<dyn Provider>,
    address: &str,
    abi: Arc<Abi>,
) -> Result<ContractHandle, BindError> {
    let address = Address::parse(address)?;
    Ok(ContractHandle {
        provider,
        address,
        abi,
    })
}

/// As [`bind_contract`], taking the interface as raw JSON (a bare ABI or a
/// build artifact).
pub fn bind_contract_json(
    provider: Arc<dyn Provider>,
    address: &str,
    interface_json: &str,
) -> Result<ContractHandle, BindError> {
    let abi = Abi::from_json(interface_json)?;
    bind_contract(provider, address, Arc::new(abi))
}

impl ContractHandle {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Call the read-only method `name` with `args` and decode its outputs.
    ///
    /// Overloads are resolved by argument count. Methods that are not `view`
    /// or `pure` are refused without contacting the provider.
    pub async fn call(&self, name: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>, CallError> {
        let function = match self.abi.function(name, args.len()) {
            Some(f) => f,
            None if self.abi.has_function(name) => {
                return Err(CallError::ArgumentCount {
                    name: name.to_string(),
                    expected: self.abi.arities(name),
                    got: args.len(),
                });
            }
            None => return Err(CallError::UnknownMethod(name.to_string())),
        };

        if !abi::is_read_only(function.state_mutability) {
            return Err(CallError::NotReadOnly(
                name.to_string(),
                abi::mutability_name(function.state_mutability),
            ));
        }

        let outputs = function
            .outputs
            .iter()
            .map(abi::param_type)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CallError::Interface(name.to_string(), e))?;

        let data = function
            .abi_encode_input(args)
            .map_err(|e| CallError::Encode(CodecError::Encode(e.to_string())))?;

        let request = CallRequest {
            to: self.address,
            data,
        };
        let returned = self.provider.call(&request).await?;

        let needed = abi::head_size(&outputs);
        if returned.len() < needed {
            return Err(CallError::Decode(CodecError::ShortData {
                needed,
                got: returned.len(),
            }));
        }
        function
            .abi_decode_output(&returned, true)
            .map_err(|e| CallError::Decode(CodecError::Decode(e.to_string())))
    }
}

impl fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractHandle")
            .field("address", &self.address)
            .field("provider", &self.provider.describe())
            .field("functions", &self.abi.functions().count())
            .finish()
    }
}
