//! Wallet-contract binding for the Vote DApp.
//!
//! Before the voting UI can render anything it needs to know who is
//! connected and what they are allowed to do. This crate answers that in one
//! pass: find a provider, read the user's accounts, bind the deployed voting
//! contract, and ask the contract whether the active account is its owner.
//! The result is an immutable [`Session`] or a [`SessionFailure`] saying
//! which stage broke and why.
//!
//! It is the foundation for the `votelink` CLI, the `votelink-wasm` browser
//! bindings and the `votelink-rpc` HTTP provider.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`address`] | [`Address`] (EIP-55), [`AccountAddress`], [`display_address`] |
//! | [`abi`] | Interface descriptions parsed from ABI / artifact JSON into `alloy-json-abi` items |
//! | [`codec`] | Argument parsing and JSON display of `alloy-dyn-abi` values |
//! | [`artifacts`] | The bundled `Voting` interface and deployment address |
//! | [`provider`] | The [`Provider`] seam and an in-memory implementation |
//! | [`locator`] | [`ProviderLocator`] and its static / fallback forms |
//! | [`accounts`] | [`resolve_accounts`] |
//! | [`contract`] | [`bind_contract`] and read-only calls via [`ContractHandle`] |
//! | [`role`] | [`resolve_role`]: owner or voter |
//! | [`session`] | [`SessionAssembler`] and the resulting [`Session`] |
//! | [`slot`] | [`SessionSlot`]: newest run wins |
//! | [`error`] | [`FailureKind`] and [`SessionFailure`] |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use votelink::{artifacts, SessionAssembler, StaticLocator};
//!
//! let locator = Arc::new(StaticLocator::new(provider));
//! let assembler = SessionAssembler::new(
//!     locator,
//!     artifacts::VOTING_CONTRACT_ADDRESS,
//!     Arc::new(artifacts::voting_abi()?),
//! );
//!
//! match assembler.establish().await {
//!     Ok(session) => println!("{} ({:?})", session.display_address(), session.role()),
//!     Err(failure) => eprintln!("{}", failure.user_message()),
//! }
//! ```

pub mod abi;
pub mod accounts;
pub mod address;
pub mod artifacts;
pub mod codec;
pub mod contract;
pub mod error;
pub mod locator;
pub mod provider;
pub mod role;
pub mod session;
pub mod slot;

pub use abi::{Abi, AbiError, Function, StateMutability};
pub use alloy_dyn_abi::{DynSolType, DynSolValue};
pub use accounts::resolve_accounts;
pub use address::{display_address, AccountAddress, Address, AddressError};
pub use codec::CodecError;
pub use contract::{bind_contract, bind_contract_json, BindError, CallError, ContractHandle};
pub use error::{FailureCause, FailureKind, SessionFailure, USER_NOTICE};
pub use locator::{FallbackLocator, ProviderLocator, StaticLocator};
pub use provider::{CallRequest, MaybeSendSync, Provider, ProviderError};
pub use role::{resolve_role, Role};
pub use session::{Session, SessionAssembler, SessionStage, SessionSummary};
pub use slot::{SessionSlot, Ticket};
