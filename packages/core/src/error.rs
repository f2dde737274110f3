//! Session failures.
//!
//! Every stage error is wrapped into a [`SessionFailure`] carrying a
//! [`FailureKind`] for callers that branch on it and the original typed
//! error for diagnostics. Nothing is retried and nothing is swallowed.

use std::fmt;

use thiserror::Error;

use crate::contract::{BindError, CallError};
use crate::provider::ProviderError;

/// The one notice a presentation layer shows for any failure. Details go
/// to the log, not to the user.
pub const USER_NOTICE: &str =
    "Failed to load web3, accounts, or contract. Check console for details.";

/// Which stage failed, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum FailureKind {
    /// No injected provider and no reachable fallback endpoint.
    NoProviderAvailable,
    /// The provider refused to enumerate accounts.
    AccountAccessDenied,
    /// The provider returned an empty account list.
    NoActiveAccount,
    /// The contract address or interface description is malformed.
    InvalidContractBinding,
    /// The owner query failed (transport, revert, or bad return data).
    ContractQueryFailed,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoProviderAvailable => "NoProviderAvailable",
            Self::AccountAccessDenied => "AccountAccessDenied",
            Self::NoActiveAccount => "NoActiveAccount",
            Self::InvalidContractBinding => "InvalidContractBinding",
            Self::ContractQueryFailed => "ContractQueryFailed",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The underlying error behind a [`SessionFailure`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Binding(#[from] BindError),

    #[error(transparent)]
    Call(#[from] CallError),

    #[error("the provider returned no accounts")]
    NoAccounts,

    #[error("the owner query returned {0} values instead of one address")]
    UnexpectedOwnerOutput(usize),
}

/// A terminal failure of one session establishment run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {cause}")]
pub struct SessionFailure {
    pub kind: FailureKind,
    #[source]
    pub cause: FailureCause,
}

impl SessionFailure {
    pub fn new(kind: FailureKind, cause: impl Into<FailureCause>) -> Self {
        Self {
            kind,
            cause: cause.into(),
        }
    }

    /// The generic user-facing notice; see [`USER_NOTICE`].
    pub fn user_message(&self) -> &'static str {
        USER_NOTICE
    }
}
