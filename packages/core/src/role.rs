//! Owner-vs-voter role resolution.

use serde::Serialize;
use tracing::debug;

use crate::address::AccountAddress;
use crate::codec;
use crate::contract::ContractHandle;
use crate::error::{FailureCause, FailureKind, SessionFailure};

/// The contract method that reports the administrative owner.
pub const OWNER_METHOD: &str = "owner";

/// What the active account may do in the voting UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The contract's owner: administers the election.
    Owner,
    /// Anyone else.
    Voter,
}

impl Role {
    pub fn from_is_owner(is_owner: bool) -> Self {
        if is_owner {
            Self::Owner
        } else {
            Self::Voter
        }
    }
}

/// `true` if `active` is the address `owner()` reports.
///
/// Exactly one read-only call is made. Any failure to obtain a single
/// `address` from it is [`FailureKind::ContractQueryFailed`]; the result
/// never silently defaults to `false`.
pub async fn resolve_role(
    contract: &ContractHandle,
    active: &AccountAddress,
) -> Result<bool, SessionFailure> {
    let failed = |cause: FailureCause| SessionFailure::new(FailureKind::ContractQueryFailed, cause);

    let outputs = contract
        .call(OWNER_METHOD, &[])
        .await
        .map_err(|e| failed(e.into()))?;

    let owner = match outputs.as_slice() {
        [value] => codec::as_address(value)
            .ok_or_else(|| failed(FailureCause::UnexpectedOwnerOutput(outputs.len())))?,
        _ => return Err(failed(FailureCause::UnexpectedOwnerOutput(outputs.len()))),
    };

    let is_owner = active.matches(&owner);
    debug!("role: owner is {owner}, active account {active} is_owner={is_owner}");
    Ok(is_owner)
}
