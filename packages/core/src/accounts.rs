//! Account enumeration.

use tracing::debug;

use crate::address::AccountAddress;
use crate::error::{FailureKind, SessionFailure};
use crate::provider::{Provider, ProviderError};

/// Ask `provider` for the accounts the user controls.
///
/// The list may be empty; deciding what an empty list means is left to the
/// caller. Any provider error, including the user declining the wallet's
/// prompt, fails with [`FailureKind::AccountAccessDenied`].
pub async fn resolve_accounts(provider: &dyn Provider) -> Result<Vec<AccountAddress>, SessionFailure> {
    let raw = provider
        .accounts()
        .await
        .map_err(|e| SessionFailure::new(FailureKind::AccountAccessDenied, e))?;

    if let Some(i) = raw.iter().position(|a| a.trim().is_empty()) {
        return Err(SessionFailure::new(
            FailureKind::AccountAccessDenied,
            ProviderError::InvalidResponse(format!("account {i} is blank")),
        ));
    }

    debug!("accounts: provider returned {} account(s)", raw.len());
    Ok(raw.into_iter().map(AccountAddress::new).collect())
}
