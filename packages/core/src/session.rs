//! Session establishment.
//!
//! [`SessionAssembler`] runs the stages strictly in order:
//!
//! ```text
//! Idle -> LocatingProvider -> ResolvingAccounts -> BindingContract -> ResolvingRole -> Established
//!              |                    |                    |                 |
//!              +--------------------+--------------------+-----------------+--> Failed(kind)
//! ```
//!
//! The first failing stage ends the run. Nothing from a failed run is
//! exposed; a successful run yields one immutable [`Session`]. Running again
//! redoes every stage and produces a new value rather than touching the old.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::abi::Abi;
use crate::accounts::resolve_accounts;
use crate::address::{display_address, AccountAddress, Address};
use crate::contract::{bind_contract, BindError, ContractHandle};
use crate::error::{FailureCause, FailureKind, SessionFailure};
use crate::locator::ProviderLocator;
use crate::provider::Provider;
use crate::role::{resolve_role, Role};
use crate::slot::SessionSlot;

/// Progress of one establishment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "kind")]
pub enum SessionStage {
    Idle,
    LocatingProvider,
    ResolvingAccounts,
    BindingContract,
    ResolvingRole,
    Established,
    Failed(FailureKind),
}

impl SessionStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Established | Self::Failed(_))
    }
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::LocatingProvider => f.write_str("locating provider"),
            Self::ResolvingAccounts => f.write_str("resolving accounts"),
            Self::BindingContract => f.write_str("binding contract"),
            Self::ResolvingRole => f.write_str("resolving role"),
            Self::Established => f.write_str("established"),
            Self::Failed(kind) => write!(f, "failed ({kind})"),
        }
    }
}

/// Receives every stage transition of a run, in order.
pub type StageObserver = Arc<dyn Fn(SessionStage) + Send + Sync>;

/// The outcome of a successful run.
///
/// Immutable; a re-run produces a new `Session`.
#[derive(Clone)]
pub struct Session {
    provider: Arc<dyn Provider>,
    accounts: Vec<AccountAddress>,
    active_account: AccountAddress,
    contract: ContractHandle,
    is_owner: bool,
    display_address: String,
}

impl Session {
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Every account the provider reported, in its order. Never empty.
    pub fn accounts(&self) -> &[AccountAddress] {
        &self.accounts
    }

    /// The first reported account.
    pub fn active_account(&self) -> &AccountAddress {
        &self.active_account
    }

    pub fn contract(&self) -> &ContractHandle {
        &self.contract
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    pub fn role(&self) -> Role {
        Role::from_is_owner(self.is_owner)
    }

    pub fn display_address(&self) -> &str {
        &self.display_address
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            provider: self.provider.describe(),
            accounts: self.accounts.clone(),
            active_account: self.active_account.clone(),
            display_address: self.display_address.clone(),
            contract: self.contract.address(),
            is_owner: self.is_owner,
            role: self.role(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("provider", &self.provider.describe())
            .field("accounts", &self.accounts)
            .field("active_account", &self.active_account)
            .field("contract", &self.contract.address())
            .field("is_owner", &self.is_owner)
            .field("display_address", &self.display_address)
            .finish()
    }
}

/// Serializable view of a [`Session`] for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub provider: String,
    pub accounts: Vec<AccountAddress>,
    pub active_account: AccountAddress,
    pub display_address: String,
    pub contract: Address,
    pub is_owner: bool,
    pub role: Role,
}

enum Interface {
    Parsed(Arc<Abi>),
    Json(String),
}

/// Runs the establishment stages against a locator and a fixed contract.
///
/// The contract address and interface are validated at the binding stage,
/// so a malformed value surfaces as [`FailureKind::InvalidContractBinding`]
/// only after a provider and an account exist.
pub struct SessionAssembler {
    locator: Arc<dyn ProviderLocator>,
    contract_address: String,
    interface: Interface,
    observer: Option<StageObserver>,
}

impl SessionAssembler {
    pub fn new(
        locator: Arc<dyn ProviderLocator>,
        contract_address: impl Into<String>,
        abi: Arc<Abi>,
    ) -> Self {
        Self {
            locator,
            contract_address: contract_address.into(),
            interface: Interface::Parsed(abi),
            observer: None,
        }
    }

    /// As [`new`](Self::new), with the interface as raw JSON parsed at the
    /// binding stage.
    pub fn from_json(
        locator: Arc<dyn ProviderLocator>,
        contract_address: impl Into<String>,
        interface_json: impl Into<String>,
    ) -> Self {
        Self {
            locator,
            contract_address: contract_address.into(),
            interface: Interface::Json(interface_json.into()),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: impl Fn(SessionStage) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Run every stage once.
    pub async fn establish(&self) -> Result<Session, SessionFailure> {
        self.enter(SessionStage::Idle);
        match self.run().await {
            Ok(session) => {
                self.enter(SessionStage::Established);
                info!(
                    "session: established for {} (owner={}) via {}",
                    session.display_address,
                    session.is_owner,
                    session.provider.describe()
                );
                Ok(session)
            }
            Err(failure) => {
                self.enter(SessionStage::Failed(failure.kind));
                warn!("session: {} failed: {}", failure.kind, failure.cause);
                Err(failure)
            }
        }
    }

    /// Run [`establish`](Self::establish) and publish the outcome into
    /// `slot`. Returns `false` when a newer run had already published, in
    /// which case this outcome is dropped.
    pub async fn establish_into(&self, slot: &SessionSlot) -> bool {
        let ticket = slot.begin();
        let outcome = self.establish().await;
        let installed = slot.publish(ticket, outcome);
        if !installed {
            debug!("session: run {ticket} superseded, outcome discarded");
        }
        installed
    }

    async fn run(&self) -> Result<Session, SessionFailure> {
        self.enter(SessionStage::LocatingProvider);
        let provider = self
            .locator
            .locate()
            .await
            .map_err(|e| SessionFailure::new(FailureKind::NoProviderAvailable, e))?;

        self.enter(SessionStage::ResolvingAccounts);
        let accounts = resolve_accounts(provider.as_ref()).await?;
        let Some(active) = accounts.first().cloned() else {
            return Err(SessionFailure::new(
                FailureKind::NoActiveAccount,
                FailureCause::NoAccounts,
            ));
        };

        self.enter(SessionStage::BindingContract);
        let contract = self
            .bind(Arc::clone(&provider))
            .map_err(|e| SessionFailure::new(FailureKind::InvalidContractBinding, e))?;

        self.enter(SessionStage::ResolvingRole);
        let is_owner = resolve_role(&contract, &active).await?;

        Ok(Session {
            display_address: display_address(&active),
            provider,
            accounts,
            active_account: active,
            contract,
            is_owner,
        })
    }

    fn bind(&self, provider: Arc<dyn Provider>) -> Result<ContractHandle, BindError> {
        let abi = match &self.interface {
            Interface::Parsed(abi) => Arc::clone(abi),
            Interface::Json(json) => Arc::new(Abi::from_json(json)?),
        };
        bind_contract(provider, &self.contract_address, abi)
    }

    fn enter(&self, stage: SessionStage) {
        debug!("session: {stage}");
        if let Some(observer) = &self.observer {
            observer(stage);
        }
    }
}
