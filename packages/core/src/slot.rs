//! Latest-wins holder for session outcomes.
//!
//! A host may start a new establishment while an older one is still in
//! flight (the wallet switched accounts, the user pressed reconnect). Each
//! run takes a [`Ticket`] before it starts; when it finishes it publishes
//! with that ticket, and the slot keeps an outcome only if no newer ticket
//! has published first.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::error::SessionFailure;
use crate::session::Session;

pub type Outcome = Result<Session, SessionFailure>;

/// Orders establishment runs by start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Default)]
pub struct SessionSlot {
    next: AtomicU64,
    latest: RwLock<Option<(Ticket, Outcome)>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket newer than every ticket issued before.
    pub fn begin(&self) -> Ticket {
        Ticket(self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Install `outcome` unless a newer ticket has already published.
    pub fn publish(&self, ticket: Ticket, outcome: Outcome) -> bool {
        let mut latest = self.latest.write().unwrap_or_else(|p| p.into_inner());
        match latest.as_ref() {
            Some((current, _)) if *current > ticket => false,
            _ => {
                *latest = Some((ticket, outcome));
                true
            }
        }
    }

    /// The most recently installed outcome, if any.
    pub fn current(&self) -> Option<Outcome> {
        self.latest
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .map(|(_, outcome)| outcome.clone())
    }

    /// The ticket of the installed outcome.
    pub fn current_ticket(&self) -> Option<Ticket> {
        self.latest
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .map(|(ticket, _)| *ticket)
    }
}
