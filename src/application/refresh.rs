//! Refresh generations
//!
//! A screen may start a new refresh before the previous one finishes. Each
//! refresh takes a ticket; only the newest ticket may publish its result,
//! so a slow stale response can never overwrite a newer one. Failed
//! refreshes publish nothing and the last successful data stays visible.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Proof that a refresh was started, compared against the latest issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Monotonically increasing refresh counter
#[derive(Debug, Default)]
pub struct RefreshGeneration {
    latest: AtomicU64,
}

impl RefreshGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a refresh, invalidating every earlier ticket
    pub fn begin(&self) -> RefreshTicket {
        RefreshTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// Data shown by one screen plus the generation guarding it
#[derive(Debug)]
pub struct ScreenState<T> {
    generation: RefreshGeneration,
    data: RwLock<Option<(RefreshTicket, T)>>,
}

impl<T: Clone> ScreenState<T> {
    pub fn new() -> Self {
        Self {
            generation: RefreshGeneration::new(),
            data: RwLock::new(None),
        }
    }

    pub fn begin(&self) -> RefreshTicket {
        self.generation.begin()
    }

    /// Publish a result. Returns `false` when the ticket is stale or the
    /// refresh failed, leaving the previous data in place.
    pub fn complete<E: std::fmt::Display>(&self, ticket: RefreshTicket, result: Result<T, E>) -> bool {
        let value = match result {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Refresh #{} failed, keeping previous data: {}", ticket.0, e);
                return false;
            }
        };

        let Ok(mut data) = self.data.write() else {
            return false;
        };
        // Checked under the lock so a newer ticket cannot publish in between
        if !self.generation.is_current(ticket) {
            tracing::debug!("Discarding stale refresh #{}", ticket.0);
            return false;
        }
        *data = Some((ticket, value));
        true
    }

    /// Last published data
    pub fn current(&self) -> Option<T> {
        self.data
            .read()
            .ok()
            .and_then(|data| data.as_ref().map(|(_, value)| value.clone()))
    }

    /// Generation of the last published data
    pub fn published_generation(&self) -> Option<u64> {
        self.data
            .read()
            .ok()
            .and_then(|data| data.as_ref().map(|(ticket, _)| ticket.0))
    }
}

impl<T: Clone> Default for ScreenState<T> {
    fn default() -> Self {
        Self::new()
    }
}
