//! Snapshot cache with atomic replacement.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::debug;

use fx_types::{Currency, ExchangeRate, RateError, RateLookup, RateSnapshot};

/// Holds the current [`RateSnapshot`].
///
/// The snapshot lives behind a single `Arc` in a watch channel. Readers clone
/// the `Arc` and work on that snapshot; `install` swaps the whole reference.
/// A reader therefore sees either the old table or the new one, never a mix.
pub struct RateCache {
    current: watch::Sender<Option<Arc<RateSnapshot>>>,
}

impl RateCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    /// Returns the installed snapshot, if any.
    pub fn snapshot(&self) -> Option<Arc<RateSnapshot>> {
        self.current.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.current.borrow().is_none()
    }

    /// Rate for one currency from the current snapshot.
    pub fn lookup(&self, currency: &Currency) -> Result<ExchangeRate, RateError> {
        let snapshot = self.snapshot().ok_or(RateError::Unavailable)?;
        snapshot
            .get(currency)
            .cloned()
            .ok_or(RateError::NotFound(*currency))
    }

    /// Rates for `currencies` in input order, all answered from one snapshot.
    pub fn lookup_many(&self, currencies: &[Currency]) -> Result<Vec<RateLookup>, RateError> {
        let snapshot = self.snapshot().ok_or(RateError::Unavailable)?;
        Ok(currencies
            .iter()
            .map(|currency| match snapshot.get(currency) {
                Some(rate) => RateLookup::Found(rate.clone()),
                None => RateLookup::NotFound(*currency),
            })
            .collect())
    }

    /// Replaces the current snapshot.
    pub fn install(&self, snapshot: RateSnapshot) -> Arc<RateSnapshot> {
        let snapshot = Arc::new(snapshot);
        let previous = self.current.send_replace(Some(snapshot.clone()));

        debug!(
            currencies = snapshot.len(),
            as_of = %snapshot.as_of(),
            replaced = previous.is_some(),
            "Installed rate snapshot"
        );

        snapshot
    }

    /// Time since the installed snapshot's `as_of`, `None` when empty.
    pub fn current_age(&self) -> Option<Duration> {
        self.snapshot().map(|s| s.age_at(Utc::now()))
    }

    /// Receiver notified on every install.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<RateSnapshot>>> {
        self.current.subscribe()
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}
