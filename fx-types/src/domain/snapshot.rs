//! Point-in-time rate table.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use super::currency::Currency;
use super::rate::ExchangeRate;
use crate::error::DomainError;

/// Every rate known as of one instant.
///
/// A snapshot is immutable once built. Refreshing the cache replaces the whole
/// snapshot rather than editing entries in place.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    base: Currency,
    source: String,
    published_on: Option<NaiveDate>,
    as_of: DateTime<Utc>,
    rates: HashMap<Currency, ExchangeRate>,
}

impl RateSnapshot {
    /// Builds a snapshot from a complete set of rates.
    ///
    /// Fails on an empty set, on a rate quoted against another base, and on
    /// duplicate currencies, so a partially valid table never becomes a
    /// snapshot.
    pub fn new(
        base: Currency,
        source: impl Into<String>,
        published_on: Option<NaiveDate>,
        as_of: DateTime<Utc>,
        rates: impl IntoIterator<Item = ExchangeRate>,
    ) -> Result<Self, DomainError> {
        let mut table = HashMap::new();

        for rate in rates {
            if rate.base() != base {
                return Err(DomainError::BaseMismatch {
                    expected: base,
                    got: rate.base(),
                });
            }
            let currency = rate.currency();
            if table.insert(currency, rate).is_some() {
                return Err(DomainError::DuplicateCurrency(currency));
            }
        }

        if table.is_empty() {
            return Err(DomainError::EmptySnapshot);
        }

        Ok(Self {
            base,
            source: source.into(),
            published_on,
            as_of,
            rates: table,
        })
    }

    pub fn base(&self) -> Currency {
        self.base
    }

    /// Name of the feed that produced this snapshot.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Fixing date reported by the feed, when it reports one.
    pub fn published_on(&self) -> Option<NaiveDate> {
        self.published_on
    }

    /// Instant the snapshot was observed.
    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    pub fn get(&self, currency: &Currency) -> Option<&ExchangeRate> {
        self.rates.get(currency)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Quoted currencies in code order.
    pub fn currencies(&self) -> Vec<Currency> {
        let mut codes: Vec<Currency> = self.rates.keys().copied().collect();
        codes.sort();
        codes
    }

    /// Rates in code order.
    pub fn rates(&self) -> Vec<&ExchangeRate> {
        let mut rates: Vec<&ExchangeRate> = self.rates.values().collect();
        rates.sort_by_key(|r| r.currency());
        rates
    }

    /// Elapsed time between `as_of` and `now`, zero if `now` is earlier.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.as_of)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}
