//! Exchange rate provider port.
//!
//! This trait is the contract the inbound adapters depend on. The production
//! implementation is cache-backed; tests use an in-memory one.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{Currency, ExchangeRate};
use crate::error::RateError;

/// Result for one element of a batch lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLookup {
    Found(ExchangeRate),
    NotFound(Currency),
}

impl RateLookup {
    /// Currency this result answers for.
    pub fn currency(&self) -> Currency {
        match self {
            RateLookup::Found(rate) => rate.currency(),
            RateLookup::NotFound(currency) => *currency,
        }
    }

    pub fn rate(&self) -> Option<&ExchangeRate> {
        match self {
            RateLookup::Found(rate) => Some(rate),
            RateLookup::NotFound(_) => None,
        }
    }
}

/// Readiness and refresh bookkeeping, for health reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderStatus {
    /// Base currency and source of the installed snapshot, if any.
    pub base: Option<Currency>,
    pub source: Option<String>,
    pub published_on: Option<NaiveDate>,
    pub as_of: Option<DateTime<Utc>>,
    pub age: Option<Duration>,
    pub currency_count: usize,
    pub stale: bool,
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    pub refresh_in_flight: bool,
}

impl ProviderStatus {
    /// True once a snapshot has been installed.
    pub fn is_ready(&self) -> bool {
        self.as_of.is_some()
    }
}

/// Port trait for exchange rate lookups.
#[async_trait::async_trait]
pub trait ExchangeRateProvider: Send + Sync + 'static {
    /// Latest rate for one currency code.
    async fn get_exchange_rate(&self, code: &str) -> Result<ExchangeRate, RateError>;

    /// Latest rates for an ordered list of codes, duplicates allowed.
    ///
    /// Any malformed code fails the whole call with every malformed input
    /// listed. Otherwise one result per input, in input order.
    async fn get_exchange_rates(&self, codes: &[String]) -> Result<Vec<RateLookup>, RateError>;

    /// Current readiness and refresh status.
    fn status(&self) -> ProviderStatus;
}
