//! In-memory stand-ins for tests of code built on the provider ports.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;

use fx_types::{
    Currency, DomainError, ExchangeRate, ExchangeRateProvider, FetchError, ProviderStatus,
    RateError, RateLookup, RateSnapshot, RateSource,
};

use crate::cache::RateCache;
use crate::provider::validate_codes;

/// Source name recorded on scripted snapshots.
pub const SCRIPTED_SOURCE: &str = "scripted";

type Step = Result<Vec<(String, Decimal)>, FetchError>;

/// [`RateSource`] that replays a fixed script of results.
///
/// Each fetch takes the next step; once the script is exhausted the last step
/// repeats. An empty script fails every fetch with [`FetchError::Empty`].
#[derive(Default)]
pub struct ScriptedRateSource {
    steps: Vec<Step>,
    latency: Duration,
    calls: Arc<AtomicUsize>,
}

impl ScriptedRateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a successful fetch of CZK-based rates.
    pub fn then_rates(mut self, rates: &[(&str, Decimal)]) -> Self {
        self.steps.push(Ok(rates
            .iter()
            .map(|(code, rate)| (code.to_string(), *rate))
            .collect()));
        self
    }

    /// Appends a failed fetch.
    pub fn then_error(mut self, err: FetchError) -> Self {
        self.steps.push(Err(err));
        self
    }

    /// Delay before every fetch completes.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Shared counter of fetches started.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait::async_trait]
impl RateSource for ScriptedRateSource {
    fn name(&self) -> &str {
        SCRIPTED_SOURCE
    }

    async fn fetch_snapshot(&self) -> Result<RateSnapshot, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let step = match self.steps.get(call).or_else(|| self.steps.last()) {
            Some(step) => step.clone(),
            None => return Err(FetchError::Empty),
        };

        let rates = step?;
        build_snapshot(SCRIPTED_SOURCE, &rates).map_err(|e| FetchError::Parse {
            line: 0,
            reason: e.to_string(),
        })
    }
}

fn build_snapshot(source: &str, rates: &[(String, Decimal)]) -> Result<RateSnapshot, DomainError> {
    let as_of = Utc::now();
    let rates = rates
        .iter()
        .map(|(code, rate)| ExchangeRate::new(Currency::parse(code)?, Currency::CZK, *rate, as_of))
        .collect::<Result<Vec<_>, _>>()?;
    RateSnapshot::new(Currency::CZK, source, None, as_of, rates)
}

/// [`ExchangeRateProvider`] over a fixed snapshot, with no source or refresh.
///
/// Applies the same validation and error taxonomy as the cached provider.
pub struct InMemoryRateProvider {
    cache: RateCache,
}

impl InMemoryRateProvider {
    /// Provider with no data; every well-formed lookup is `Unavailable`.
    pub fn empty() -> Self {
        Self {
            cache: RateCache::new(),
        }
    }

    /// Provider serving CZK-based `rates` observed now.
    pub fn with_rates(rates: &[(&str, Decimal)]) -> Result<Self, DomainError> {
        let owned: Vec<(String, Decimal)> = rates
            .iter()
            .map(|(code, rate)| (code.to_string(), *rate))
            .collect();
        Ok(Self::from_snapshot(build_snapshot("in-memory", &owned)?))
    }

    pub fn from_snapshot(snapshot: RateSnapshot) -> Self {
        let provider = Self::empty();
        provider.cache.install(snapshot);
        provider
    }
}

#[async_trait::async_trait]
impl ExchangeRateProvider for InMemoryRateProvider {
    async fn get_exchange_rate(&self, code: &str) -> Result<ExchangeRate, RateError> {
        let currency = Currency::parse(code)
            .map_err(|_| RateError::InvalidCode(vec![code.trim().to_string()]))?;
        self.cache.lookup(&currency)
    }

    async fn get_exchange_rates(&self, codes: &[String]) -> Result<Vec<RateLookup>, RateError> {
        let currencies = validate_codes(codes)?;
        if currencies.is_empty() {
            return Ok(Vec::new());
        }
        self.cache.lookup_many(&currencies)
    }

    fn status(&self) -> ProviderStatus {
        match self.cache.snapshot() {
            Some(snapshot) => ProviderStatus {
                base: Some(snapshot.base()),
                source: Some(snapshot.source().to_string()),
                published_on: snapshot.published_on(),
                as_of: Some(snapshot.as_of()),
                age: Some(snapshot.age_at(Utc::now())),
                currency_count: snapshot.len(),
                ..ProviderStatus::default()
            },
            None => ProviderStatus::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_scripted_source_replays_and_repeats_last_step() {
        let source = ScriptedRateSource::new()
            .then_error(FetchError::Status(500))
            .then_rates(&[("USD", dec!(23.15))]);

        assert!(matches!(source.fetch_snapshot().await, Err(FetchError::Status(500))));
        assert_eq!(source.fetch_snapshot().await.unwrap().len(), 1);
        assert_eq!(source.fetch_snapshot().await.unwrap().len(), 1);
        assert_eq!(source.calls().load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_script_fails() {
        let source = ScriptedRateSource::new();
        assert!(matches!(source.fetch_snapshot().await, Err(FetchError::Empty)));
    }

    #[tokio::test]
    async fn test_in_memory_provider_matches_taxonomy() {
        let provider = InMemoryRateProvider::with_rates(&[("USD", dec!(23.15))]).unwrap();

        assert_eq!(
            provider.get_exchange_rate(" usd ").await.unwrap().rate(),
            dec!(23.15)
        );
        assert!(matches!(
            provider.get_exchange_rate("XYZ").await,
            Err(RateError::NotFound(_))
        ));
        assert!(matches!(
            provider.get_exchange_rate("US").await,
            Err(RateError::InvalidCode(_))
        ));
        assert!(provider.status().is_ready());

        let empty = InMemoryRateProvider::empty();
        assert_eq!(
            empty.get_exchange_rate("USD").await,
            Err(RateError::Unavailable)
        );
        assert!(!empty.status().is_ready());
    }
}
