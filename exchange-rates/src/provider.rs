//! Cache-backed exchange rate provider.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use fx_types::{
    Currency, ExchangeRate, ExchangeRateProvider, ProviderStatus, RateError, RateLookup,
    RateSnapshot, RateSource,
};

use crate::cache::RateCache;
use crate::config::ProviderConfig;
use crate::scheduler::{RefreshOutcome, RefreshScheduler};

/// Validates every code, collecting all malformed inputs.
///
/// Returns the normalized currencies in input order, or
/// [`RateError::InvalidCode`] listing each malformed input (trimmed) in order.
pub fn validate_codes<T: AsRef<str>>(codes: &[T]) -> Result<Vec<Currency>, RateError> {
    let mut valid = Vec::with_capacity(codes.len());
    let mut invalid = Vec::new();

    for code in codes {
        match Currency::parse(code.as_ref()) {
            Ok(currency) => valid.push(currency),
            Err(_) => invalid.push(code.as_ref().trim().to_string()),
        }
    }

    if invalid.is_empty() {
        Ok(valid)
    } else {
        Err(RateError::InvalidCode(invalid))
    }
}

/// Production [`ExchangeRateProvider`]: validation, cached lookups, and
/// refresh-on-staleness over a [`RateSource`].
///
/// Lookups only read the installed snapshot. The one exception is a cold
/// start: with nothing installed, the first caller fetches inline (bounded by
/// the fetch timeout) and concurrent callers wait for that attempt to finish.
/// After a failed attempt, cold lookups answer `Unavailable` without fetching
/// until the retry backoff window has passed.
pub struct CachedRateProvider<S: RateSource> {
    cache: Arc<RateCache>,
    scheduler: Arc<RefreshScheduler<S>>,
}

impl<S: RateSource> CachedRateProvider<S> {
    /// Creates a provider with an empty cache. Call [`start`](Self::start) to
    /// begin background refreshes.
    pub fn new(source: S, config: ProviderConfig) -> Self {
        let cache = Arc::new(RateCache::new());
        let scheduler = Arc::new(RefreshScheduler::new(source, cache.clone(), config));
        Self { cache, scheduler }
    }

    pub fn cache(&self) -> &Arc<RateCache> {
        &self.cache
    }

    pub fn scheduler(&self) -> &Arc<RefreshScheduler<S>> {
        &self.scheduler
    }

    /// Spawns the background refresher. Dropping the handle also stops it.
    pub fn start(&self) -> RefreshHandle {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = self.scheduler.clone().spawn(shutdown_rx);
        RefreshHandle { shutdown, task }
    }

    async fn ensure_snapshot(&self) -> Result<Arc<RateSnapshot>, RateError> {
        if let Some(snapshot) = self.cache.snapshot() {
            if snapshot.age_at(Utc::now()) >= self.scheduler.config().stale_after {
                debug!(as_of = %snapshot.as_of(), "Serving stale snapshot, requesting refresh");
                self.scheduler.request_refresh();
            }
            return Ok(snapshot);
        }

        if self.scheduler.in_backoff() {
            debug!("No snapshot yet and last fetch failed recently, not retrying inline");
            return Err(RateError::Unavailable);
        }

        let attempts = self.scheduler.attempts();
        match self.scheduler.refresh_now().await {
            RefreshOutcome::Installed(snapshot) => Ok(snapshot),
            RefreshOutcome::Failed(_) => Err(RateError::Unavailable),
            RefreshOutcome::AlreadyRunning => self.wait_for_attempt(attempts).await,
        }
    }

    /// Waits for the in-flight attempt to finish, bounded by the fetch timeout.
    async fn wait_for_attempt(
        &self,
        mut attempts: watch::Receiver<u64>,
    ) -> Result<Arc<RateSnapshot>, RateError> {
        let settled = async {
            loop {
                if attempts.changed().await.is_err() {
                    return None;
                }
                if let Some(snapshot) = self.cache.snapshot() {
                    return Some(snapshot);
                }
                if !self.scheduler.is_refreshing() {
                    return None;
                }
            }
        };

        match timeout(self.scheduler.config().fetch_timeout, settled).await {
            Ok(Some(snapshot)) => Ok(snapshot),
            _ => Err(RateError::Unavailable),
        }
    }
}

#[async_trait::async_trait]
impl<S: RateSource> ExchangeRateProvider for CachedRateProvider<S> {
    async fn get_exchange_rate(&self, code: &str) -> Result<ExchangeRate, RateError> {
        let currency = Currency::parse(code)
            .map_err(|_| RateError::InvalidCode(vec![code.trim().to_string()]))?;

        let snapshot = self.ensure_snapshot().await?;
        snapshot
            .get(&currency)
            .cloned()
            .ok_or(RateError::NotFound(currency))
    }

    async fn get_exchange_rates(&self, codes: &[String]) -> Result<Vec<RateLookup>, RateError> {
        let currencies = validate_codes(codes)?;
        if currencies.is_empty() {
            return Ok(Vec::new());
        }

        self.ensure_snapshot().await?;
        self.cache.lookup_many(&currencies)
    }

    fn status(&self) -> ProviderStatus {
        let refresh = self.scheduler.status();
        let snapshot = self.cache.snapshot();
        let age = snapshot.as_ref().map(|s| s.age_at(Utc::now()));

        ProviderStatus {
            base: snapshot.as_ref().map(|s| s.base()),
            source: snapshot.as_ref().map(|s| s.source().to_string()),
            published_on: snapshot.as_ref().and_then(|s| s.published_on()),
            as_of: snapshot.as_ref().map(|s| s.as_of()),
            age,
            currency_count: snapshot.as_ref().map_or(0, |s| s.len()),
            stale: age.is_some_and(|a| a >= self.scheduler.config().stale_after),
            last_attempt: refresh.last_attempt,
            last_success: refresh.last_success,
            last_error: refresh.last_error,
            consecutive_failures: refresh.consecutive_failures,
            refresh_in_flight: refresh.in_flight,
        }
    }
}

/// Running background refresher.
pub struct RefreshHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stops the refresher and waits for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.task.await {
            warn!(error = %err, "Exchange rate refresher ended abnormally");
        }
    }
}
