//! Provider tuning knobs.

use std::time::Duration;

/// English version of the CNB daily fixing, published on business days after 14:30 CET.
pub const CNB_DAILY_FEED_URL: &str = "https://www.cnb.cz/en/financial-markets/foreign-exchange-market/central-bank-exchange-rate-fixing/central-bank-exchange-rate-fixing/daily.txt";

/// Refresh and staleness policy for [`crate::CachedRateProvider`].
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Delay between successful refreshes.
    pub refresh_interval: Duration,
    /// Snapshot age at which lookups request an early refresh.
    pub stale_after: Duration,
    /// Upper bound on one upstream fetch.
    pub fetch_timeout: Duration,
    /// First retry delay after a failed refresh.
    pub retry_initial: Duration,
    /// Retry delays never exceed this.
    pub retry_max: Duration,
    /// Relative jitter applied to retry delays, in `0.0..1.0`.
    pub retry_jitter: f64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(24 * 60 * 60),
            stale_after: Duration::from_secs(26 * 60 * 60),
            fetch_timeout: Duration::from_secs(10),
            retry_initial: Duration::from_secs(30),
            retry_max: Duration::from_secs(30 * 60),
            retry_jitter: 0.1,
        }
    }
}

impl ProviderConfig {
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the retry backoff range. `max` is raised to `initial` if smaller.
    pub fn with_retry_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.retry_initial = initial;
        self.retry_max = max.max(initial);
        self
    }

    /// Sets the retry jitter, clamped to `0.0..=0.9`.
    pub fn with_retry_jitter(mut self, jitter: f64) -> Self {
        self.retry_jitter = jitter.clamp(0.0, 0.9);
        self
    }
}
