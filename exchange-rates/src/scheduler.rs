//! Background refresh of the rate cache.
//!
//! At most one fetch runs at a time. A failed fetch never touches the cache:
//! the last good snapshot keeps serving while retries back off exponentially.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until, timeout};
use tracing::{debug, info, warn};

use fx_types::{FetchError, RateSnapshot, RateSource};

use crate::cache::RateCache;
use crate::config::ProviderConfig;

/// Result of one refresh attempt.
#[derive(Debug)]
pub enum RefreshOutcome {
    Installed(Arc<RateSnapshot>),
    Failed(FetchError),
    /// Another refresh was in flight; nothing was fetched.
    AlreadyRunning,
}

/// Refresh bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshStatus {
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    /// Monotonic time of the last failed attempt.
    pub last_failure_at: Option<Instant>,
    pub in_flight: bool,
}

/// Longest delay the refresh loop will ever sleep.
pub const MAX_DELAY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Clears the in-flight flag and announces the finished attempt when
/// dropped, including on cancellation.
struct InFlightGuard<'a> {
    in_flight: &'a AtomicBool,
    attempts: &'a watch::Sender<u64>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
        self.attempts.send_modify(|n| *n = n.wrapping_add(1));
    }
}

/// Keeps a [`RateCache`] fed from a [`RateSource`].
pub struct RefreshScheduler<S: RateSource> {
    source: S,
    cache: Arc<RateCache>,
    config: ProviderConfig,
    in_flight: AtomicBool,
    status: Mutex<RefreshStatus>,
    attempts: watch::Sender<u64>,
    wake: Notify,
}

impl<S: RateSource> RefreshScheduler<S> {
    pub fn new(source: S, cache: Arc<RateCache>, config: ProviderConfig) -> Self {
        Self {
            source,
            cache,
            config,
            in_flight: AtomicBool::new(false),
            status: Mutex::new(RefreshStatus::default()),
            attempts: watch::channel(0).0,
            wake: Notify::new(),
        }
    }

    pub fn cache(&self) -> &Arc<RateCache> {
        &self.cache
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// True when nothing is installed or the snapshot reached `stale_after`.
    pub fn is_stale(&self) -> bool {
        self.cache
            .current_age()
            .is_none_or(|age| age >= self.config.stale_after)
    }

    pub fn status(&self) -> RefreshStatus {
        let mut status = self.lock_status().clone();
        status.in_flight = self.is_refreshing();
        status
    }

    /// True while the last attempt failed and its backoff window is open.
    pub fn in_backoff(&self) -> bool {
        let status = self.lock_status();
        match status.last_failure_at {
            Some(failed_at) if status.consecutive_failures > 0 => {
                let window = backoff_delay(
                    status.consecutive_failures,
                    self.config.retry_initial,
                    self.config.retry_max,
                );
                failed_at.elapsed() < window
            }
            _ => false,
        }
    }

    /// Receiver whose value changes each time a refresh attempt finishes,
    /// whatever its outcome.
    pub fn attempts(&self) -> watch::Receiver<u64> {
        self.attempts.subscribe()
    }

    /// Asks the background loop for an early refresh.
    ///
    /// Ignored while the loop is backing off after a failure, and when the
    /// snapshot is no longer stale by the time the loop wakes.
    pub fn request_refresh(&self) {
        self.wake.notify_one();
    }

    /// Fetches and installs a snapshot now, unless a refresh is already running.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        let Some(_guard) = self.try_begin() else {
            debug!(source = self.source.name(), "Refresh already in flight, skipping");
            return RefreshOutcome::AlreadyRunning;
        };

        self.lock_status().last_attempt = Some(Utc::now());

        let fetched = match timeout(self.config.fetch_timeout, self.source.fetch_snapshot()).await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.config.fetch_timeout)),
        };

        match fetched {
            Ok(snapshot) => {
                let installed = self.cache.install(snapshot);
                {
                    let mut status = self.lock_status();
                    status.last_success = Some(Utc::now());
                    status.last_error = None;
                    status.consecutive_failures = 0;
                    status.last_failure_at = None;
                }
                info!(
                    source = installed.source(),
                    currencies = installed.len(),
                    published_on = ?installed.published_on(),
                    "Exchange rates refreshed"
                );
                RefreshOutcome::Installed(installed)
            }
            Err(err) => {
                let failures = {
                    let mut status = self.lock_status();
                    status.last_error = Some(err.to_string());
                    status.consecutive_failures = status.consecutive_failures.saturating_add(1);
                    status.last_failure_at = Some(Instant::now());
                    status.consecutive_failures
                };
                warn!(
                    source = self.source.name(),
                    error = %err,
                    consecutive_failures = failures,
                    serving_stale = !self.cache.is_empty(),
                    "Exchange rate refresh failed"
                );
                RefreshOutcome::Failed(err)
            }
        }
    }

    /// Runs the refresh loop until `shutdown` changes or its sender is dropped.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                source = self.source.name(),
                interval_secs = self.config.refresh_interval.as_secs(),
                "Starting exchange rate refresher"
            );

            'refresh: loop {
                let outcome = self.refresh_now().await;
                let delay = self.delay_after(&outcome);
                let accept_wake = !matches!(outcome, RefreshOutcome::Failed(_));
                let deadline = Instant::now()
                    .checked_add(delay)
                    .unwrap_or_else(|| Instant::now() + MAX_DELAY);

                debug!(delay_secs = delay.as_secs_f64(), "Next exchange rate refresh scheduled");

                loop {
                    tokio::select! {
                        _ = sleep_until(deadline) => break,
                        _ = self.wake.notified(), if accept_wake => {
                            if self.is_stale() {
                                debug!("Early refresh requested for stale snapshot");
                                break;
                            }
                        }
                        _ = shutdown.changed() => break 'refresh,
                    }
                }
            }

            info!(source = self.source.name(), "Exchange rate refresher stopped");
        })
    }

    fn delay_after(&self, outcome: &RefreshOutcome) -> Duration {
        let delay = match outcome {
            RefreshOutcome::Installed(_) => self.config.refresh_interval,
            RefreshOutcome::Failed(_) => {
                let failures = self.lock_status().consecutive_failures;
                let delay =
                    backoff_delay(failures, self.config.retry_initial, self.config.retry_max);
                jittered(delay, self.config.retry_jitter).min(self.config.retry_max)
            }
            RefreshOutcome::AlreadyRunning => self.config.retry_initial,
        };
        delay.min(MAX_DELAY)
    }

    fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                in_flight: &self.in_flight,
                attempts: &self.attempts,
            })
    }

    fn lock_status(&self) -> std::sync::MutexGuard<'_, RefreshStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exponential backoff: `initial * 2^(failures - 1)`, capped at `max`.
pub fn backoff_delay(failures: u32, initial: Duration, max: Duration) -> Duration {
    let exponent = failures.saturating_sub(1).min(31);
    initial.saturating_mul(1u32 << exponent).min(max)
}

fn jittered(delay: Duration, jitter: f64) -> Duration {
    let delay = delay.min(MAX_DELAY);
    if jitter <= 0.0 || delay.is_zero() {
        return delay;
    }
    let jitter = jitter.min(0.9);
    let factor = rand::rng().random_range((1.0 - jitter)..=(1.0 + jitter));
    delay.mul_f64(factor)
}
