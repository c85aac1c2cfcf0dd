//! Cached Exchange Rate Provider
//!
//! Serves the latest CNB fixing rates from an in-memory snapshot that a
//! background task keeps fresh.
//!
//! # Components
//! - [`cnb`] - upstream client and feed parser, one fetch per call
//! - [`cache`] - the current snapshot, swapped atomically on refresh
//! - [`scheduler`] - periodic refresh, retry with backoff, single-flight
//! - [`provider`] - validation and lookups behind the `ExchangeRateProvider` port
//! - [`fake`] - scripted source and in-memory provider for tests
//!
//! # Rate direction
//! Every rate is CZK per **one** unit of the quoted currency. Feed quotes per
//! N units (100 JPY) are divided down on parse; the original figure is kept
//! alongside.
//!
//! # Example
//! ```no_run
//! use exchange_rates::{CachedRateProvider, CnbRateSource, ProviderConfig, CNB_DAILY_FEED_URL};
//! use fx_types::ExchangeRateProvider;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProviderConfig::default();
//! let source = CnbRateSource::new(CNB_DAILY_FEED_URL, config.fetch_timeout)?;
//! let provider = CachedRateProvider::new(source, config);
//! let refresher = provider.start();
//!
//! let usd = provider.get_exchange_rate("usd").await?;
//! println!("1 USD = {} CZK", usd.rate());
//!
//! refresher.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cnb;
pub mod config;
pub mod fake;
pub mod provider;
pub mod scheduler;

pub use cache::RateCache;
pub use cnb::{CnbRateSource, parse_daily_feed};
pub use config::{CNB_DAILY_FEED_URL, ProviderConfig};
pub use fake::{InMemoryRateProvider, ScriptedRateSource};
pub use provider::{CachedRateProvider, RefreshHandle, validate_codes};
pub use scheduler::{RefreshOutcome, RefreshScheduler, RefreshStatus};
