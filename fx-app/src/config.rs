//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use exchange_rates::{CNB_DAILY_FEED_URL, ProviderConfig};

/// Upper bound for every duration setting: one year.
const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub feed_url: String,
    pub provider: ProviderConfig,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("PORT must be a port number: {}", e))?;

        let feed_url = lookup("CNB_FEED_URL").unwrap_or_else(|| CNB_DAILY_FEED_URL.to_string());

        let defaults = ProviderConfig::default();
        let secs = |key: &str, default: Duration| -> anyhow::Result<Duration> {
            match lookup(key) {
                Some(raw) => {
                    let value: u64 = raw.trim().parse().map_err(|e| {
                        anyhow::anyhow!("{} must be a whole number of seconds: {}", key, e)
                    })?;
                    if value == 0 {
                        anyhow::bail!("{} must be greater than zero", key);
                    }
                    if value > MAX_DURATION_SECS {
                        anyhow::bail!("{} must be at most {} seconds", key, MAX_DURATION_SECS);
                    }
                    Ok(Duration::from_secs(value))
                }
                None => Ok(default),
            }
        };

        let provider = defaults
            .clone()
            .with_refresh_interval(secs("RATES_REFRESH_INTERVAL_SECS", defaults.refresh_interval)?)
            .with_stale_after(secs("RATES_STALE_AFTER_SECS", defaults.stale_after)?)
            .with_fetch_timeout(secs("RATES_FETCH_TIMEOUT_SECS", defaults.fetch_timeout)?)
            .with_retry_backoff(
                secs("RATES_RETRY_INITIAL_SECS", defaults.retry_initial)?,
                secs("RATES_RETRY_MAX_SECS", defaults.retry_max)?,
            );

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => anyhow::bail!("LOG_FORMAT must be 'text' or 'json', got '{}'", other),
        };

        Ok(Self {
            port,
            feed_url,
            provider,
            log_format,
        })
    }
}
