//! Rate source port.
//!
//! A rate source produces a complete snapshot of an upstream feed in one call.
//! Implementations can be HTTP clients, fixed fixtures, etc.

use crate::domain::RateSnapshot;
use crate::error::FetchError;

/// Port trait for upstream rate feeds.
///
/// One call is one round-trip. Retries belong to the caller.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync + 'static {
    /// Short name used in logs and snapshot metadata.
    fn name(&self) -> &str;

    /// Fetches the full current rate table.
    ///
    /// Returns either a fully formed snapshot or an error, never a partial table.
    async fn fetch_snapshot(&self) -> Result<RateSnapshot, FetchError>;
}
