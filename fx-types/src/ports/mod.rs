//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod provider;
mod source;

pub use provider::{ExchangeRateProvider, ProviderStatus, RateLookup};
pub use source::RateSource;
