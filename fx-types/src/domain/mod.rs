//! Domain models for the exchange rate service.

pub mod currency;
pub mod rate;
pub mod snapshot;

pub use currency::Currency;
pub use rate::ExchangeRate;
pub use snapshot::RateSnapshot;
