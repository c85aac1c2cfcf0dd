//! Exchange Rate Application Service
//!
//! Turns raw request input into provider calls and provider results into DTOs.
//! Contains NO caching or upstream logic - that lives behind the provider port.

use fx_types::{
    AppError, BatchRateEntry, BatchRatesResponse, ExchangeRateProvider, ExchangeRateResponse,
    HealthResponse,
};

/// Splits a comma-delimited code list, dropping blank segments.
///
/// Segments are passed on untrimmed; validation normalizes whitespace.
pub fn split_codes(input: &str) -> Vec<String> {
    input
        .split(',')
        .filter(|segment| !segment.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Application service for rate lookups.
///
/// Generic over `P: ExchangeRateProvider` - the provider is injected at compile time.
pub struct RateService<P: ExchangeRateProvider> {
    provider: P,
}

impl<P: ExchangeRateProvider> RateService<P> {
    /// Creates a new rate service with the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Returns a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Latest rate for one code.
    pub async fn get_rate(&self, code: &str) -> Result<ExchangeRateResponse, AppError> {
        let rate = self.provider.get_exchange_rate(code).await?;
        Ok(rate.into())
    }

    /// Latest rates for a comma-delimited code list, in request order.
    pub async fn get_rates(&self, codes: &str) -> Result<BatchRatesResponse, AppError> {
        let codes = split_codes(codes);
        if codes.is_empty() {
            return Err(AppError::BadRequest(
                "At least one currency code is required".into(),
            ));
        }

        let lookups = self.provider.get_exchange_rates(&codes).await?;
        Ok(BatchRatesResponse {
            rates: lookups.iter().map(BatchRateEntry::from).collect(),
        })
    }

    /// Readiness and refresh status.
    pub fn health(&self) -> HealthResponse {
        self.provider.status().into()
    }
}
