//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Currency, ExchangeRate};
use crate::ports::{ProviderStatus, RateLookup};

// ─────────────────────────────────────────────────────────────────────────────
// Rate DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Query string for the batch endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RatesQuery {
    /// Comma-separated currency codes
    #[param(example = "USD,EUR,JPY")]
    pub codes: Option<String>,
}

/// A single exchange rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRateResponse {
    #[schema(value_type = String, example = "USD")]
    pub currency: Currency,
    /// Currency the rate is expressed in
    #[schema(value_type = String, example = "CZK")]
    pub base: Currency,
    /// Units of `base` for one unit of `currency`
    #[schema(value_type = String, example = "23.15")]
    pub rate: Decimal,
    /// Quotation unit used by the upstream feed
    #[schema(example = 1)]
    pub amount: u32,
    /// Rate as published for `amount` units
    #[schema(value_type = String, example = "23.15")]
    pub quoted_rate: Decimal,
    pub as_of: DateTime<Utc>,
}

impl From<&ExchangeRate> for ExchangeRateResponse {
    fn from(rate: &ExchangeRate) -> Self {
        Self {
            currency: rate.currency(),
            base: rate.base(),
            rate: rate.rate(),
            amount: rate.amount(),
            quoted_rate: rate.quoted_rate(),
            as_of: rate.as_of(),
        }
    }
}

impl From<ExchangeRate> for ExchangeRateResponse {
    fn from(rate: ExchangeRate) -> Self {
        Self::from(&rate)
    }
}

/// Outcome of one element in a batch lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    Found,
    NotFound,
}

/// One element of a batch response, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchRateEntry {
    #[schema(value_type = String, example = "USD")]
    pub currency: Currency,
    pub status: LookupStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<ExchangeRateResponse>,
}

impl From<&RateLookup> for BatchRateEntry {
    fn from(lookup: &RateLookup) -> Self {
        match lookup {
            RateLookup::Found(rate) => Self {
                currency: rate.currency(),
                status: LookupStatus::Found,
                rate: Some(rate.into()),
            },
            RateLookup::NotFound(currency) => Self {
                currency: *currency,
                status: LookupStatus::NotFound,
                rate: None,
            },
        }
    }
}

/// Response for a batch lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchRatesResponse {
    pub rates: Vec<BatchRateEntry>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Health & Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Health and refresh status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" once rates are loaded, "unavailable" before
    #[schema(example = "healthy")]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_seconds: Option<u64>,
    pub currency_count: usize,
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

impl From<ProviderStatus> for HealthResponse {
    fn from(status: ProviderStatus) -> Self {
        Self {
            status: if status.is_ready() {
                "healthy".into()
            } else {
                "unavailable".into()
            },
            source: status.source,
            published_on: status.published_on,
            as_of: status.as_of,
            age_seconds: status.age.map(|age| age.as_secs()),
            currency_count: status.currency_count,
            stale: status.stale,
            last_success: status.last_success,
            last_error: status.last_error,
            consecutive_failures: status.consecutive_failures,
        }
    }
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Invalid currency code(s): US, EURO")]
    pub error: String,
    #[schema(example = 400)]
    pub code: u16,
    /// Every malformed input, for invalid code errors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_codes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_batch_entry_serialization() {
        let xyz = Currency::parse("XYZ").unwrap();
        let entry = BatchRateEntry::from(&RateLookup::NotFound(xyz));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({"currency": "XYZ", "status": "not_found"}));
    }

    #[test]
    fn test_rate_response_carries_quote() {
        let jpy = Currency::parse("JPY").unwrap();
        let rate =
            ExchangeRate::from_quote(jpy, Currency::CZK, 100, dec!(15.573), Utc::now()).unwrap();
        let response = ExchangeRateResponse::from(&rate);
        assert_eq!(response.amount, 100);
        assert_eq!(response.rate, dec!(0.15573));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["currency"], "JPY");
        assert_eq!(json["base"], "CZK");
        assert_eq!(json["rate"], "0.15573");
    }

    #[test]
    fn test_health_from_empty_status() {
        let health = HealthResponse::from(ProviderStatus::default());
        assert_eq!(health.status, "unavailable");
        assert_eq!(health.currency_count, 0);
    }
}
