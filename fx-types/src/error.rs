//! Error types for the exchange rate service.

use std::time::Duration;

use rust_decimal::Decimal;

use crate::domain::Currency;

/// Domain-level errors (invariant violations in value objects).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    #[error("Rate for {currency} must be positive, got {rate}")]
    NonPositiveRate { currency: Currency, rate: Decimal },

    #[error("Quotation amount for {0} must be positive")]
    ZeroQuotationAmount(Currency),

    #[error("Duplicate currency in snapshot: {0}")]
    DuplicateCurrency(Currency),

    #[error("Rate quoted against {got}, snapshot base is {expected}")]
    BaseMismatch { expected: Currency, got: Currency },

    #[error("Snapshot contains no rates")]
    EmptySnapshot,
}

/// Upstream feed failures.
///
/// These are absorbed by the refresh scheduler and never reach lookup callers.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    #[error("Malformed feed at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Feed contained no rates")]
    Empty,
}

/// Caller-facing lookup failures.
///
/// Every failed lookup is exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    /// One or more inputs are not well-formed three-letter codes.
    #[error("Invalid currency code(s): {}", .0.join(", "))]
    InvalidCode(Vec<String>),

    /// Well-formed code that the latest snapshot does not quote.
    #[error("No exchange rate for {0}")]
    NotFound(Currency),

    /// No snapshot has ever been installed.
    #[error("Exchange rates are not available yet")]
    Unavailable,
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid currency code(s): {}", .0.join(", "))]
    InvalidCodes(Vec<String>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        match err {
            RateError::InvalidCode(codes) => AppError::InvalidCodes(codes),
            RateError::NotFound(currency) => {
                AppError::NotFound(format!("No exchange rate for {}", currency))
            }
            RateError::Unavailable => {
                AppError::ServiceUnavailable("Exchange rates are not available yet".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_code_lists_every_input() {
        let err = RateError::InvalidCode(vec!["US".into(), "EURO".into()]);
        assert_eq!(err.to_string(), "Invalid currency code(s): US, EURO");
    }

    #[test]
    fn test_rate_error_maps_to_app_error() {
        let usd = Currency::parse("USD").unwrap();
        assert!(matches!(
            AppError::from(RateError::NotFound(usd)),
            AppError::NotFound(msg) if msg.contains("USD")
        ));
        assert!(matches!(
            AppError::from(RateError::Unavailable),
            AppError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            AppError::from(RateError::InvalidCode(vec!["US".into()])),
            AppError::InvalidCodes(codes) if codes == vec!["US".to_string()]
        ));
    }
}
