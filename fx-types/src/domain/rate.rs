//! Exchange rate value object.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currency::Currency;
use crate::error::DomainError;

/// The latest known rate for one currency.
///
/// Direction is fixed across the service: `rate` is the number of units of
/// `base` paid for **one** unit of `currency`. A USD rate of 23.15 against a
/// CZK base means 1 USD = 23.15 CZK.
///
/// Feeds often quote per N units (100 JPY, 1000 IDR). The published figure is
/// kept in `quoted_rate` with its `amount`; `rate` is always per single unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawExchangeRate")]
pub struct ExchangeRate {
    currency: Currency,
    base: Currency,
    rate: Decimal,
    amount: u32,
    quoted_rate: Decimal,
    as_of: DateTime<Utc>,
}

/// Wire form of [`ExchangeRate`]. `rate` is derived, so it is not read back.
#[derive(Deserialize)]
struct RawExchangeRate {
    currency: Currency,
    base: Currency,
    amount: u32,
    quoted_rate: Decimal,
    as_of: DateTime<Utc>,
}

impl TryFrom<RawExchangeRate> for ExchangeRate {
    type Error = DomainError;

    fn try_from(raw: RawExchangeRate) -> Result<Self, Self::Error> {
        Self::from_quote(raw.currency, raw.base, raw.amount, raw.quoted_rate, raw.as_of)
    }
}

impl ExchangeRate {
    /// Builds a rate from the feed's quotation (`quoted_rate` per `amount` units).
    pub fn from_quote(
        currency: Currency,
        base: Currency,
        amount: u32,
        quoted_rate: Decimal,
        as_of: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if amount == 0 {
            return Err(DomainError::ZeroQuotationAmount(currency));
        }
        if quoted_rate <= Decimal::ZERO {
            return Err(DomainError::NonPositiveRate {
                currency,
                rate: quoted_rate,
            });
        }

        let rate = (quoted_rate / Decimal::from(amount)).normalize();

        Ok(Self {
            currency,
            base,
            rate,
            amount,
            quoted_rate,
            as_of,
        })
    }

    /// Builds a rate already expressed per single unit.
    pub fn new(
        currency: Currency,
        base: Currency,
        rate: Decimal,
        as_of: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Self::from_quote(currency, base, 1, rate, as_of)
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn base(&self) -> Currency {
        self.base
    }

    /// Units of `base` per one unit of `currency`.
    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// Quotation unit used by the feed.
    pub fn amount(&self) -> u32 {
        self.amount
    }

    /// Rate as published, for `amount` units.
    pub fn quoted_rate(&self) -> Decimal {
        self.quoted_rate
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd() -> Currency {
        Currency::parse("USD").unwrap()
    }

    #[test]
    fn test_rate_per_single_unit() {
        let rate = ExchangeRate::new(usd(), Currency::CZK, dec!(23.15), Utc::now()).unwrap();
        assert_eq!(rate.rate(), dec!(23.15));
        assert_eq!(rate.amount(), 1);
        assert_eq!(rate.quoted_rate(), dec!(23.15));
    }

    #[test]
    fn test_rate_normalized_from_multi_unit_quote() {
        let jpy = Currency::parse("JPY").unwrap();
        let rate =
            ExchangeRate::from_quote(jpy, Currency::CZK, 100, dec!(15.573), Utc::now()).unwrap();
        assert_eq!(rate.rate(), dec!(0.15573));
        assert_eq!(rate.amount(), 100);
        assert_eq!(rate.quoted_rate(), dec!(15.573));
    }

    #[test]
    fn test_non_positive_rate_rejected() {
        let zero = ExchangeRate::new(usd(), Currency::CZK, Decimal::ZERO, Utc::now());
        assert!(matches!(zero, Err(DomainError::NonPositiveRate { .. })));

        let negative = ExchangeRate::new(usd(), Currency::CZK, dec!(-1.5), Utc::now());
        assert!(matches!(negative, Err(DomainError::NonPositiveRate { .. })));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let result = ExchangeRate::from_quote(usd(), Currency::CZK, 0, dec!(1), Utc::now());
        assert!(matches!(result, Err(DomainError::ZeroQuotationAmount(_))));
    }

    #[test]
    fn test_deserialize_applies_quote_checks() {
        let json = |amount: u32, quoted: &str| {
            format!(
                r#"{{"currency":"JPY","base":"CZK","rate":"9","amount":{},"quoted_rate":"{}","as_of":"2024-10-18T12:00:00Z"}}"#,
                amount, quoted
            )
        };

        let rate: ExchangeRate = serde_json::from_str(&json(100, "15.573")).unwrap();
        assert_eq!(rate.rate(), dec!(0.15573));

        assert!(serde_json::from_str::<ExchangeRate>(&json(100, "0")).is_err());
        assert!(serde_json::from_str::<ExchangeRate>(&json(100, "-2.5")).is_err());
        assert!(serde_json::from_str::<ExchangeRate>(&json(0, "15.573")).is_err());
    }
}
