//! RateService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use exchange_rates::InMemoryRateProvider;
    use fx_types::{
        AppError, ExchangeRate, ExchangeRateProvider, LookupStatus, ProviderStatus, RateError,
        RateLookup,
    };
    use rust_decimal_macros::dec;

    use crate::RateService;
    use crate::service::split_codes;

    /// Provider that records batch inputs and delegates to an in-memory one.
    pub struct RecordingProvider {
        inner: InMemoryRateProvider,
        batches: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl ExchangeRateProvider for RecordingProvider {
        async fn get_exchange_rate(&self, code: &str) -> Result<ExchangeRate, RateError> {
            self.inner.get_exchange_rate(code).await
        }

        async fn get_exchange_rates(
            &self,
            codes: &[String],
        ) -> Result<Vec<RateLookup>, RateError> {
            self.batches.lock().unwrap().push(codes.to_vec());
            self.inner.get_exchange_rates(codes).await
        }

        fn status(&self) -> ProviderStatus {
            self.inner.status()
        }
    }

    fn service() -> RateService<InMemoryRateProvider> {
        RateService::new(
            InMemoryRateProvider::with_rates(&[("USD", dec!(23.15)), ("EUR", dec!(25.305))])
                .unwrap(),
        )
    }

    #[test]
    fn test_split_codes_drops_blank_segments() {
        assert_eq!(
            split_codes("USD, eur , xYz"),
            vec!["USD", " eur ", " xYz"]
        );
        assert_eq!(split_codes("USD,,EUR,"), vec!["USD", "EUR"]);
        assert!(split_codes(" , ").is_empty());
        assert_eq!(split_codes("USD,USD"), vec!["USD", "USD"]);
    }

    #[tokio::test]
    async fn test_get_rate_lowercase() {
        let rate = service().get_rate("usd").await.unwrap();
        assert_eq!(rate.currency.code(), "USD");
        assert_eq!(rate.rate, dec!(23.15));
    }

    #[tokio::test]
    async fn test_get_rate_error_mapping() {
        let service = service();
        assert!(matches!(
            service.get_rate("US").await,
            Err(AppError::InvalidCodes(codes)) if codes == vec!["US".to_string()]
        ));
        assert!(matches!(
            service.get_rate("XYZ").await,
            Err(AppError::NotFound(_))
        ));

        let empty = RateService::new(InMemoryRateProvider::empty());
        assert!(matches!(
            empty.get_rate("USD").await,
            Err(AppError::ServiceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_get_rates_per_element_results() {
        let response = service().get_rates("USD, eur , xYz").await.unwrap();

        let statuses: Vec<(&str, LookupStatus)> = response
            .rates
            .iter()
            .map(|entry| (entry.currency.code(), entry.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("USD", LookupStatus::Found),
                ("EUR", LookupStatus::Found),
                ("XYZ", LookupStatus::NotFound),
            ]
        );
        assert_eq!(response.rates[1].rate.as_ref().unwrap().rate, dec!(25.305));
        assert!(response.rates[2].rate.is_none());
    }

    #[tokio::test]
    async fn test_get_rates_reports_all_invalid_codes() {
        let result = service().get_rates("US,EURO").await;
        assert!(matches!(
            result,
            Err(AppError::InvalidCodes(codes)) if codes == vec!["US".to_string(), "EURO".to_string()]
        ));
    }

    #[tokio::test]
    async fn test_get_rates_requires_codes() {
        assert!(matches!(
            service().get_rates(" , ").await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_get_rates_passes_segments_in_order() {
        let service = RateService::new(RecordingProvider {
            inner: InMemoryRateProvider::with_rates(&[("USD", dec!(23.15))]).unwrap(),
            batches: Mutex::new(Vec::new()),
        });

        service.get_rates("usd, USD ,gbp").await.unwrap();

        let batches = service.provider().batches.lock().unwrap();
        assert_eq!(batches.as_slice(), &[vec!["usd".to_string(), " USD ".into(), "gbp".into()]]);
    }

    #[test]
    fn test_health_reports_readiness() {
        assert_eq!(service().health().status, "healthy");
        assert_eq!(
            RateService::new(InMemoryRateProvider::empty()).health().status,
            "unavailable"
        );
    }
}
