//! OpenAPI document for the exchange rate routes.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use fx_types::dto::{
    BatchRateEntry, BatchRatesResponse, ErrorResponse, ExchangeRateResponse, HealthResponse,
    LookupStatus, RatesQuery,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health and refresh status
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Rates are loaded", body = HealthResponse),
        (status = 503, description = "No snapshot has been loaded yet", body = HealthResponse)
    )
)]
async fn health() {}

/// Latest rate for one currency
#[utoipa::path(
    get,
    path = "/api/exchange-rates/{code}",
    tag = "rates",
    params(
        ("code" = String, Path, description = "ISO 4217 currency code, case-insensitive", example = "USD")
    ),
    responses(
        (status = 200, description = "CZK per one unit of the currency", body = ExchangeRateResponse),
        (status = 400, description = "Malformed currency code", body = ErrorResponse),
        (status = 404, description = "Currency not quoted in the current snapshot", body = ErrorResponse),
        (status = 503, description = "No snapshot has been loaded yet", body = ErrorResponse)
    )
)]
async fn get_rate() {}

/// Latest rates for several currencies
#[utoipa::path(
    get,
    path = "/api/exchange-rates",
    tag = "rates",
    params(RatesQuery),
    responses(
        (status = 200, description = "One entry per requested code, in request order", body = BatchRatesResponse),
        (status = 400, description = "Missing list or malformed codes; lists every malformed code", body = ErrorResponse),
        (status = 503, description = "No snapshot has been loaded yet", body = ErrorResponse)
    )
)]
async fn get_rates() {}

/// OpenAPI documentation for the Exchange Rate API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Exchange Rate Service API",
        version = "1.0.0",
        description = "Daily Czech National Bank fixing rates served from an in-memory cache.\n\nEvery rate is expressed as CZK per one unit of the requested currency.",
        license(name = "MIT"),
    ),
    paths(health, get_rate, get_rates),
    components(
        schemas(
            ExchangeRateResponse,
            BatchRatesResponse,
            BatchRateEntry,
            LookupStatus,
            HealthResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Readiness and refresh status"),
        (name = "rates", description = "Exchange rate lookups"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_rate_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/api/exchange-rates/{code}"));
        assert!(paths.iter().any(|p| *p == "/api/exchange-rates"));
        assert!(paths.iter().any(|p| *p == "/health"));
    }
}
