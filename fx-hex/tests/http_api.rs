//! HTTP-level tests for the exchange rate routes.
//!
//! Requests are driven through the router with `oneshot`, so no socket is bound.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use exchange_rates::{CachedRateProvider, InMemoryRateProvider, ProviderConfig, ScriptedRateSource};
use fx_hex::{RateService, inbound::HttpServer};
use fx_types::ExchangeRateProvider;
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use tower::ServiceExt;

/// Router over a provider holding USD, EUR and JPY.
fn loaded_app() -> Router {
    let provider = InMemoryRateProvider::with_rates(&[
        ("USD", dec!(23.15)),
        ("EUR", dec!(25.305)),
        ("JPY", dec!(0.15573)),
    ])
    .unwrap();
    app(provider)
}

fn app<P: ExchangeRateProvider>(provider: P) -> Router {
    HttpServer::new(RateService::new(provider)).router()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Sends a GET and returns status plus parsed JSON body.
async fn call(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(get(uri)).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_single_rate_is_case_insensitive() {
    let (status, json) = call(loaded_app(), "/api/exchange-rates/usd").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["currency"], "USD");
    assert_eq!(json["base"], "CZK");
    assert_eq!(json["rate"], "23.15");
}

#[tokio::test]
async fn test_unknown_currency_is_404() {
    let (status, json) = call(loaded_app(), "/api/exchange-rates/XYZ").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], 404);
    assert!(json["error"].as_str().unwrap().contains("XYZ"));
}

#[tokio::test]
async fn test_malformed_single_code_is_400() {
    let (status, json) = call(loaded_app(), "/api/exchange-rates/US1").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["invalid_codes"], serde_json::json!(["US1"]));
}

#[tokio::test]
async fn test_batch_preserves_order_and_marks_missing() {
    let (status, json) = call(loaded_app(), "/api/exchange-rates?codes=USD,%20eur%20,%20xYz").await;

    assert_eq!(status, StatusCode::OK);
    let rates = json["rates"].as_array().unwrap();
    assert_eq!(rates.len(), 3);
    assert_eq!(rates[0]["currency"], "USD");
    assert_eq!(rates[0]["status"], "found");
    assert_eq!(rates[1]["currency"], "EUR");
    assert_eq!(rates[1]["rate"]["rate"], "25.305");
    assert_eq!(rates[2]["currency"], "XYZ");
    assert_eq!(rates[2]["status"], "not_found");
    assert!(rates[2].get("rate").is_none());
}

#[tokio::test]
async fn test_batch_lists_every_invalid_code() {
    let (status, json) = call(loaded_app(), "/api/exchange-rates?codes=US,EUR,EURO").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["invalid_codes"], serde_json::json!(["US", "EURO"]));
    assert_eq!(json["error"], "Invalid currency code(s): US, EURO");
}

#[tokio::test]
async fn test_batch_requires_codes() {
    let (status, _) = call(loaded_app(), "/api/exchange-rates").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(loaded_app(), "/api/exchange-rates?codes=,,").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_provider_is_unavailable() {
    let app = app(InMemoryRateProvider::empty());

    let (status, json) = call(app.clone(), "/api/exchange-rates/USD").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], 503);

    let (status, _) = call(app.clone(), "/api/exchange-rates?codes=USD,EUR").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, json) = call(app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "unavailable");
}

#[tokio::test]
async fn test_health_reports_loaded_snapshot() {
    let (status, json) = call(loaded_app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["currency_count"], 3);
    assert_eq!(json["stale"], false);
}

#[tokio::test]
async fn test_cold_start_fetches_on_first_request() {
    let source = ScriptedRateSource::new().then_rates(&[("USD", dec!(23.15))]);
    let calls = source.calls();
    let app = app(CachedRateProvider::new(source, ProviderConfig::default()));

    let (status, json) = call(app.clone(), "/api/exchange-rates/USD").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rate"], "23.15");

    let (status, _) = call(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (status, json) = call(loaded_app(), "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/exchange-rates/{code}"].is_object());
}
