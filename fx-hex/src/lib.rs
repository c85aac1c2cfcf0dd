//! # FX Hex
//!
//! Application service layer and HTTP adapter for the exchange rate service.
//!
//! ## Architecture
//!
//! - `service/` - Application service (input parsing, error mapping, DTOs)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi/` - OpenAPI document served at `/api-docs/openapi.json`
//!
//! The service is generic over `P: ExchangeRateProvider`, allowing the
//! cached provider or an in-memory one to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use service::RateService;
