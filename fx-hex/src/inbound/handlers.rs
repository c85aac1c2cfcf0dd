//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use fx_types::{AppError, ErrorResponse, ExchangeRateProvider, RatesQuery};

use crate::RateService;
use crate::openapi::ApiDoc;

/// Application state shared across handlers.
pub struct AppState<P: ExchangeRateProvider> {
    pub service: RateService<P>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::BadRequest(_) | AppError::InvalidCodes(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self.0 {
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::ServiceUnavailable(msg)
            | AppError::Internal(msg) => msg.clone(),
            other => other.to_string(),
        };

        let invalid_codes = match self.0 {
            AppError::InvalidCodes(codes) => codes,
            _ => Vec::new(),
        };

        let body = ErrorResponse {
            error: message,
            code: status.as_u16(),
            invalid_codes,
        };

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint. 503 until the first snapshot is loaded.
pub async fn health<P: ExchangeRateProvider>(
    State(state): State<Arc<AppState<P>>>,
) -> impl IntoResponse {
    let health = state.service.health();
    let status = if health.status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}

/// Get the latest rate for one currency code.
#[tracing::instrument(skip(state), fields(currency = %code))]
pub async fn get_rate<P: ExchangeRateProvider>(
    State(state): State<Arc<AppState<P>>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let rate = state.service.get_rate(&code).await?;
    Ok(Json(rate))
}

/// Get the latest rates for `?codes=USD,EUR,...`.
#[tracing::instrument(skip(state))]
pub async fn get_rates<P: ExchangeRateProvider>(
    State(state): State<Arc<AppState<P>>>,
    Query(query): Query<RatesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let codes = query
        .codes
        .ok_or_else(|| AppError::BadRequest("Missing 'codes' query parameter".into()))?;

    let rates = state.service.get_rates(&codes).await?;
    Ok(Json(rates))
}

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
