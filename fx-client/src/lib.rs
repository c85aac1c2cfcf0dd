//! # FX Client SDK
//!
//! A typed Rust client for the Exchange Rate API.

use fx_types::{BatchRatesResponse, ErrorResponse, ExchangeRateResponse, HealthResponse};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        message: String,
        /// Malformed codes reported by the server, if any.
        invalid_codes: Vec<String>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

/// Exchange Rate API client.
pub struct FxClient {
    base_url: String,
    http: Client,
}

impl FxClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Fetches service health.
    ///
    /// A 503 still carries a health body, so it is returned rather than
    /// treated as an error.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        if resp.status() == StatusCode::SERVICE_UNAVAILABLE {
            let body = resp.text().await?;
            return Ok(serde_json::from_str(&body)?);
        }
        handle_response(resp).await
    }

    /// Latest rate for one currency, in CZK per unit.
    pub async fn get_rate(&self, code: &str) -> Result<ExchangeRateResponse, ClientError> {
        let mut url = self.url()?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["api", "exchange-rates", code.trim()]);

        let resp = self.http.get(url).send().await?;
        handle_response(resp).await
    }

    /// Latest rates for several currencies, in request order.
    pub async fn get_rates<S: AsRef<str>>(
        &self,
        codes: &[S],
    ) -> Result<BatchRatesResponse, ClientError> {
        let joined = codes
            .iter()
            .map(|code| code.as_ref().trim())
            .collect::<Vec<_>>()
            .join(",");

        let resp = self
            .http
            .get(format!("{}/api/exchange-rates", self.base_url))
            .query(&[("codes", joined)])
            .send()
            .await?;
        handle_response(resp).await
    }

    fn url(&self) -> Result<Url, ClientError> {
        Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }
}

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    } else {
        let body = resp.text().await.unwrap_or_default();
        let (message, invalid_codes) = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => (err.error, err.invalid_codes),
            Err(_) => (body, Vec::new()),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
            invalid_codes,
        })
    }
}
