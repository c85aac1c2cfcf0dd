//! Czech National Bank daily fixing client.
//!
//! The feed is a small pipe-delimited text table:
//!
//! ```text
//! 18 Oct 2024 #202
//! Country|Currency|Amount|Code|Rate
//! Australia|dollar|1|AUD|15.512
//! Japan|yen|100|JPY|15.573
//! ```
//!
//! Every rate is CZK for `Amount` units of `Code`. The Czech edition of the
//! feed uses `18.10.2024` dates and decimal commas; both editions parse.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use fx_types::{Currency, DomainError, ExchangeRate, FetchError, RateSnapshot, RateSource};

/// Source name recorded on snapshots.
pub const CNB_SOURCE: &str = "CNB";

const COLUMN_COUNT: usize = 5;

/// Largest feed body accepted. The daily fixing is a few kilobytes.
pub const MAX_FEED_BYTES: usize = 64 * 1024;

/// [`RateSource`] backed by the CNB daily fixing text feed.
pub struct CnbRateSource {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl CnbRateSource {
    /// Creates a client for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("exchange-rates/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_transport_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl RateSource for CnbRateSource {
    fn name(&self) -> &str {
        CNB_SOURCE
    }

    async fn fetch_snapshot(&self) -> Result<RateSnapshot, FetchError> {
        let mut response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if response
            .content_length()
            .is_some_and(|len| len > MAX_FEED_BYTES as u64)
        {
            return Err(oversized_body());
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_transport_error(e))?
        {
            if bytes.len() + chunk.len() > MAX_FEED_BYTES {
                return Err(oversized_body());
            }
            bytes.extend_from_slice(&chunk);
        }
        let body = String::from_utf8_lossy(&bytes);

        tracing::debug!(url = %self.url, bytes = body.len(), "Fetched CNB daily feed");
        parse_daily_feed(&body, Utc::now())
    }
}

fn oversized_body() -> FetchError {
    FetchError::Parse {
        line: 0,
        reason: format!("feed body exceeds {} bytes", MAX_FEED_BYTES),
    }
}

/// Parses a CNB daily feed body into a snapshot observed at `as_of`.
///
/// Any malformed line fails the whole parse.
pub fn parse_daily_feed(body: &str, as_of: DateTime<Utc>) -> Result<RateSnapshot, FetchError> {
    let mut lines = body
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (line_no, title) = lines.next().ok_or(FetchError::Empty)?;
    let published_on = parse_fixing_date(title).ok_or_else(|| FetchError::Parse {
        line: line_no,
        reason: format!("unrecognized fixing date in {:?}", title),
    })?;

    let (line_no, header) = lines.next().ok_or(FetchError::Empty)?;
    if header.split('|').count() != COLUMN_COUNT {
        return Err(FetchError::Parse {
            line: line_no,
            reason: format!("expected {} header columns in {:?}", COLUMN_COUNT, header),
        });
    }

    let mut seen = HashSet::new();
    let mut rates = Vec::new();
    for (line_no, row) in lines {
        let rate = parse_row(row, as_of).map_err(|reason| FetchError::Parse {
            line: line_no,
            reason,
        })?;
        if !seen.insert(rate.currency()) {
            return Err(FetchError::Parse {
                line: line_no,
                reason: format!("duplicate currency {}", rate.currency()),
            });
        }
        rates.push(rate);
    }

    if rates.is_empty() {
        return Err(FetchError::Empty);
    }

    RateSnapshot::new(Currency::CZK, CNB_SOURCE, Some(published_on), as_of, rates).map_err(|e| {
        match e {
            DomainError::EmptySnapshot => FetchError::Empty,
            other => FetchError::Parse {
                line: 0,
                reason: other.to_string(),
            },
        }
    })
}

/// Reads the date from a title line such as `18 Oct 2024 #202`.
fn parse_fixing_date(title: &str) -> Option<NaiveDate> {
    let date = title.split('#').next()?.trim();
    NaiveDate::parse_from_str(date, "%d %b %Y")
        .or_else(|_| NaiveDate::parse_from_str(date, "%d.%m.%Y"))
        .ok()
}

fn parse_row(row: &str, as_of: DateTime<Utc>) -> Result<ExchangeRate, String> {
    let columns: Vec<&str> = row.split('|').map(str::trim).collect();
    let [_country, _name, amount, code, rate] = columns.as_slice() else {
        return Err(format!(
            "expected {} columns, found {}",
            COLUMN_COUNT,
            columns.len()
        ));
    };

    let currency = Currency::parse(code).map_err(|e| e.to_string())?;
    let amount: u32 = amount
        .parse()
        .map_err(|_| format!("invalid amount {:?} for {}", amount, currency))?;
    let quoted: Decimal = rate
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("invalid rate {:?} for {}", rate, currency))?;

    ExchangeRate::from_quote(currency, Currency::CZK, amount, quoted, as_of).map_err(|e| e.to_string())
}
