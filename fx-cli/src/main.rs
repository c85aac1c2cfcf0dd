//! FX CLI
//!
//! Command-line interface for the Exchange Rate API.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use exchange_rates::{CNB_DAILY_FEED_URL, CnbRateSource};
use fx_client::FxClient;
use fx_types::{ExchangeRateResponse, RateSource};

#[derive(Parser)]
#[command(name = "fx")]
#[command(author, version, about = "Exchange Rate API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Exchange Rate API
    #[arg(long, env = "FX_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health and refresh status
    Health,
    /// Latest rate for one currency
    Rate {
        /// ISO 4217 code, e.g. USD
        code: String,
    },
    /// Latest rates for several currencies
    Rates {
        /// Comma-separated codes, e.g. USD,EUR,JPY
        #[arg(value_delimiter = ',', required = true)]
        codes: Vec<String>,
    },
    /// Fetch and parse the CNB feed directly, bypassing the API
    Feed {
        /// Feed URL
        #[arg(long, env = "CNB_FEED_URL", default_value = CNB_DAILY_FEED_URL)]
        url: String,
        /// Fetch timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = FxClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let health = client.health().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
            if health.status != "healthy" {
                eprintln!("✗ API has no exchange rates loaded");
                std::process::exit(1);
            }
        }

        Commands::Rate { code } => {
            let rate = client.get_rate(&code).await?;
            println!("{}", serde_json::to_string_pretty(&rate)?);
        }

        Commands::Rates { codes } => {
            let rates = client.get_rates(codes.as_slice()).await?;
            println!("{}", serde_json::to_string_pretty(&rates)?);
        }

        Commands::Feed { url, timeout } => {
            let source = CnbRateSource::new(url, Duration::from_secs(timeout))?;
            let snapshot = source.fetch_snapshot().await?;

            if let Some(date) = snapshot.published_on() {
                println!("# {} fixing of {}", source.name(), date);
            }
            for rate in snapshot.rates() {
                let rate = ExchangeRateResponse::from(rate);
                println!(
                    "{}\t{}\t{} {} per {}",
                    rate.currency, rate.rate, rate.quoted_rate, rate.base, rate.amount
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_splits_on_commas() {
        let cli = Cli::try_parse_from(["fx", "rates", "USD,EUR", "JPY"]).unwrap();
        match cli.command {
            Commands::Rates { codes } => assert_eq!(codes, vec!["USD", "EUR", "JPY"]),
            _ => panic!("expected rates command"),
        }
    }

    #[test]
    fn test_rates_requires_codes() {
        assert!(Cli::try_parse_from(["fx", "rates"]).is_err());
    }

    #[test]
    fn test_api_url_flag() {
        let cli = Cli::try_parse_from(["fx", "--api-url", "http://fx:8080", "health"]).unwrap();
        assert_eq!(cli.api_url, "http://fx:8080");
    }
}
