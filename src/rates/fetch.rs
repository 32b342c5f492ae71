use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Public USD-based rate feeds, tried in order. Each returns `rates.PKR`.
pub const DEFAULT_ENDPOINTS: [&str; 3] = [
    "https://api.exchangerate.host/latest?base=USD&symbols=PKR",
    "https://open.er-api.com/v6/latest/USD",
    "https://api.exchangerate-api.com/v4/latest/USD",
];

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedRate {
    pub rate: Decimal,
    pub source_url: String,
}

/// Try every endpoint until one yields a positive PKR rate
pub async fn fetch_usd_pkr(endpoints: &[String]) -> Result<FetchedRate> {
    let client = Client::builder()
        .user_agent("Mozilla/5.0 (compatible; NafaBot/1.0)")
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;

    let mut last_error = None;
    for url in endpoints {
        match fetch_from(&client, url).await {
            Ok(rate) => {
                info!("USD to PKR rate {} from {}", rate, url);
                return Ok(FetchedRate {
                    rate,
                    source_url: url.clone(),
                });
            }
            Err(e) => {
                warn!("Rate endpoint {} failed: {:#}", url, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("No rate endpoints configured")))
}

async fn fetch_from(client: &Client, url: &str) -> Result<Decimal> {
    debug!("Fetching {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .context("Failed to send request to rate API")?;

    if !response.status().is_success() {
        return Err(anyhow!("Rate API returned error status: {}", response.status()));
    }

    let body: Value = response
        .json()
        .await
        .context("Failed to parse rate API response")?;

    parse_pkr_rate(&body)
}

/// Extract `rates.PKR` from a feed response.
///
/// The number is parsed from its JSON text so no precision is lost to f64.
pub fn parse_pkr_rate(body: &Value) -> Result<Decimal> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(anyhow!("Rate API reported failure"));
    }

    let raw = body
        .get("rates")
        .and_then(|rates| rates.get("PKR"))
        .ok_or_else(|| anyhow!("Rate API response has no rates.PKR"))?;

    let rate = match raw {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .context("Invalid PKR rate")?,
        Value::String(s) => Decimal::from_str(s.trim()).context("Invalid PKR rate")?,
        other => return Err(anyhow!("Unexpected PKR rate value: {}", other)),
    };

    if rate <= Decimal::ZERO {
        return Err(anyhow!("Rate API returned a non-positive PKR rate: {}", rate));
    }
    Ok(rate)
}
