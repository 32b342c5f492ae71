// Rates module - USD to PKR exchange rate with file cache and manual override
//
// The calculators never fetch anything: callers resolve a quote here first
// and hand the number over through `require_rate`.

pub mod cache;
pub mod fetch;

use anyhow::Result;
use chrono::{DateTime, Duration, Local, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::{AppError, CalcError};
use cache::{CachedRate, RateCache};

/// Where a quote came from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Manual,
    Cache,
    Network,
    StaleCache,
    Unavailable,
}

impl RateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateSource::Manual => "manual override",
            RateSource::Cache => "cached today",
            RateSource::Network => "live",
            RateSource::StaleCache => "stale cache",
            RateSource::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved rate. `rate == None` tells the caller to ask for a manual value.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RateQuote {
    pub rate: Option<Decimal>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub source: RateSource,
    pub source_url: Option<String>,
}

impl RateQuote {
    pub fn manual(rate: Decimal) -> Self {
        Self {
            rate: Some(rate),
            fetched_at: None,
            source: RateSource::Manual,
            source_url: None,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            rate: None,
            fetched_at: None,
            source: RateSource::Unavailable,
            source_url: None,
        }
    }

    fn from_cached(cached: CachedRate, source: RateSource) -> Self {
        Self {
            rate: Some(cached.rate),
            fetched_at: Some(cached.fetched_at),
            source,
            source_url: Some(cached.source_url),
        }
    }

    /// Time since the rate was fetched; manual rates have no age
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.fetched_at.map(|at| now.signed_duration_since(at))
    }

    pub fn age_ms(&self, now: DateTime<Utc>) -> Option<i64> {
        self.age(now).map(|d| d.num_milliseconds())
    }
}

/// Anything that can produce a USD to PKR quote
#[allow(async_fn_in_trait)]
pub trait RateSupplier {
    async fn get_rate(&self) -> Result<RateQuote>;
}

/// Turn a quote into the number the calculators need, or fail fast
pub fn require_rate(quote: &RateQuote) -> Result<Decimal, CalcError> {
    match quote.rate {
        Some(rate) if rate > Decimal::ZERO => Ok(rate),
        _ => Err(CalcError::MissingRate),
    }
}

/// A fixed rate, e.g. from `--rate` or the settings file
#[derive(Debug, Clone, Copy)]
pub struct ManualRate(pub Decimal);

impl RateSupplier for ManualRate {
    async fn get_rate(&self) -> Result<RateQuote> {
        Ok(RateQuote::manual(self.0))
    }
}

/// Resolution chain: manual override, today's cached rate, live fetch,
/// then the last cached rate of any age.
pub struct CachedRateSupplier {
    cache: RateCache,
    manual: Option<Decimal>,
    offline: bool,
    endpoints: Vec<String>,
}

impl CachedRateSupplier {
    pub fn new(cache: RateCache, manual: Option<Decimal>) -> Self {
        Self {
            cache,
            manual,
            offline: is_offline(),
            endpoints: fetch::DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_default_cache(manual: Option<Decimal>) -> Result<Self> {
        Ok(Self::new(RateCache::new(cache::default_cache_dir()?), manual))
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Fetch a fresh rate regardless of the cache and store it
    pub async fn refresh(&self) -> Result<RateQuote> {
        if self.offline {
            return Err(AppError::Rate(
                "offline mode is enabled (NAFA_OFFLINE); cannot fetch a live rate".to_string(),
            )
            .into());
        }
        let fetched = fetch::fetch_usd_pkr(&self.endpoints).await?;
        let cached = CachedRate {
            rate: fetched.rate,
            fetched_at: Utc::now(),
            source_url: fetched.source_url,
        };
        self.cache.store(&cached)?;
        info!("Fetched & cached USD to PKR rate: {}", cached.rate);
        Ok(RateQuote::from_cached(cached, RateSource::Network))
    }
}

impl RateSupplier for CachedRateSupplier {
    async fn get_rate(&self) -> Result<RateQuote> {
        if let Some(rate) = self.manual {
            debug!("Using manual USD to PKR rate: {}", rate);
            return Ok(RateQuote::manual(rate));
        }

        let cached = match self.cache.load() {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring unreadable rate cache: {:#}", e);
                None
            }
        };

        if let Some(entry) = &cached {
            if entry.is_fresh(Local::now()) {
                debug!("Using cached USD to PKR rate: {}", entry.rate);
                return Ok(RateQuote::from_cached(entry.clone(), RateSource::Cache));
            }
        }

        if !self.offline {
            match self.refresh().await {
                Ok(quote) => return Ok(quote),
                Err(e) => warn!("Rate fetch failed: {:#}", e),
            }
        }

        match cached {
            Some(entry) => {
                warn!("Using last cached rate: {} ({})", entry.rate, entry.fetched_at);
                Ok(RateQuote::from_cached(entry, RateSource::StaleCache))
            }
            None => Ok(RateQuote::unavailable()),
        }
    }
}

/// `NAFA_OFFLINE=1` disables network access
pub fn is_offline() -> bool {
    std::env::var("NAFA_OFFLINE")
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn offline_supplier(dir: &TempDir, manual: Option<Decimal>) -> CachedRateSupplier {
        CachedRateSupplier::new(RateCache::new(dir.path().to_path_buf()), manual).offline(true)
    }

    #[test]
    fn test_require_rate_fails_fast() {
        assert_eq!(require_rate(&RateQuote::unavailable()), Err(CalcError::MissingRate));
        assert_eq!(require_rate(&RateQuote::manual(dec!(0))), Err(CalcError::MissingRate));
        assert_eq!(require_rate(&RateQuote::manual(dec!(285))), Ok(dec!(285)));
    }

    #[test]
    fn test_quote_age() {
        let now = Utc::now();
        let quote = RateQuote {
            rate: Some(dec!(280)),
            fetched_at: Some(now - Duration::minutes(5)),
            source: RateSource::Cache,
            source_url: None,
        };
        assert_eq!(quote.age_ms(now), Some(300_000));
        assert_eq!(RateQuote::manual(dec!(280)).age(now), None);
    }

    #[tokio::test]
    async fn test_manual_rate_wins() {
        let dir = TempDir::new().unwrap();
        let supplier = offline_supplier(&dir, Some(dec!(290)));
        let quote = supplier.get_rate().await.unwrap();
        assert_eq!(quote.rate, Some(dec!(290)));
        assert_eq!(quote.source, RateSource::Manual);

        let quote = ManualRate(dec!(281.5)).get_rate().await.unwrap();
        assert_eq!(quote.rate, Some(dec!(281.5)));
    }

    #[tokio::test]
    async fn test_fresh_cache_is_used() {
        let dir = TempDir::new().unwrap();
        let cache = RateCache::new(dir.path().to_path_buf());
        cache
            .store(&CachedRate {
                rate: dec!(278.4),
                fetched_at: Utc::now(),
                source_url: "https://open.er-api.com/v6/latest/USD".to_string(),
            })
            .unwrap();

        let quote = offline_supplier(&dir, None).get_rate().await.unwrap();
        assert_eq!(quote.rate, Some(dec!(278.4)));
        assert_eq!(quote.source, RateSource::Cache);
    }

    #[tokio::test]
    async fn test_stale_cache_is_the_last_resort() {
        let dir = TempDir::new().unwrap();
        let cache = RateCache::new(dir.path().to_path_buf());
        cache
            .store(&CachedRate {
                rate: dec!(282),
                fetched_at: Utc::now() - Duration::days(3),
                source_url: "https://open.er-api.com/v6/latest/USD".to_string(),
            })
            .unwrap();

        let quote = offline_supplier(&dir, None).get_rate().await.unwrap();
        assert_eq!(quote.rate, Some(dec!(282)));
        assert_eq!(quote.source, RateSource::StaleCache);
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_to_stale_cache() {
        let dir = TempDir::new().unwrap();
        let cache = RateCache::new(dir.path().to_path_buf());
        cache
            .store(&CachedRate {
                rate: dec!(280.1),
                fetched_at: Utc::now() - Duration::days(2),
                source_url: "https://open.er-api.com/v6/latest/USD".to_string(),
            })
            .unwrap();

        // Nothing listens on the discard port, so the fetch fails fast
        let supplier = CachedRateSupplier::new(cache, None)
            .offline(false)
            .with_endpoints(vec!["http://127.0.0.1:9/latest".to_string()]);
        let quote = supplier.get_rate().await.unwrap();
        assert_eq!(quote.rate, Some(dec!(280.1)));
        assert_eq!(quote.source, RateSource::StaleCache);
    }

    #[tokio::test]
    async fn test_nothing_available_yields_no_rate() {
        let dir = TempDir::new().unwrap();
        let quote = offline_supplier(&dir, None).get_rate().await.unwrap();
        assert_eq!(quote, RateQuote::unavailable());
        assert!(require_rate(&quote).is_err());
    }

    #[tokio::test]
    async fn test_refresh_refuses_offline() {
        let dir = TempDir::new().unwrap();
        assert!(offline_supplier(&dir, None).refresh().await.is_err());
    }
}
