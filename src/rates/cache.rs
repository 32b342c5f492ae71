use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CACHE_FILENAME: &str = "usd_pkr.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedRate {
    pub rate: Decimal,
    pub fetched_at: DateTime<Utc>,
    pub source_url: String,
}

impl CachedRate {
    /// Fresh means fetched on the same local calendar day
    pub fn is_fresh(&self, now: DateTime<Local>) -> bool {
        self.fetched_at.with_timezone(&Local).date_naive() == now.date_naive()
    }
}

pub fn default_cache_dir() -> Result<PathBuf> {
    let cache_dir = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::cache_home)
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?;
    Ok(cache_dir.join("nafa").join("rates"))
}

/// Single-entry JSON cache of the last fetched rate
#[derive(Debug, Clone)]
pub struct RateCache {
    dir: PathBuf,
}

impl RateCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CACHE_FILENAME)
    }

    pub fn load(&self) -> Result<Option<CachedRate>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).context("Failed to read rate cache")?;
        let cached = serde_json::from_str(&content).context("Failed to parse rate cache")?;
        Ok(Some(cached))
    }

    pub fn store(&self, cached: &CachedRate) -> Result<()> {
        fs::create_dir_all(&self.dir).context("Failed to create rate cache directory")?;
        let path = self.path();
        let tmp_path = self.dir.join(format!("{}.tmp", CACHE_FILENAME));
        fs::write(&tmp_path, serde_json::to_vec_pretty(cached)?)
            .context("Failed to write rate cache")?;
        fs::rename(&tmp_path, &path).context("Failed to finalize rate cache file")?;
        Ok(())
    }

    /// Returns true if a cache file was removed
    pub fn clear(&self) -> Result<bool> {
        let path = self.path();
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).context("Failed to remove rate cache")?;
        Ok(true)
    }
}
