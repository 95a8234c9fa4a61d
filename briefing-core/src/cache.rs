//! Single-slot cache for the last successful current-conditions reading.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, info, warn};

use crate::{
    error::FetchError, fetcher::ForecastFetcher, model::CurrentConditions,
    provider::WeatherProvider,
};

pub const DEFAULT_TTL_MINUTES: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedWeather {
    /// The city text the reading was requested for.
    pub query: String,
    pub current: CurrentConditions,
    pub stored_at: DateTime<Utc>,
}

impl CachedWeather {
    pub fn new(query: impl Into<String>, current: CurrentConditions, stored_at: DateTime<Utc>) -> Self {
        Self { query: query.into(), current, stored_at }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.stored_at
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }

    pub fn matches(&self, query: &str) -> bool {
        self.query.trim().eq_ignore_ascii_case(query.trim())
    }
}

/// Storage for one cached reading.
pub trait WeatherCache: Send + Sync {
    fn get(&self) -> Result<Option<CachedWeather>>;
    fn set(&self, entry: &CachedWeather) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    slot: Mutex<Option<CachedWeather>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WeatherCache for MemoryCache {
    fn get(&self) -> Result<Option<CachedWeather>> {
        let slot = self.slot.lock().map_err(|_| anyhow!("Weather cache lock poisoned"))?;
        Ok(slot.clone())
    }

    fn set(&self, entry: &CachedWeather) -> Result<()> {
        let mut slot = self.slot.lock().map_err(|_| anyhow!("Weather cache lock poisoned"))?;
        *slot = Some(entry.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self.slot.lock().map_err(|_| anyhow!("Weather cache lock poisoned"))?;
        *slot = None;
        Ok(())
    }
}

/// JSON file holding the cached reading.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `last_weather.json` in the platform cache directory.
    pub fn default_location() -> Result<Self> {
        let dirs = crate::Config::project_dirs()?;
        Ok(Self::new(dirs.cache_dir().join("last_weather.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WeatherCache for FileCache {
    fn get(&self) -> Result<Option<CachedWeather>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read weather cache: {}", self.path.display()))?;

        match serde_json::from_str(&contents) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable weather cache");
                Ok(None)
            }
        }
    }

    fn set(&self, entry: &CachedWeather) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string(entry).context("Failed to serialize weather cache")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write weather cache: {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove weather cache: {}", self.path.display())),
        }
    }
}

/// Current conditions served from the cache while the stored reading is fresh.
#[derive(Debug)]
pub struct CachedCurrent<'a, C, P> {
    cache: &'a C,
    fetcher: &'a ForecastFetcher<P>,
    ttl: Duration,
}

impl<'a, C: WeatherCache, P: WeatherProvider> CachedCurrent<'a, C, P> {
    pub fn new(cache: &'a C, fetcher: &'a ForecastFetcher<P>) -> Self {
        Self { cache, fetcher, ttl: Duration::minutes(DEFAULT_TTL_MINUTES) }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Cached reading for `query` if one is fresh at `now`, otherwise a new fetch.
    pub async fn current(
        &self,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<CurrentConditions, FetchError> {
        match self.cache.get() {
            Ok(Some(entry)) if entry.matches(query) && entry.is_fresh(now, self.ttl) => {
                info!(query, age_secs = entry.age(now).num_seconds(), "Using cached weather");
                return Ok(entry.current);
            }
            Ok(_) => debug!(query, "No fresh cached weather"),
            Err(e) => warn!(error = %e, "Failed to load cached weather"),
        }

        self.refresh(query, now).await
    }

    /// Fetch a new reading and store it, ignoring whatever is cached.
    pub async fn refresh(
        &self,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<CurrentConditions, FetchError> {
        let current = self.fetcher.current(query).await?;

        let entry = CachedWeather::new(query.trim(), current.clone(), now);
        if let Err(e) = self.cache.set(&entry) {
            warn!(error = %e, "Failed to cache weather data");
        }

        Ok(current)
    }
}
