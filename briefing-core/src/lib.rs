//! Core library for the `briefing` news and weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client (geocoding, current conditions, 5-day forecast)
//! - Daily aggregation of the 3-hourly forecast feed
//! - A single-slot cache for the last weather reading
//! - A top-headlines news client
//!
//! It is used by `briefing-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod forecast;
pub mod model;
pub mod news;
pub mod provider;

pub use cache::{CachedCurrent, CachedWeather, FileCache, MemoryCache, WeatherCache};
pub use config::{Config, ProviderConfig};
pub use error::FetchError;
pub use fetcher::ForecastFetcher;
pub use forecast::{MAX_FORECAST_DAYS, aggregate_daily};
pub use model::{
    Condition, CurrentConditions, DaySummary, ForecastResult, Location, WeatherReport,
    WeatherSample,
};
pub use news::{Article, Category, FeaturedArticle, HeadlinesPage, HeadlinesQuery, NewsClient};
pub use provider::{ProviderId, WeatherProvider, openweather::OpenWeatherProvider};
