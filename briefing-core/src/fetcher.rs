//! Orchestration of geocoding and weather calls on top of a [`WeatherProvider`].

use tracing::{debug, info};

use crate::{
    error::FetchError,
    forecast::aggregate_daily,
    model::{CurrentConditions, ForecastResult, Location, WeatherReport},
    provider::WeatherProvider,
};

#[derive(Debug, Clone)]
pub struct ForecastFetcher<P> {
    provider: P,
}

impl<P: WeatherProvider> ForecastFetcher<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn resolve(&self, query: &str) -> Result<Location, FetchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(FetchError::NotFound(String::new()));
        }

        let location = self.provider.geocode(query).await?;
        debug!(
            query,
            lat = location.latitude,
            lon = location.longitude,
            "Resolved location"
        );
        Ok(location)
    }

    /// Geocode `query`, then fetch the raw forecast samples for it.
    ///
    /// The forecast call is only issued once geocoding succeeded. Samples are
    /// returned as received; see [`aggregate_daily`] for the daily view.
    pub async fn fetch(&self, query: &str) -> Result<ForecastResult, FetchError> {
        let location = self.resolve(query).await?;
        let samples = self.provider.forecast(&location).await?;

        info!(location = %location.display_name(), samples = samples.len(), "Fetched forecast");
        Ok(ForecastResult { location, samples })
    }

    /// Geocode `query`, then fetch current conditions.
    pub async fn current(&self, query: &str) -> Result<CurrentConditions, FetchError> {
        let location = self.resolve(query).await?;
        self.provider.current(&location).await
    }

    /// Current conditions and the daily outlook for `query`.
    ///
    /// The two weather calls run concurrently once the location is known;
    /// if either fails the whole report fails.
    pub async fn report(&self, query: &str) -> Result<WeatherReport, FetchError> {
        let location = self.resolve(query).await?;

        let (current, samples) = tokio::try_join!(
            self.provider.current(&location),
            self.provider.forecast(&location),
        )?;

        let days = aggregate_daily(&samples);
        info!(location = %location.display_name(), days = days.len(), "Built weather report");

        Ok(WeatherReport { location, current, days })
    }
}
