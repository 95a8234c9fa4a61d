use crate::{
    Config,
    error::FetchError,
    model::{CurrentConditions, Location, WeatherSample},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::{convert::TryFrom, fmt::Debug};
use tracing::debug;

pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    NewsApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::NewsApi => "newsapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::NewsApi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "newsapi" => Ok(ProviderId::NewsApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, newsapi."
            )),
        }
    }
}

/// Remote source of geocoding, current conditions and forecast samples.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Resolve free text to the best matching place.
    async fn geocode(&self, query: &str) -> Result<Location, FetchError>;

    async fn current(&self, location: &Location) -> Result<CurrentConditions, FetchError>;

    /// Raw 3-hourly samples, in the order the provider sent them.
    async fn forecast(&self, location: &Location) -> Result<Vec<WeatherSample>, FetchError>;
}

/// Construct the weather provider from config.
pub fn weather_provider_from_config(config: &Config) -> Result<OpenWeatherProvider, FetchError> {
    let id = ProviderId::OpenWeather;
    let api_key = config.provider_api_key(id).ok_or_else(|| {
        FetchError::Config(format!(
            "No API key configured for provider '{id}'.\n\
             Hint: run `briefing configure {id}` or set OPENWEATHER_API_KEY."
        ))
    })?;

    OpenWeatherProvider::new(api_key)
}

pub(crate) fn require_api_key(id: ProviderId, api_key: String) -> Result<String, FetchError> {
    if api_key.trim().is_empty() {
        return Err(FetchError::Config(format!("API key for '{id}' is empty")));
    }
    Ok(api_key)
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Read a response body, mapping non-success statuses onto [`FetchError`].
///
/// The status decides the error kind; the body only supplies the message.
pub(crate) async fn read_body(res: Response) -> Result<String, FetchError> {
    let status = res.status();

    if status.is_success() {
        return Ok(res.text().await?);
    }

    let body = match res.text().await {
        Ok(body) => Some(body),
        Err(e) => {
            debug!(%status, error = %e, "Failed to read error response body");
            None
        }
    };

    Err(status_error(status, body.as_deref()))
}

fn status_error(status: StatusCode, body: Option<&str>) -> FetchError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return FetchError::RateLimited;
    }

    FetchError::Upstream {
        status: status.as_u16(),
        message: error_message(body.unwrap_or_default(), status),
    }
}

fn error_message(body: &str, status: StatusCode) -> String {
    let from_json = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty());

    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        }
        None => truncate_body(body),
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_is_case_insensitive() {
        assert_eq!(ProviderId::try_from("OpenWeather").unwrap(), ProviderId::OpenWeather);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = weather_provider_from_config(&cfg).unwrap_err();
        assert!(matches!(err, FetchError::Config(_)));
        assert!(err.to_string().contains("No API key configured for provider"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "KEY".to_string());

        assert!(weather_provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn error_message_prefers_provider_json() {
        let msg = error_message(r#"{"cod":401,"message":"Invalid API key"}"#, StatusCode::UNAUTHORIZED);
        assert_eq!(msg, "Invalid API key");
    }

    #[test]
    fn error_message_falls_back_to_reason_or_body() {
        assert_eq!(error_message("", StatusCode::BAD_GATEWAY), "Bad Gateway");
        assert_eq!(error_message("oops", StatusCode::BAD_GATEWAY), "oops");
    }

    #[test]
    fn rate_limit_does_not_depend_on_body() {
        assert!(matches!(status_error(StatusCode::TOO_MANY_REQUESTS, None), FetchError::RateLimited));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, Some("{not json")),
            FetchError::RateLimited
        ));
    }

    #[test]
    fn unreadable_error_body_keeps_status() {
        match status_error(StatusCode::SERVICE_UNAVAILABLE, None) {
            FetchError::Upstream { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn truncate_body_limits_length() {
        let long = "x".repeat(500);
        let out = truncate_body(&long);
        assert_eq!(out.len(), 203);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }
}
