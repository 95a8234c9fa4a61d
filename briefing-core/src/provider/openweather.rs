use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::FetchError,
    model::{Condition, CurrentConditions, Location, WeatherSample},
    provider::{ProviderId, read_body, require_api_key, truncate_body},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    /// Fails with [`FetchError::Config`] when the key is blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self, FetchError> {
        Ok(Self {
            api_key: require_api_key(ProviderId::OpenWeather, api_key.into())?,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        })
    }

    /// Send requests to another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_body(&self, path: &str, params: &[(&str, String)]) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "OpenWeather request");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        read_body(res).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let body = self.get_body(path, params).await?;
        parse_json(path, &body)
    }

    fn coord_params(location: &Location) -> Vec<(&'static str, String)> {
        vec![
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
            ("units", "metric".to_string()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    #[serde(default)]
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    pressure: u32,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

/// Just the status fields; an error body carries nothing else.
#[derive(Debug, Deserialize)]
struct OwStatus {
    cod: Option<serde_json::Value>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
    visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

/// Condition, description and icon of the first weather entry, if any.
fn primary_weather(weather: &[OwWeather]) -> (Condition, String, String) {
    match weather.first() {
        Some(w) => (Condition::from_label(&w.main), w.description.clone(), w.icon.clone()),
        None => (Condition::Unknown, String::new(), String::new()),
    }
}

fn parse_json<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| {
        FetchError::InvalidResponse(format!(
            "Failed to parse OpenWeather JSON from {path}: {e} (body: {})",
            truncate_body(body)
        ))
    })
}

/// The current-weather endpoint reports some failures as a 200 with a `cod` field.
fn check_cod(cod: Option<&serde_json::Value>, message: Option<&str>) -> Result<(), FetchError> {
    let code = match cod {
        None => return Ok(()),
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    };

    match code.and_then(|c| u16::try_from(c).ok()) {
        Some(200) => Ok(()),
        Some(status) => Err(FetchError::Upstream {
            status,
            message: message.unwrap_or("Failed to fetch weather data").to_string(),
        }),
        None => Err(FetchError::InvalidResponse(format!(
            "Unrecognised OpenWeather status code: {}",
            cod.map(ToString::to_string).unwrap_or_default()
        ))),
    }
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, FetchError> {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .ok_or_else(|| FetchError::InvalidResponse(format!("Timestamp out of range: {ts}")))
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn geocode(&self, query: &str) -> Result<Location, FetchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(FetchError::NotFound(String::new()));
        }

        let entries: Vec<OwGeoEntry> = self
            .get_json(
                "/geo/1.0/direct",
                &[("q", query.to_string()), ("limit", "1".to_string())],
            )
            .await?;

        let entry = entries
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::NotFound(query.to_string()))?;

        Ok(Location {
            latitude: entry.lat,
            longitude: entry.lon,
            name: if entry.name.is_empty() { query.to_string() } else { entry.name },
            country: entry.country,
        })
    }

    async fn current(&self, location: &Location) -> Result<CurrentConditions, FetchError> {
        let path = "/data/2.5/weather";
        let body = self.get_body(path, &Self::coord_params(location)).await?;

        let status: OwStatus = parse_json(path, &body)?;
        check_cod(status.cod.as_ref(), status.message.as_deref())?;

        let parsed: OwCurrentResponse = parse_json(path, &body)?;

        let (condition, description, icon) = primary_weather(&parsed.weather);

        Ok(CurrentConditions {
            location_name: if parsed.name.is_empty() { location.name.clone() } else { parsed.name },
            country: if parsed.sys.country.is_empty() {
                location.country.clone()
            } else {
                parsed.sys.country
            },
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            wind_speed_mps: parsed.wind.speed,
            visibility_m: parsed.visibility,
            condition,
            description,
            icon,
            observed_at: unix_to_utc(parsed.dt)?,
        })
    }

    async fn forecast(&self, location: &Location) -> Result<Vec<WeatherSample>, FetchError> {
        let parsed: OwForecastResponse =
            self.get_json("/data/2.5/forecast", &Self::coord_params(location)).await?;

        debug!(samples = parsed.list.len(), "OpenWeather forecast received");

        parsed
            .list
            .into_iter()
            .map(|entry| {
                let (condition, description, icon) = primary_weather(&entry.weather);
                Ok(WeatherSample {
                    timestamp: unix_to_utc(entry.dt)?,
                    temperature_c: entry.main.temp,
                    condition,
                    description,
                    icon,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_api_key_is_a_config_error() {
        let err = OpenWeatherProvider::new("  ").unwrap_err();
        assert!(matches!(err, FetchError::Config(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let p = OpenWeatherProvider::new("KEY").unwrap().with_base_url("http://localhost:1234/");
        assert_eq!(p.base_url, "http://localhost:1234");
    }

    #[test]
    fn cod_check_accepts_numeric_and_string_200() {
        assert!(check_cod(None, None).is_ok());
        assert!(check_cod(Some(&serde_json::json!(200)), None).is_ok());
        assert!(check_cod(Some(&serde_json::json!("200")), None).is_ok());
    }

    #[test]
    fn cod_check_surfaces_provider_message() {
        let err = check_cod(Some(&serde_json::json!("404")), Some("city not found")).unwrap_err();
        match err {
            FetchError::Upstream { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "city not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn cod_check_rejects_unrecognised_codes() {
        for cod in [serde_json::json!("abc"), serde_json::json!(70000), serde_json::json!(true)] {
            let err = check_cod(Some(&cod), Some("whatever")).unwrap_err();
            assert!(matches!(err, FetchError::InvalidResponse(_)), "cod {cod}: {err:?}");
        }
    }

    #[test]
    fn error_body_parses_as_status_only() {
        let body = r#"{"cod":"404","message":"city not found"}"#;

        let status: OwStatus = parse_json("/data/2.5/weather", body).unwrap();
        let err = check_cod(status.cod.as_ref(), status.message.as_deref()).unwrap_err();
        assert!(matches!(err, FetchError::Upstream { status: 404, .. }));

        // the full payload would not decode
        assert!(parse_json::<OwCurrentResponse>("/data/2.5/weather", body).is_err());
    }

    #[test]
    fn missing_weather_entry_is_unknown_condition() {
        let (condition, description, icon) = primary_weather(&[]);
        assert_eq!(condition, Condition::Unknown);
        assert!(description.is_empty());
        assert!(icon.is_empty());
    }

    #[test]
    fn forecast_entry_parses_provider_shape() {
        let json = r#"{
            "cod": "200",
            "list": [
                {"dt": 1772712000, "main": {"temp": 3.4, "feels_like": 1.0, "pressure": 1012, "humidity": 80},
                 "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
                 "dt_txt": "2026-03-05 12:00:00"}
            ],
            "city": {"name": "Oslo", "country": "NO"}
        }"#;

        let parsed: OwForecastResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.list.len(), 1);
        let (condition, description, icon) = primary_weather(&parsed.list[0].weather);
        assert_eq!(condition, Condition::Rain);
        assert_eq!(description, "light rain");
        assert_eq!(icon, "10d");
    }
}
