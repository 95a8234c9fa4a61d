use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Primary weather condition label as reported by the provider.
///
/// Labels outside the known set are kept verbatim in `Other`, so two
/// different unknown labels never collapse into one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Snow,
    Thunderstorm,
    Mist,
    Fog,
    Haze,
    Unknown,
    Other(String),
}

impl Condition {
    /// Map a provider label (`"Clear"`, `"Clouds"`, ...). Matching is exact.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Clear" => Self::Clear,
            "Clouds" => Self::Clouds,
            "Rain" => Self::Rain,
            "Drizzle" => Self::Drizzle,
            "Snow" => Self::Snow,
            "Thunderstorm" => Self::Thunderstorm,
            "Mist" => Self::Mist,
            "Fog" => Self::Fog,
            "Haze" => Self::Haze,
            "" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
            Self::Mist => "Mist",
            Self::Fog => "Fog",
            Self::Haze => "Haze",
            Self::Unknown => "Unknown",
            Self::Other(raw) => raw,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::Clouds => "☁️",
            Self::Rain => "🌧️",
            Self::Drizzle => "🌦️",
            Self::Snow => "❄️",
            Self::Thunderstorm => "⛈️",
            Self::Mist | Self::Fog | Self::Haze => "🌫️",
            Self::Unknown | Self::Other(_) => "🌤️",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One 3-hour forecast entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub condition: Condition,
    pub description: String,
    pub icon: String,
}

impl WeatherSample {
    /// Calendar date of the sample, in the timestamp's own zone.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Per-day reduction of forecast samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub avg_temp_c: i32,
    pub min_temp_c: i32,
    pub max_temp_c: i32,
    pub condition: Condition,
    pub description: String,
    pub icon: String,
}

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub country: String,
}

impl Location {
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed_mps: f64,
    pub visibility_m: Option<u32>,
    pub condition: Condition,
    pub description: String,
    pub icon: String,
    pub observed_at: DateTime<Utc>,
}

/// Raw forecast feed for a resolved location.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub location: Location,
    pub samples: Vec<WeatherSample>,
}

/// Current conditions plus the aggregated daily outlook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: Location,
    pub current: CurrentConditions,
    pub days: Vec<DaySummary>,
}

/// Round to the nearest integer with halves going up (`-2.5` becomes `-2`).
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_roundtrip() {
        for label in ["Clear", "Clouds", "Rain", "Drizzle", "Snow", "Thunderstorm", "Mist", "Fog", "Haze"] {
            assert_eq!(Condition::from_label(label).label(), label);
        }
    }

    #[test]
    fn unknown_labels_are_kept_verbatim() {
        let c = Condition::from_label("Smoke");
        assert_eq!(c, Condition::Other("Smoke".into()));
        assert_eq!(c.label(), "Smoke");
        assert_ne!(Condition::from_label("clear"), Condition::Clear);
        assert_eq!(Condition::from_label(""), Condition::Unknown);
    }

    #[test]
    fn emoji_falls_back_for_unmapped_conditions() {
        assert_eq!(Condition::Clear.emoji(), "☀️");
        assert_eq!(Condition::Haze.emoji(), Condition::Fog.emoji());
        assert_eq!(Condition::Other("Dust".into()).emoji(), "🌤️");
    }

    #[test]
    fn rounding_goes_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.51), -3);
        assert_eq!(round_half_up(0.0), 0);
    }

    #[test]
    fn location_display_name_skips_empty_country() {
        let mut loc = Location {
            latitude: 0.0,
            longitude: 0.0,
            name: "Paris".into(),
            country: "FR".into(),
        };
        assert_eq!(loc.display_name(), "Paris, FR");
        loc.country.clear();
        assert_eq!(loc.display_name(), "Paris");
    }
}
