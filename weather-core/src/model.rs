use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RelayError;

/// Number of forecast days asked from the weather provider.
pub const FORECAST_DAYS: u8 = 3;

/// Number of forecast days handed to the frontend.
pub const DISPLAY_DAYS: usize = 2;

/// Raw query parameters of `GET /weather`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoordinateQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl CoordinateQuery {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self { lat: Some(lat.into()), lon: Some(lon.into()) }
    }
}

/// Validated coordinates. The strings are forwarded to the upstreams verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub lat: String,
    pub lon: String,
}

impl Coordinates {
    /// Strict parse: a trailing non-numeric suffix ("48.85abc") yields `None`.
    pub fn latitude(&self) -> Option<f64> {
        parse_coordinate(&self.lat)
    }

    pub fn longitude(&self) -> Option<f64> {
        parse_coordinate(&self.lon)
    }
}

impl TryFrom<&CoordinateQuery> for Coordinates {
    type Error = RelayError;

    fn try_from(query: &CoordinateQuery) -> Result<Self, Self::Error> {
        let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_owned);

        match (present(&query.lat), present(&query.lon)) {
            (Some(lat), Some(lon)) => Ok(Self { lat, lon }),
            _ => Err(RelayError::MissingParameter),
        }
    }
}

/// Open-Meteo forecast response. Everything is optional; `current` and the
/// unit objects are passed through untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherPayload {
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
    #[serde(default)]
    pub current: Option<Value>,
    #[serde(default)]
    pub current_units: Option<Value>,
    #[serde(default)]
    pub daily: Option<DailySeries>,
    #[serde(default)]
    pub daily_units: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub time: Option<Vec<Value>>,
    #[serde(default)]
    pub weather_code: Option<Vec<Value>>,
    #[serde(default)]
    pub temperature_2m_max: Option<Vec<Value>>,
    #[serde(default)]
    pub temperature_2m_min: Option<Vec<Value>>,
    #[serde(default)]
    pub sunrise: Option<Vec<Value>>,
    #[serde(default)]
    pub sunset: Option<Vec<Value>>,
}

/// Reverse-geocoding response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodePayload {
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub hamlet: Option<String>,
    pub county: Option<String>,
    pub country: Option<String>,
}

/// Body returned to the frontend on success.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedResponse {
    pub location: LocationInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_weather: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_weather_units: Option<Value>,
    pub daily_forecast: DailyForecast,
    pub daily_forecast_units: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationInfo {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Daily series cut down to [`DISPLAY_DAYS`] entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyForecast {
    pub time: Vec<Value>,
    pub weather_code: Vec<Value>,
    pub temperature_2m_max: Vec<Value>,
    pub temperature_2m_min: Vec<Value>,
    pub sunrise: Vec<Value>,
    pub sunset: Vec<Value>,
}

impl DailyForecast {
    pub fn from_series(series: Option<&DailySeries>) -> Self {
        let Some(s) = series else {
            return Self::default();
        };

        Self {
            time: first_days(s.time.as_deref()),
            weather_code: first_days(s.weather_code.as_deref()),
            temperature_2m_max: first_days(s.temperature_2m_max.as_deref()),
            temperature_2m_min: first_days(s.temperature_2m_min.as_deref()),
            sunrise: first_days(s.sunrise.as_deref()),
            sunset: first_days(s.sunset.as_deref()),
        }
    }
}

fn first_days(values: Option<&[Value]>) -> Vec<Value> {
    values
        .map(|v| v.iter().take(DISPLAY_DAYS).cloned().collect())
        .unwrap_or_default()
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads a coordinate echoed by the weather provider, which may be a number
/// or a numeric string.
pub(crate) fn echoed_coordinate(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_coordinate(s),
        _ => None,
    }
}
