use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::FetchError,
    model::{Coordinates, FORECAST_DAYS, WeatherPayload},
};

use super::{Upstream, WeatherSource, endpoint, fetch_json};

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,sunrise,sunset";
const TIMEZONE: &str = "GMT";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self { base_url: base_url.into(), http }
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoProvider {
    async fn forecast(&self, coords: &Coordinates) -> Result<WeatherPayload, FetchError> {
        let url = endpoint(&self.base_url, "v1/forecast");
        let days = FORECAST_DAYS.to_string();

        let request = self.http.get(url).query(&[
            ("latitude", coords.lat.as_str()),
            ("longitude", coords.lon.as_str()),
            ("current", CURRENT_FIELDS),
            ("daily", DAILY_FIELDS),
            ("forecast_days", days.as_str()),
            ("timezone", TIMEZONE),
        ]);

        fetch_json(Upstream::Weather, request).await
    }
}
