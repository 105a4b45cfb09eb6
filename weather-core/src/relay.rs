//! The `/weather` lookup: validate, fetch both upstreams concurrently, merge.

use std::sync::Arc;

use crate::{
    Config,
    error::{FetchError, RelayError},
    model::{
        CombinedResponse, CoordinateQuery, Coordinates, DailyForecast, GeocodePayload,
        LocationInfo, WeatherPayload, echoed_coordinate,
    },
    place::resolve_place_name,
    provider::{
        GeocodeMapsProvider, GeocodeSource, OpenMeteoProvider, Upstream, WeatherSource, http_client,
    },
};

#[derive(Debug, Clone)]
pub struct WeatherRelay {
    weather: Arc<dyn WeatherSource>,
    geocoder: Arc<dyn GeocodeSource>,
    geocode_api_key: Option<String>,
}

impl WeatherRelay {
    pub fn new(
        weather: Arc<dyn WeatherSource>,
        geocoder: Arc<dyn GeocodeSource>,
        geocode_api_key: Option<String>,
    ) -> Self {
        Self { weather, geocoder, geocode_api_key }
    }

    /// Relay backed by Open-Meteo and geocode.maps.co.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = http_client(config)?;

        if config.geocode_api_key().is_none() {
            tracing::warn!(
                "{} is not set; weather lookups will fail until it is configured",
                crate::config::ENV_GEOCODE_API_KEY
            );
        }

        Ok(Self::new(
            Arc::new(OpenMeteoProvider::new(config.weather_base_url.clone(), http.clone())),
            Arc::new(GeocodeMapsProvider::new(config.geocode_base_url.clone(), http)),
            config.geocode_api_key().map(str::to_owned),
        ))
    }

    /// Look up weather and place name for the queried coordinates.
    pub async fn lookup(&self, query: &CoordinateQuery) -> Result<CombinedResponse, RelayError> {
        let coords = Coordinates::try_from(query)?;

        let api_key = self.geocode_api_key.as_deref().ok_or_else(|| {
            tracing::error!("geocoding API key is not configured; refusing lookup");
            RelayError::Configuration
        })?;

        let (weather, geocode) = tokio::join!(
            self.weather.forecast(&coords),
            self.geocoder.reverse(&coords, api_key),
        );

        let (weather, geocode) = classify(weather, geocode)?;
        Ok(merge(&coords, weather, &geocode))
    }
}

/// Collapse both outcomes into one. A rejected geocoding key takes
/// precedence, then any fetch failure, then undecodable payloads.
fn classify(
    weather: Result<WeatherPayload, FetchError>,
    geocode: Result<GeocodePayload, FetchError>,
) -> Result<(WeatherPayload, GeocodePayload), RelayError> {
    match (weather, geocode) {
        (Ok(w), Ok(g)) => Ok((w, g)),
        (weather, geocode) => {
            let mut errors: Vec<FetchError> =
                [weather.err(), geocode.err()].into_iter().flatten().collect();

            for err in &errors {
                tracing::error!(upstream = %err.upstream(), error = %err, "upstream call failed");
            }

            if let Some(err) = take_first(&mut errors, |e| {
                e.upstream() == Upstream::Geocoding && e.is_unauthorized()
            }) {
                return Err(RelayError::GeocodingAuth(err));
            }
            if let Some(err) = take_first(&mut errors, |e| !e.is_decode()) {
                return Err(RelayError::UpstreamFetch(err));
            }

            let details = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            Err(RelayError::Processing(details))
        }
    }
}

fn take_first(
    errors: &mut Vec<FetchError>,
    pred: impl Fn(&FetchError) -> bool,
) -> Option<FetchError> {
    let idx = errors.iter().position(|e| pred(e))?;
    Some(errors.remove(idx))
}

/// Build the frontend payload from two successful upstream responses.
pub fn merge(
    coords: &Coordinates,
    weather: WeatherPayload,
    geocode: &GeocodePayload,
) -> CombinedResponse {
    let location = LocationInfo {
        name: resolve_place_name(geocode),
        latitude: echoed_coordinate(weather.latitude.as_ref()).or_else(|| coords.latitude()),
        longitude: echoed_coordinate(weather.longitude.as_ref()).or_else(|| coords.longitude()),
    };

    CombinedResponse {
        location,
        daily_forecast: DailyForecast::from_series(weather.daily.as_ref()),
        current_weather: weather.current,
        current_weather_units: weather.current_units,
        daily_forecast_units: weather
            .daily_units
            .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
    }
}
