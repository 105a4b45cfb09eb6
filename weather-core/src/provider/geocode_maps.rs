use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::FetchError,
    model::{Coordinates, GeocodePayload},
};

use super::{GeocodeSource, Upstream, endpoint, fetch_json};

pub const DEFAULT_BASE_URL: &str = "https://geocode.maps.co";

#[derive(Debug, Clone)]
pub struct GeocodeMapsProvider {
    base_url: String,
    http: Client,
}

impl GeocodeMapsProvider {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self { base_url: base_url.into(), http }
    }
}

#[async_trait]
impl GeocodeSource for GeocodeMapsProvider {
    async fn reverse(&self, coords: &Coordinates, api_key: &str) -> Result<GeocodePayload, FetchError> {
        let url = endpoint(&self.base_url, "reverse");

        let request = self.http.get(url).query(&[
            ("lat", coords.lat.as_str()),
            ("lon", coords.lon.as_str()),
            ("api_key", api_key),
        ]);

        fetch_json(Upstream::Geocoding, request).await
    }
}
