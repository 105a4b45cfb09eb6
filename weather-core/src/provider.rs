use crate::{
    Config,
    error::FetchError,
    model::{Coordinates, GeocodePayload, WeatherPayload},
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::fmt::Debug;

pub mod geocode_maps;
pub mod open_meteo;

pub use geocode_maps::GeocodeMapsProvider;
pub use open_meteo::OpenMeteoProvider;

/// The two services every lookup depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upstream {
    Weather,
    Geocoding,
}

impl Upstream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Upstream::Weather => "open-meteo",
            Upstream::Geocoding => "geocode.maps.co",
        }
    }
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Current conditions plus the daily forecast for `coords`.
    async fn forecast(&self, coords: &Coordinates) -> Result<WeatherPayload, FetchError>;
}

#[async_trait]
pub trait GeocodeSource: Send + Sync + Debug {
    /// Reverse lookup of `coords`, authenticated with `api_key`.
    async fn reverse(&self, coords: &Coordinates, api_key: &str) -> Result<GeocodePayload, FetchError>;
}

/// HTTP client shared by both providers, with the per-call deadline applied.
pub fn http_client(config: &Config) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("weather-relay/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Send `request`, require a 2xx status and decode the JSON body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    upstream: Upstream,
    request: RequestBuilder,
) -> Result<T, FetchError> {
    // The request URL carries the geocoding API key.
    let transport =
        |e: reqwest::Error| FetchError::Transport { upstream, source: Box::new(e.without_url()) };

    let res = request.send().await.map_err(transport)?;
    let status = res.status();
    let body = res.text().await.map_err(transport)?;

    if !status.is_success() {
        return Err(FetchError::Status {
            upstream,
            status: status.as_u16(),
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|source| FetchError::Decode { upstream, source })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
