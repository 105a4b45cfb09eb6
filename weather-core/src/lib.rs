//! Core library for the weather relay.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Upstream providers (Open-Meteo forecast, geocode.maps.co reverse lookup)
//! - Place-name resolution and the merged response sent to the frontend
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod place;
pub mod provider;
pub mod relay;

pub use config::Config;
pub use error::{ErrorBody, FetchError, RelayError};
pub use model::{CombinedResponse, CoordinateQuery, Coordinates};
pub use place::resolve_place_name;
pub use provider::{GeocodeSource, Upstream, WeatherSource};
pub use relay::WeatherRelay;
