//! Provider and relay tests against wiremock upstreams.

use std::time::Duration;

use weather_core::{
    Config, Coordinates, CoordinateQuery, FetchError, GeocodeSource, RelayError, Upstream,
    WeatherRelay, WeatherSource,
    provider::{GeocodeMapsProvider, OpenMeteoProvider, http_client},
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn coords() -> Coordinates {
    Coordinates { lat: "48.8566".into(), lon: "2.3522".into() }
}

fn config_for(server: &MockServer) -> Config {
    Config {
        geocode_api_key: Some("KEY".into()),
        weather_base_url: server.uri(),
        geocode_base_url: server.uri(),
        request_timeout_secs: 5,
        ..Config::default()
    }
}

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "latitude": 48.86,
        "longitude": 2.34,
        "current": { "temperature_2m": 18.3 },
        "current_units": { "temperature_2m": "°C" },
        "daily": {
            "time": ["2025-06-01", "2025-06-02", "2025-06-03"],
            "weather_code": [3, 61, 80],
            "temperature_2m_max": [21.4, 19.0, 18.2],
            "temperature_2m_min": [12.1, 11.7, 10.9],
            "sunrise": ["2025-06-01T03:50", "2025-06-02T03:49", "2025-06-03T03:49"],
            "sunset": ["2025-06-01T19:48", "2025-06-02T19:49", "2025-06-03T19:50"]
        },
        "daily_units": { "temperature_2m_max": "°C" }
    })
}

#[tokio::test]
async fn open_meteo_sends_the_forecast_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "48.8566"))
        .and(query_param("longitude", "2.3522"))
        .and(query_param(
            "current",
            "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m",
        ))
        .and(query_param("daily", "weather_code,temperature_2m_max,temperature_2m_min,sunrise,sunset"))
        .and(query_param("forecast_days", "3"))
        .and(query_param("timezone", "GMT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server);
    let provider = OpenMeteoProvider::new(cfg.weather_base_url.clone(), http_client(&cfg).unwrap());

    let payload = provider.forecast(&coords()).await.expect("forecast should succeed");

    assert_eq!(payload.daily.unwrap().time.unwrap().len(), 3);
    assert!(payload.current.is_some());
}

#[tokio::test]
async fn geocode_sends_the_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "48.8566"))
        .and(query_param("lon", "2.3522"))
        .and(query_param("api_key", "KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "display_name": "Paris, Île-de-France, France",
            "address": { "city": "Paris", "country": "France" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server);
    let provider = GeocodeMapsProvider::new(cfg.geocode_base_url.clone(), http_client(&cfg).unwrap());

    let payload = provider.reverse(&coords(), "KEY").await.expect("reverse should succeed");

    assert_eq!(payload.address.unwrap().city.as_deref(), Some("Paris"));
}

#[tokio::test]
async fn geocode_forbidden_is_reported_as_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let cfg = config_for(&server);
    let provider = GeocodeMapsProvider::new(cfg.geocode_base_url.clone(), http_client(&cfg).unwrap());

    let err = provider.reverse(&coords(), "BAD").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.upstream(), Upstream::Geocoding);
    assert!(err.to_string().contains("Invalid API key"));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let cfg = config_for(&server);
    let provider = OpenMeteoProvider::new(cfg.weather_base_url.clone(), http_client(&cfg).unwrap());

    let err = provider.forecast(&coords()).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode { upstream: Upstream::Weather, .. }));
}

#[tokio::test]
async fn slow_upstream_hits_the_deadline() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let cfg = Config { request_timeout_secs: 1, ..config_for(&server) };
    let provider = OpenMeteoProvider::new(cfg.weather_base_url.clone(), http_client(&cfg).unwrap());

    let err = provider.forecast(&coords()).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport { upstream: Upstream::Weather, .. }));
}

#[tokio::test]
async fn relay_merges_live_responses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "address": {},
            "display_name": "Eiffel Tower, 5th Arrondissement, Paris, Île-de-France, France"
        })))
        .mount(&server)
        .await;

    let relay = WeatherRelay::from_config(&config_for(&server)).unwrap();

    let res = relay
        .lookup(&CoordinateQuery::new("48.8566", "2.3522"))
        .await
        .expect("lookup should succeed");

    assert_eq!(res.location.name, "Eiffel Tower, France");
    assert_eq!(res.location.latitude, Some(48.86));
    assert_eq!(res.daily_forecast.time.len(), 2);
    assert_eq!(res.daily_forecast.temperature_2m_min.len(), 2);
}

#[tokio::test]
async fn relay_reports_refused_connection_as_upstream_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let cfg = Config {
        // Nothing listens on port 1.
        weather_base_url: "http://127.0.0.1:1".into(),
        ..config_for(&server)
    };
    let relay = WeatherRelay::from_config(&cfg).unwrap();

    let err = relay.lookup(&CoordinateQuery::new("1", "2")).await.unwrap_err();

    assert!(matches!(err, RelayError::UpstreamFetch(_)));
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn transport_errors_do_not_reveal_the_api_key() {
    let cfg = Config { request_timeout_secs: 1, ..Config::default() };
    let refused = GeocodeMapsProvider::new("http://127.0.0.1:1", http_client(&cfg).unwrap());

    let err = refused.reverse(&coords(), "SUPERSECRETKEY").await.unwrap_err();

    assert!(matches!(err, FetchError::Transport { upstream: Upstream::Geocoding, .. }));
    assert!(!err.to_string().contains("SUPERSECRETKEY"));
    let chain = format!("{:?}", anyhow::Error::new(err));
    assert!(!chain.contains("SUPERSECRETKEY"), "key leaked: {chain}");
}

#[tokio::test]
async fn timed_out_geocoding_does_not_reveal_the_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let cfg = Config { request_timeout_secs: 1, ..config_for(&server) };
    let provider = GeocodeMapsProvider::new(cfg.geocode_base_url.clone(), http_client(&cfg).unwrap());

    let err = provider.reverse(&coords(), "SUPERSECRETKEY").await.unwrap_err();

    assert!(!err.to_string().contains("SUPERSECRETKEY"));
    let relayed = RelayError::UpstreamFetch(err);
    let chain = format!("{:?}", anyhow::Error::new(relayed));
    assert!(!chain.contains("SUPERSECRETKEY"), "key leaked: {chain}");
}
