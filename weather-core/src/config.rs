use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::provider::{geocode_maps, open_meteo};

pub const ENV_GEOCODE_API_KEY: &str = "GEOCODE_MAPS_CO_API_KEY";
pub const ENV_PORT: &str = "PORT";
pub const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";
pub const ENV_STATIC_DIR: &str = "STATIC_DIR";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
pub const ENV_WEATHER_BASE_URL: &str = "WEATHER_API_BASE_URL";
pub const ENV_GEOCODE_BASE_URL: &str = "GEOCODE_API_BASE_URL";

/// Relay configuration.
///
/// Example TOML:
/// ```toml
/// geocode_api_key = "..."
/// port = 3000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Credential for geocode.maps.co. Lookups fail with a configuration
    /// error while this is unset.
    pub geocode_api_key: Option<String>,
    pub port: u16,
    pub bind_address: String,
    /// Directory served for paths other than the API routes.
    pub static_dir: PathBuf,
    /// Deadline for each upstream call.
    pub request_timeout_secs: u64,
    pub weather_base_url: String,
    pub geocode_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocode_api_key: None,
            port: 3000,
            bind_address: "0.0.0.0".to_string(),
            static_dir: PathBuf::from("public"),
            request_timeout_secs: 10,
            weather_base_url: open_meteo::DEFAULT_BASE_URL.to_string(),
            geocode_base_url: geocode_maps::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load the config file (if any), then apply overrides from the process
    /// environment.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_from(&Self::config_file_path()?)?;
        cfg.apply_env(|name| std::env::var(name).ok())?;
        Ok(cfg)
    }

    /// Load config from `path`, or return the defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Override fields from environment variables, looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_GEOCODE_API_KEY) {
            self.geocode_api_key = Some(key);
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid {ENV_PORT} value '{port}'"))?;
        }
        if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
            self.bind_address = addr;
        }
        if let Some(dir) = lookup(ENV_STATIC_DIR) {
            self.static_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid {ENV_REQUEST_TIMEOUT_SECS} value '{secs}'"))?;
        }
        if let Some(url) = lookup(ENV_WEATHER_BASE_URL) {
            self.weather_base_url = url;
        }
        if let Some(url) = lookup(ENV_GEOCODE_BASE_URL) {
            self.geocode_base_url = url;
        }
        Ok(())
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-relay", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The geocoding credential, if configured and non-empty.
    pub fn geocode_api_key(&self) -> Option<&str> {
        self.geocode_api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn set_geocode_api_key(&mut self, api_key: String) {
        self.geocode_api_key = Some(api_key);
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
