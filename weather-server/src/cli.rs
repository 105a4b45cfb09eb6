use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use weather_core::{Config, CoordinateQuery, WeatherRelay};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather and place-name relay for the frontend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Port to listen on; overrides PORT and the config file.
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind, e.g. "127.0.0.1".
        #[arg(long)]
        bind: Option<String>,
    },

    /// Store the geocode.maps.co API key in the config file.
    Configure,

    /// Run a single lookup and print the combined JSON.
    Lookup {
        #[arg(allow_hyphen_values = true)]
        lat: String,

        #[arg(allow_hyphen_values = true)]
        lon: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let command = self.command.unwrap_or(Command::Serve { port: None, bind: None });

        match command {
            Command::Serve { port, bind } => {
                let mut config = Config::load()?;
                if let Some(port) = port {
                    config.port = port;
                }
                if let Some(bind) = bind {
                    config.bind_address = bind;
                }
                server::serve(config).await
            }
            Command::Configure => configure(),
            Command::Lookup { lat, lon } => {
                let config = Config::load()?;
                let relay = WeatherRelay::from_config(&config)?;

                match relay.lookup(&CoordinateQuery::new(lat, lon)).await {
                    Ok(res) => {
                        println!("{}", serde_json::to_string_pretty(&res)?);
                        Ok(())
                    }
                    Err(err) => {
                        eprintln!("{}", serde_json::to_string_pretty(&err.body())?);
                        Err(anyhow::Error::new(err).context("Lookup failed"))
                    }
                }
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let api_key = Password::new("geocode.maps.co API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_geocode_api_key(api_key.trim().to_string());
    config.save_to(&path)?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}
