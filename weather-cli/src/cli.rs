use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use anyhow::{Context, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use weather_core::{Config, WeatherEnvelope, WeatherRecord, WeatherService, provider_from_config};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather dashboard backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve {
        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
        host: IpAddr,

        #[arg(long, default_value_t = 8000)]
        port: u16,

        /// Directory of static frontend files served for unmatched paths.
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Show current weather at a coordinate pair.
    Current {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Print the JSON envelope instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Show current weather for a city.
    City {
        name: String,

        /// Print the JSON envelope instead of a summary.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Serve { host, port, static_dir } => {
                let config = Config::load()?;
                let service = WeatherService::new(provider_from_config(&config)?);
                let app = server::router(service, &config.cors_origins, static_dir.as_deref());
                server::run(SocketAddr::new(host, port), app).await
            }
            Command::Current { lat, lon, json } => {
                let record = service()?.get_weather_by_coordinates(lat, lon).await?;
                print_record(record, json)
            }
            Command::City { name, json } => {
                let record = service()?.get_weather_by_city(&name).await?;
                print_record(record, json)
            }
        }
    }
}

fn service() -> anyhow::Result<WeatherService> {
    let config = Config::load()?;
    Ok(WeatherService::new(provider_from_config(&config)?))
}

/// Prompt for the API key and persist it. Environment overrides are not written back.
fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let key = key.trim();
    if key.is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(key.to_string());
    config.save_to(&path)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn print_record(record: WeatherRecord, json: bool) -> anyhow::Result<()> {
    let envelope = WeatherEnvelope::new(record);
    if json {
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        print!("{}", summary(&envelope));
    }
    Ok(())
}

fn summary(envelope: &WeatherEnvelope) -> String {
    let w = &envelope.data;
    format!(
        "{} ({:.2}, {:.2})\n  {}\n  Temperature: {:.1} °C\n  Humidity:    {}%\n  Wind:        {:.1} m/s\n  Fetched:     {}\n",
        w.city,
        w.lat,
        w.lon,
        w.description,
        w.temperature,
        w.humidity,
        w.wind_speed,
        envelope.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
    )
}
