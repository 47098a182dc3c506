//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Coordinate validation
//! - The provider abstraction and its OpenWeatherMap implementation
//! - The lookup service that chains geocoding into weather and tags failures
//!
//! It is used by `weather-cli`, which exposes it over HTTP and on the command line.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;
pub mod validate;

pub use config::Config;
pub use error::{Endpoint, ErrorKind, WeatherError};
pub use model::{Coordinates, Envelope, WeatherEnvelope, WeatherRecord};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use service::WeatherService;
pub use validate::validate_coordinates;
