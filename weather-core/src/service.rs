use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    error::WeatherError, model::WeatherRecord, provider::WeatherProvider,
    validate::validate_coordinates,
};

/// Validates input and chains provider calls. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Current weather at the given point. Coordinates are validated before the provider is called.
    #[instrument(skip(self))]
    pub async fn get_weather_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherRecord, WeatherError> {
        validate_coordinates(lat, lon)?;
        self.provider.get_weather(lat, lon).await
    }

    /// Geocode `city`, then look up weather at the first match.
    #[instrument(skip(self))]
    pub async fn get_weather_by_city(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        let coords = self.provider.get_coordinates_by_city(city).await?;
        debug!(lat = coords.lat, lon = coords.lon, "geocoded");
        self.get_weather_by_coordinates(coords.lat, coords.lon).await
    }
}
