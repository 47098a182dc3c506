use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;

use crate::{
    Config, Coordinates, WeatherError, WeatherRecord, provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

/// Anything that can report current weather and geocode a city name.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions at `lat`/`lon`.
    async fn get_weather(&self, lat: f64, lon: f64) -> Result<WeatherRecord, WeatherError>;

    /// Best match for `city`, or `LocationNotFound` if there is none.
    async fn get_coordinates_by_city(&self, city: &str) -> Result<Coordinates, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key()?;
    let provider = OpenWeatherProvider::new(api_key.to_owned(), config.base_url.clone())?;
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(provider_from_config(&cfg).is_ok());
    }
}
