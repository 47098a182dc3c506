use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    error::{Endpoint, WeatherError},
    model::{Coordinates, WeatherRecord},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Default bound on every outbound call; exceeding it counts as a connectivity failure.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const WEATHER_PATH: &str = "/data/2.5/weather";
const GEOCODING_PATH: &str = "/geo/1.0/direct";

/// OpenWeatherMap client. Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    timeout: Duration,
    http: Client,
}

impl fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Result<Self, WeatherError> {
        Self::with_timeout(api_key, base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        api_key: String,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Client(e.to_string()))?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            http,
        })
    }

    /// Issue one GET and return the status with the raw body.
    async fn get(
        &self,
        endpoint: Endpoint,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<(StatusCode, String), WeatherError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%endpoint, %url, "calling OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| self.connect_error(endpoint, &e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.connect_error(endpoint, &e))?;

        if !status.is_success() {
            warn!(%endpoint, %status, body = %truncate_body(&body), "OpenWeather request failed");
        }

        Ok((status, body))
    }

    fn connect_error(&self, endpoint: Endpoint, err: &reqwest::Error) -> WeatherError {
        let message = if err.is_timeout() {
            format!("request timed out after {}s", self.timeout.as_secs_f64())
        } else {
            err.to_string()
        };
        warn!(%endpoint, %message, "OpenWeather unreachable");
        WeatherError::ProviderUnreachable { endpoint, message }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn get_weather(&self, lat: f64, lon: f64) -> Result<WeatherRecord, WeatherError> {
        let params = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("units", "metric".to_string()),
        ];
        let (status, body) = self.get(Endpoint::Weather, WEATHER_PATH, &params).await?;

        if status == StatusCode::BAD_REQUEST {
            return Err(WeatherError::rejected_coordinates(lat, lon));
        }
        if !status.is_success() {
            return Err(WeatherError::ProviderStatus {
                endpoint: Endpoint::Weather,
                status: status.as_u16(),
            });
        }

        let parsed: OwCurrentResponse = decode(Endpoint::Weather, &body)?;
        parsed.into_record()
    }

    async fn get_coordinates_by_city(&self, city: &str) -> Result<Coordinates, WeatherError> {
        let params = [("q", city.to_string()), ("limit", "1".to_string())];
        let (status, body) = self.get(Endpoint::Geocoding, GEOCODING_PATH, &params).await?;

        if !status.is_success() {
            return Err(WeatherError::ProviderStatus {
                endpoint: Endpoint::Geocoding,
                status: status.as_u16(),
            });
        }

        // A `null` body means no match, same as `[]`.
        let matches: Option<Vec<OwGeocodeEntry>> = decode(Endpoint::Geocoding, &body)?;
        let first = matches
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound { city: city.to_string() })?;

        Ok(Coordinates::new(first.lat, first.lon))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    coord: OwCoord,
}

impl OwCurrentResponse {
    fn into_record(self) -> Result<WeatherRecord, WeatherError> {
        let description = self
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or_else(|| WeatherError::MalformedResponse {
                endpoint: Endpoint::Weather,
                message: "`weather` array is empty".to_string(),
            })?;

        Ok(WeatherRecord {
            temperature: self.main.temp,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            description,
            city: self.name,
            lat: self.coord.lat,
            lon: self.coord.lon,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwGeocodeEntry {
    lat: f64,
    lon: f64,
}

fn decode<T: DeserializeOwned>(endpoint: Endpoint, body: &str) -> Result<T, WeatherError> {
    serde_json::from_str(body).map_err(|e| WeatherError::MalformedResponse {
        endpoint,
        message: e.to_string(),
    })
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_response_maps_to_record() {
        let body = r#"{"main":{"temp":21.5,"humidity":60},"wind":{"speed":3.2},
            "weather":[{"description":"clear sky"}],"name":"London",
            "coord":{"lat":51.51,"lon":-0.13}}"#;

        let record = decode::<OwCurrentResponse>(Endpoint::Weather, body)
            .unwrap()
            .into_record()
            .unwrap();

        assert_eq!(record.temperature, 21.5);
        assert_eq!(record.humidity, 60);
        assert_eq!(record.wind_speed, 3.2);
        assert_eq!(record.description, "clear sky");
        assert_eq!(record.city, "London");
        assert_eq!((record.lat, record.lon), (51.51, -0.13));
    }

    #[test]
    fn empty_weather_array_is_malformed() {
        let body = r#"{"main":{"temp":1.0,"humidity":1},"wind":{"speed":1.0},
            "weather":[],"name":"X","coord":{"lat":0.0,"lon":0.0}}"#;

        let err = decode::<OwCurrentResponse>(Endpoint::Weather, body)
            .unwrap()
            .into_record()
            .unwrap_err();

        assert!(matches!(err, WeatherError::MalformedResponse { endpoint: Endpoint::Weather, .. }));
    }

    #[test]
    fn missing_field_is_malformed() {
        let err = decode::<OwCurrentResponse>(Endpoint::Weather, r#"{"name":"X"}"#).unwrap_err();
        assert!(err.to_string().starts_with("Unexpected API response format"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let provider = OpenWeatherProvider::new("SECRET".into(), DEFAULT_BASE_URL).unwrap();
        assert!(!format!("{provider:?}").contains("SECRET"));
    }
}
