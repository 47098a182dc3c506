use std::fmt;

use thiserror::Error;

/// Which provider endpoint a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Weather,
    Geocoding,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Weather => "weather",
            Endpoint::Geocoding => "geocoding",
        }
    }

    /// Title-case name, as used at the start of outward messages.
    pub fn title(&self) -> &'static str {
        match self {
            Endpoint::Weather => "Weather",
            Endpoint::Geocoding => "Geocoding",
        }
    }

    /// How a malformed body from this endpoint is described.
    fn response_label(&self) -> &'static str {
        match self {
            Endpoint::Weather => "API",
            Endpoint::Geocoding => "geocoding",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse failure category, used by callers to pick an outward status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidCoordinates,
    LocationNotFound,
    Provider,
}

/// Every way a single lookup can fail.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Coordinates out of range, or rejected by the provider.
    #[error("{0}")]
    InvalidCoordinates(String),

    /// Geocoding returned no match for the city.
    #[error("City not found: {city}")]
    LocationNotFound { city: String },

    /// Provider answered with a non-success status.
    #[error("{} API error: {status}", .endpoint.title())]
    ProviderStatus { endpoint: Endpoint, status: u16 },

    /// No response was received (connect failure, timeout, broken body).
    #[error("Failed to connect to {endpoint} API: {message}")]
    ProviderUnreachable { endpoint: Endpoint, message: String },

    /// Response arrived but did not have the expected shape.
    #[error("Unexpected {} response format: {message}", .endpoint.response_label())]
    MalformedResponse { endpoint: Endpoint, message: String },

    /// The HTTP client itself could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl WeatherError {
    pub fn invalid_latitude(lat: f64) -> Self {
        Self::InvalidCoordinates(format!("Latitude must be between -90 and 90, got {lat}"))
    }

    pub fn invalid_longitude(lon: f64) -> Self {
        Self::InvalidCoordinates(format!("Longitude must be between -180 and 180, got {lon}"))
    }

    pub fn rejected_coordinates(lat: f64, lon: f64) -> Self {
        Self::InvalidCoordinates(format!("Invalid coordinates: lat={lat}, lon={lon}"))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::InvalidCoordinates(_) => ErrorKind::InvalidCoordinates,
            WeatherError::LocationNotFound { .. } => ErrorKind::LocationNotFound,
            WeatherError::ProviderStatus { .. }
            | WeatherError::ProviderUnreachable { .. }
            | WeatherError::MalformedResponse { .. }
            | WeatherError::Client(_) => ErrorKind::Provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_tagged_not_parsed_from_messages() {
        // A provider error whose text happens to say "not found" is still a provider error.
        let err = WeatherError::MalformedResponse {
            endpoint: Endpoint::Geocoding,
            message: "field not found".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Provider);

        let err = WeatherError::LocationNotFound { city: "Atlantis".into() };
        assert_eq!(err.kind(), ErrorKind::LocationNotFound);
        assert_eq!(err.to_string(), "City not found: Atlantis");
    }

    #[test]
    fn status_and_connectivity_messages_differ() {
        let status = WeatherError::ProviderStatus { endpoint: Endpoint::Weather, status: 500 };
        let unreachable = WeatherError::ProviderUnreachable {
            endpoint: Endpoint::Weather,
            message: "request timed out".into(),
        };

        assert_eq!(status.kind(), unreachable.kind());
        assert_eq!(status.to_string(), "Weather API error: 500");
        assert_eq!(
            unreachable.to_string(),
            "Failed to connect to weather API: request timed out"
        );
    }

    #[test]
    fn provider_messages_per_endpoint() {
        let geocoding = WeatherError::ProviderStatus { endpoint: Endpoint::Geocoding, status: 400 };
        assert_eq!(geocoding.to_string(), "Geocoding API error: 400");

        let unreachable = WeatherError::ProviderUnreachable {
            endpoint: Endpoint::Geocoding,
            message: "connection refused".into(),
        };
        assert_eq!(
            unreachable.to_string(),
            "Failed to connect to geocoding API: connection refused"
        );

        let weather = WeatherError::MalformedResponse {
            endpoint: Endpoint::Weather,
            message: "missing field `main`".into(),
        };
        assert_eq!(weather.to_string(), "Unexpected API response format: missing field `main`");

        let geocoding = WeatherError::MalformedResponse {
            endpoint: Endpoint::Geocoding,
            message: "missing field `lat`".into(),
        };
        assert_eq!(
            geocoding.to_string(),
            "Unexpected geocoding response format: missing field `lat`"
        );
    }

    #[test]
    fn coordinate_messages_name_the_bound_and_value() {
        assert_eq!(
            WeatherError::invalid_latitude(91.5).to_string(),
            "Latitude must be between -90 and 90, got 91.5"
        );
        assert_eq!(
            WeatherError::invalid_longitude(-181.0).to_string(),
            "Longitude must be between -180 and 180, got -181"
        );
    }
}
