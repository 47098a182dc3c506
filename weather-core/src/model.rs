use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Current conditions as reported by the provider for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Percent. Passed through as reported.
    pub humidity: i64,
    /// Metres per second.
    pub wind_speed: f64,
    pub description: String,
    pub city: String,
    /// Coordinates the provider resolved to; may be rounded relative to the request.
    pub lat: f64,
    pub lon: f64,
}

/// Outward response wrapper: the payload plus the time it was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(serialize_with = "serialize_utc_z")]
    pub timestamp: DateTime<Utc>,
}

pub type WeatherEnvelope = Envelope<WeatherRecord>;

impl<T> Envelope<T> {
    /// Wrap `data`, stamping it with the current time.
    pub fn new(data: T) -> Self {
        Self::at(data, Utc::now())
    }

    pub fn at(data: T, timestamp: DateTime<Utc>) -> Self {
        Self { data, timestamp }
    }
}

fn serialize_utc_z<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn london() -> WeatherRecord {
        WeatherRecord {
            temperature: 21.5,
            humidity: 60,
            wind_speed: 3.2,
            description: "clear sky".into(),
            city: "London".into(),
            lat: 51.51,
            lon: -0.13,
        }
    }

    #[test]
    fn envelope_timestamp_is_utc_with_trailing_z() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        let json = serde_json::to_value(Envelope::at(london(), ts)).unwrap();

        assert_eq!(json["timestamp"], "2024-03-01T12:30:05.000000Z");
    }

    #[test]
    fn envelope_data_keeps_every_provider_field() {
        let json = serde_json::to_string(&Envelope::new(london())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let data: WeatherRecord = serde_json::from_value(value["data"].clone()).unwrap();
        assert_eq!(data, london());

        let keys: Vec<&str> = value["data"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        for key in ["temperature", "humidity", "wind_speed", "description", "city", "lat", "lon"] {
            assert!(keys.contains(&key), "missing {key}");
        }
    }
}
