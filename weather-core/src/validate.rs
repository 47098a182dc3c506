use crate::error::WeatherError;

pub const LAT_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;
pub const LON_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// Check that `lat`/`lon` are within their inclusive ranges. Latitude is checked first.
/// NaN is never in range.
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), WeatherError> {
    if !LAT_RANGE.contains(&lat) {
        return Err(WeatherError::invalid_latitude(lat));
    }
    if !LON_RANGE.contains(&lon) {
        return Err(WeatherError::invalid_longitude(lon));
    }
    Ok(())
}
