//! Core data models for Skycast
//!
//! This module contains the types flowing through the location-resolution
//! and weather-aggregation pipeline: autocomplete predictions, coordinates,
//! and the aggregated weather snapshot with its forecast days.

pub mod api;
pub mod parse;

pub use api::{ApiClient, ApiError, WeatherApi};
pub use parse::{condition_label, parse_weather};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used for weather fetched from the configured device
/// coordinate rather than a chosen prediction.
pub const CURRENT_LOCATION_LABEL: &str = "Current Location";

/// A candidate place produced by the autocomplete step
///
/// Immutable once constructed; the list it belongs to is discarded wholesale
/// when a new search begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPrediction {
    /// Human-readable place description, display only and not unique
    pub description: String,
    /// Opaque provider identifier, stable, used as the geocode lookup key
    pub place_id: String,
}

/// A latitude/longitude pair in decimal degrees
///
/// Produced by geocoding or by startup configuration; consumed by the
/// weather fetch. The provider is trusted, so no range validation happens
/// here (the CLI validates the coordinate it injects).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// Aggregated weather for one location at one point in time
///
/// Constructed exactly once per fetch by the payload parser; immutable
/// afterwards except for the `display_name` assigned by the orchestrator.
/// Superseded wholesale (never merged) by the next fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Name shown for this location; the chosen prediction's description,
    /// the stored favorite name, or [`CURRENT_LOCATION_LABEL`]
    pub display_name: String,
    /// Current temperature in Fahrenheit
    pub temperature: f64,
    /// Provider condition code for current conditions
    pub condition_code: i64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Wind speed in mph
    pub wind_speed: f64,
    /// Visibility in miles
    pub visibility: f64,
    /// Sea-level pressure in inHg
    pub pressure: f64,
    /// Cloud cover percentage
    pub cloud_cover: f64,
    /// Precipitation probability percentage
    pub precipitation_probability: f64,
    /// UV index
    pub uv_index: f64,
    /// Daily forecast in the provider's interval order
    pub forecast: Vec<ForecastDay>,
    /// When this data was fetched
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Whether this snapshot came from the device-coordinate flow.
    /// Current-location weather is not favoritable.
    pub fn is_current_location(&self) -> bool {
        self.display_name == CURRENT_LOCATION_LABEL
    }
}

/// One calendar day of the forecast
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    /// Calendar date, the date portion of the interval's ISO timestamp
    pub date: String,
    /// Provider condition code for the day
    pub condition_code: i64,
    /// Sunrise as an ISO timestamp, "N/A" when absent
    pub sunrise_time: String,
    /// Sunset as an ISO timestamp, "N/A" when absent
    pub sunset_time: String,
    /// Daily minimum temperature in Fahrenheit
    pub temp_min: f64,
    /// Daily maximum temperature in Fahrenheit
    pub temp_max: f64,
}
