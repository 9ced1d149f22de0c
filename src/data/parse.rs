//! Schema-tolerant weather payload parsing
//!
//! The aggregation backend relays a deeply nested provider document
//! (`data.timelines[0].intervals`) whose fields are all effectively
//! optional. Parsing never fails: a missing or mistyped field becomes its
//! documented default (0.0 for numbers, 0 for condition codes, "N/A" for
//! time strings) so a flaky provider can
//! degrade the display but never crash it.

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use super::{ForecastDay, WeatherSnapshot};

/// Convert a raw weather document into a [`WeatherSnapshot`]
///
/// `intervals[0]` supplies the current conditions; the whole interval
/// sequence supplies the forecast, in provider order. A document without
/// `data.timelines[0].intervals` yields a snapshot with all-default current
/// conditions and an empty forecast, which callers treat as "no data yet"
/// rather than an error.
pub fn parse_weather(document: &Value) -> WeatherSnapshot {
    let intervals = match document
        .pointer("/data/timelines/0/intervals")
        .and_then(Value::as_array)
    {
        Some(list) => list.as_slice(),
        None => {
            debug!("weather payload has no timeline intervals");
            &[]
        }
    };

    let current = intervals
        .first()
        .and_then(|interval| interval.get("values"))
        .unwrap_or(&Value::Null);

    let mut forecast = Vec::with_capacity(intervals.len());
    for interval in intervals {
        let Some(start_time) = interval.get("startTime").and_then(Value::as_str) else {
            debug!("forecast interval has no startTime, skipping");
            continue;
        };
        let Some(values) = interval.get("values").filter(|v| v.is_object()) else {
            debug!("forecast interval {start_time} has no values, skipping");
            continue;
        };
        forecast.push(ForecastDay {
            date: date_portion(start_time).to_string(),
            condition_code: code_field(values, "weatherCode"),
            sunrise_time: time_field(values, "sunriseTime"),
            sunset_time: time_field(values, "sunsetTime"),
            temp_min: numeric_field(values, "temperatureMin"),
            temp_max: numeric_field(values, "temperatureMax"),
        });
    }

    WeatherSnapshot {
        display_name: String::new(),
        temperature: numeric_field(current, "temperature"),
        condition_code: code_field(current, "weatherCode"),
        humidity: numeric_field(current, "humidity"),
        wind_speed: numeric_field(current, "windSpeed"),
        visibility: numeric_field(current, "visibility"),
        pressure: numeric_field(current, "pressureSeaLevel"),
        cloud_cover: numeric_field(current, "cloudCover"),
        precipitation_probability: numeric_field(current, "precipitationProbability"),
        uv_index: numeric_field(current, "uvIndex"),
        forecast,
        fetched_at: Utc::now(),
    }
}

/// Map a provider condition code to its human-readable label
///
/// Total over all inputs; any code outside the known table maps to
/// `"Unknown"`.
pub fn condition_label(code: i64) -> &'static str {
    match code {
        1000 => "Clear",
        1001 => "Cloudy",
        1100 => "Mostly Clear",
        1101 => "Partly Cloudy",
        1102 => "Mostly Cloudy",
        2000 => "Fog",
        2100 => "Light Fog",
        4000 => "Drizzle",
        4001 => "Rain",
        4200 => "Light Rain",
        4201 => "Heavy Rain",
        5000 => "Snow",
        5001 => "Flurries",
        5100 => "Light Snow",
        5101 => "Heavy Snow",
        6000 => "Freezing Drizzle",
        6001 => "Freezing Rain",
        6200 => "Light Freezing Rain",
        6201 => "Heavy Freezing Rain",
        7000 => "Ice Pellets",
        7101 => "Heavy Ice Pellets",
        7102 => "Light Ice Pellets",
        8000 => "Thunderstorm",
        _ => "Unknown",
    }
}

/// Extract the calendar date from an ISO timestamp
/// (e.g., "2024-03-15T08:00:00Z" -> "2024-03-15")
fn date_portion(timestamp: &str) -> &str {
    match timestamp.split_once('T') {
        Some((date, _)) => date,
        None => timestamp,
    }
}

/// Numeric field with a 0.0 default; absent and mistyped are equivalent
fn numeric_field(values: &Value, key: &str) -> f64 {
    match values.get(key).and_then(Value::as_f64) {
        Some(number) => number,
        None => {
            debug!("field {key} missing or not numeric, defaulting to 0");
            0.0
        }
    }
}

/// Condition-code field with a 0 default; accepts integral or float JSON
/// numbers since the provider is not consistent about it
fn code_field(values: &Value, key: &str) -> i64 {
    let code = values
        .get(key)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)));
    match code {
        Some(code) => code,
        None => {
            debug!("field {key} missing or not a code, defaulting to 0");
            0
        }
    }
}

/// Time-string field with an "N/A" default
fn time_field(values: &Value, key: &str) -> String {
    match values.get(key).and_then(Value::as_str) {
        Some(time) => time.to_string(),
        None => {
            debug!("field {key} missing or not a string, defaulting to N/A");
            "N/A".to_string()
        }
    }
}
