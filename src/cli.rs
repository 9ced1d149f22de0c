//! Command-line interface parsing for Skycast
//!
//! This module handles parsing of CLI arguments using clap, including the
//! --location flag that injects a device coordinate and the --city flag
//! that fetches a city immediately on startup.

use clap::Parser;
use thiserror::Error;

use crate::data::Coordinate;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The --location value is not a valid "LAT,LON" pair
    #[error("Invalid location: '{0}'. Expected 'LAT,LON' with latitude in [-90, 90] and longitude in [-180, 180]")]
    InvalidLocation(String),
}

/// Skycast - City weather search in the terminal
#[derive(Parser, Debug)]
#[command(name = "skycast")]
#[command(about = "Search cities and view current weather and forecasts")]
#[command(version)]
pub struct Cli {
    /// Coordinate to use as the device location
    ///
    /// Examples:
    ///   skycast --location 47.6062,-122.3321
    ///
    /// With this set, Ctrl-L on the search screen fetches weather for the
    /// coordinate directly, shown as "Current Location".
    #[arg(long, value_name = "LAT,LON")]
    pub location: Option<String>,

    /// City to fetch immediately on startup
    ///
    /// Examples:
    ///   skycast --city "Seattle"
    ///
    /// Takes precedence over --location for the startup fetch.
    #[arg(long, value_name = "NAME")]
    pub city: Option<String>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// Coordinate standing in for the device GPS fix (if specified)
    pub device_location: Option<Coordinate>,
    /// City to fetch on startup (if specified)
    pub initial_city: Option<String>,
}

/// Parses a "LAT,LON" string argument into a Coordinate.
///
/// # Arguments
/// * `s` - The location string from CLI
///
/// # Returns
/// * `Ok(Coordinate)` if the string is a valid, in-range pair
/// * `Err(CliError::InvalidLocation)` otherwise
pub fn parse_location_arg(s: &str) -> Result<Coordinate, CliError> {
    let invalid = || CliError::InvalidLocation(s.to_string());
    let (lat_str, lon_str) = s.split_once(',').ok_or_else(invalid)?;
    let latitude: f64 = lat_str.trim().parse().map_err(|_| invalid())?;
    let longitude: f64 = lon_str.trim().parse().map_err(|_| invalid())?;
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(invalid());
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(invalid());
    }
    Ok(Coordinate {
        latitude,
        longitude,
    })
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if an invalid location was specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let device_location = match &cli.location {
            None => None,
            Some(raw) => Some(parse_location_arg(raw)?),
        };
        Ok(StartupConfig {
            device_location,
            initial_city: cli.city.clone(),
        })
    }
}
