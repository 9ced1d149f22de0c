//! Backend aggregation API client
//!
//! Three independent operations against the backend service: free-text
//! autocomplete, place-id geocoding, and the raw weather fetch. Each is a
//! single GET with no retries; a failed attempt surfaces immediately.
//! The [`WeatherApi`] trait is the seam the orchestrator sees, so tests can
//! substitute a fake without any network.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::{Coordinate, LocationPrediction};

/// Base URL for the backend aggregation service
const DEFAULT_BASE_URL: &str = "https://skycast-backend.appspot.com/api";

/// Per-request timeout; a stuck backend must not pin the spinner forever
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when talking to the backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request URL could not be constructed; a local programming fault
    #[error("Malformed request URL: {0}")]
    MalformedUrl(String),

    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Response arrived with an unacceptable status
    #[error("Unexpected response status: {0}")]
    Status(StatusCode),

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The three resolution operations the orchestrator depends on
///
/// Implemented by [`ApiClient`] for production and by an in-memory fake in
/// tests.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Look up candidate places for free-text input
    ///
    /// Callers must not send an empty query; the debounce layer guarantees
    /// this. Status is checked at transport level only: an error body that
    /// fails to match the predictions envelope surfaces as [`ApiError::Decode`].
    async fn autocomplete(&self, query: &str) -> Result<Vec<LocationPrediction>, ApiError>;

    /// Resolve a prediction's place id to a coordinate
    ///
    /// Strict about status: anything other than 200 is [`ApiError::Status`].
    async fn geocode(&self, place_id: &str) -> Result<Coordinate, ApiError>;

    /// Fetch the raw weather document for a coordinate
    ///
    /// Fails only on transport problems. The body is handed to the payload
    /// parser as-is; a body that is not JSON at all becomes `Value::Null`,
    /// which parses to an all-default snapshot.
    async fn fetch_weather(&self, coordinate: Coordinate) -> Result<Value, ApiError>;
}

/// Envelope around the autocomplete response
#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    predictions: Vec<LocationPrediction>,
}

/// Reqwest-backed client for the backend aggregation service
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: Client,
    /// Base URL for the API (allows override for testing or self-hosting)
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Creates a client against the default backend
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Creates a client against a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Parse and dispatch a GET, with the timeout applied
    async fn get(&self, raw_url: String) -> Result<reqwest::Response, ApiError> {
        let url = Url::parse(&raw_url).map_err(|_| ApiError::MalformedUrl(raw_url.clone()))?;
        debug!("GET {url}");
        let response = self
            .http_client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl WeatherApi for ApiClient {
    async fn autocomplete(&self, query: &str) -> Result<Vec<LocationPrediction>, ApiError> {
        let url = format!(
            "{}/autocomplete?input={}",
            self.base_url,
            urlencoding::encode(query)
        );
        let response = self.get(url).await?;
        let text = response.text().await?;
        let decoded: AutocompleteResponse = serde_json::from_str(&text)?;
        Ok(decoded.predictions)
    }

    async fn geocode(&self, place_id: &str) -> Result<Coordinate, ApiError> {
        let url = format!(
            "{}/geocode?place_id={}",
            self.base_url,
            urlencoding::encode(place_id)
        );
        let response = self.get(url).await?;
        if response.status() != StatusCode::OK {
            return Err(ApiError::Status(response.status()));
        }
        let text = response.text().await?;
        let coordinate: Coordinate = serde_json::from_str(&text)?;
        Ok(coordinate)
    }

    async fn fetch_weather(&self, coordinate: Coordinate) -> Result<Value, ApiError> {
        let url = format!(
            "{}/weather?latitude={}&longitude={}",
            self.base_url, coordinate.latitude, coordinate.longitude
        );
        let response = self.get(url).await?;
        let text = response.text().await?;
        let document = serde_json::from_str(&text).unwrap_or_else(|err| {
            debug!("weather body was not JSON ({err}), parser will default everything");
            Value::Null
        });
        Ok(document)
    }
}
