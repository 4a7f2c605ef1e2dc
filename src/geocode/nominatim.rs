//! OSM Nominatim geocoding client

use super::client::GeocodeClient;
use super::types::{ClientError, RawPlace};
use serde::Deserialize;
use std::time::Duration;

/// Default Nominatim instance.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim requires an identifying User-Agent.
const USER_AGENT: &str = concat!("geomark/", env!("CARGO_PKG_VERSION"));

/// Candidates requested per forward lookup; the gateway only uses the
/// best one but a small margin helps diagnostics.
const FORWARD_LIMIT: u8 = 5;

/// Geocoding client backed by the OSM Nominatim HTTP API.
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    /// Creates a client with default configuration.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// Creates a client against a custom base URL.
    ///
    /// Useful for testing or self-hosted Nominatim instances.
    pub fn with_base_url(base_url: String) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("JSON parse failed: {}", e)))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Transport(e.to_string())
    }
}

/// One hit of a `/search` response. Nominatim serializes coordinates
/// as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

/// A `/reverse` response: either a resolved place or an error object
/// ("Unable to geocode"), which maps to an empty, non-error answer.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    error: Option<String>,
}

fn parse_coordinate(text: &str) -> Result<f64, ClientError> {
    text.parse::<f64>()
        .map_err(|_| ClientError::InvalidResponse(format!("bad coordinate: {:?}", text)))
}

impl GeocodeClient for NominatimClient {
    async fn forward(&self, query: &str) -> Result<Vec<RawPlace>, ClientError> {
        let hits: Vec<SearchHit> = self
            .get_json(
                "/search",
                &[
                    ("q", query.to_string()),
                    ("format", "jsonv2".to_string()),
                    ("limit", FORWARD_LIMIT.to_string()),
                ],
            )
            .await?;

        hits.into_iter()
            .map(|hit| {
                Ok(RawPlace {
                    lat: parse_coordinate(&hit.lat)?,
                    lng: parse_coordinate(&hit.lon)?,
                    formatted_address: hit.display_name,
                })
            })
            .collect()
    }

    async fn reverse(&self, lat: f64, lng: f64) -> Result<Vec<String>, ClientError> {
        let response: ReverseResponse = self
            .get_json(
                "/reverse",
                &[
                    ("lat", lat.to_string()),
                    ("lon", lng.to_string()),
                    ("format", "jsonv2".to_string()),
                ],
            )
            .await?;

        match (response.display_name, response.error) {
            (Some(address), _) => Ok(vec![address]),
            (None, Some(_)) => Ok(Vec::new()),
            (None, None) => Err(ClientError::InvalidResponse(
                "reverse response had neither display_name nor error".to_string(),
            )),
        }
    }
}
