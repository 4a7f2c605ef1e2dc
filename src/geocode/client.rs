//! Geocoding client abstraction for testability

use super::types::{ClientError, RawPlace};
use std::future::Future;

/// Trait for external geocoding service calls.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock clients in tests. An empty result list is a valid,
/// non-error answer in both directions.
pub trait GeocodeClient: Send + Sync {
    /// Resolves free-form address text to candidate places.
    ///
    /// # Arguments
    ///
    /// * `query` - The address or place text to look up
    ///
    /// # Returns
    ///
    /// Candidate places, best match first. Empty means "nothing found".
    fn forward(&self, query: &str) -> impl Future<Output = Result<Vec<RawPlace>, ClientError>> + Send;

    /// Resolves coordinates to formatted addresses.
    ///
    /// # Arguments
    ///
    /// * `lat` - Latitude in degrees
    /// * `lng` - Longitude in degrees
    ///
    /// # Returns
    ///
    /// Formatted addresses, best match first. Empty means "no address".
    fn reverse(&self, lat: f64, lng: f64) -> impl Future<Output = Result<Vec<String>, ClientError>> + Send;
}
