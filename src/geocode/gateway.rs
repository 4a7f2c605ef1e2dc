//! Geocoding gateway.
//!
//! Wraps a [`GeocodeClient`] with the session cache, in-flight request
//! coalescing, and retry with bounded exponential backoff. This is the
//! directory's only asynchronous boundary.
//!
//! A definitive empty answer from the service ("nothing found") is a
//! successful outcome and is never retried; only transport-level
//! failures consume the retry budget.

use super::cache::{CacheStats, GeocodeCache};
use super::client::GeocodeClient;
use super::coalesce::{CoalescingStats, GeocodeReply, InFlightTable, Registration};
use super::types::{
    CacheKey, ClientError, ForwardOutcome, GeocodeError, GeocodeOutcome, GeocodedPlace,
    ReverseOutcome,
};
use crate::config::GeocodeConfig;
use crate::coord::GeoPoint;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Combined gateway statistics.
#[derive(Debug, Clone)]
pub struct GatewayStats {
    pub cache: CacheStats,
    pub coalescing: CoalescingStats,
}

/// Caching, coalescing, retrying front to an external geocoding service.
pub struct GeocodingGateway<C> {
    client: C,
    config: GeocodeConfig,
    cache: GeocodeCache,
    in_flight: InFlightTable,
}

impl<C: GeocodeClient> GeocodingGateway<C> {
    /// Creates a gateway over the given client.
    pub fn new(client: C, config: GeocodeConfig) -> Self {
        Self {
            client,
            config,
            cache: GeocodeCache::new(),
            in_flight: InFlightTable::new(),
        }
    }

    /// Resolves address text to a place.
    ///
    /// Returns [`ForwardOutcome::NoMatch`] when the service definitively
    /// finds nothing; errors only after the retry budget is exhausted.
    pub async fn forward(&self, query: &str) -> Result<ForwardOutcome, GeocodeError> {
        if query.trim().is_empty() {
            return Ok(ForwardOutcome::NoMatch);
        }

        let key = CacheKey::query(query);
        match self.resolve(key).await? {
            GeocodeOutcome::Forward(outcome) => Ok(outcome),
            // A query key never stores a reverse outcome.
            GeocodeOutcome::Reverse(_) => Ok(ForwardOutcome::NoMatch),
        }
    }

    /// Resolves coordinates to an address.
    ///
    /// Never errors: an exhausted retry budget collapses to
    /// [`ReverseOutcome::Unavailable`] so the caller's flow proceeds
    /// with a placeholder address.
    pub async fn reverse(&self, point: &GeoPoint) -> ReverseOutcome {
        let key = CacheKey::coord(point);
        match self.resolve(key).await {
            Ok(GeocodeOutcome::Reverse(outcome)) => outcome,
            // A coordinate key never stores a forward outcome.
            Ok(GeocodeOutcome::Forward(_)) => ReverseOutcome::Unavailable,
            Err(error) => {
                warn!(point = %point, %error, "reverse geocode unavailable");
                ReverseOutcome::Unavailable
            }
        }
    }

    /// Returns a snapshot of cache and coalescing statistics.
    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            cache: self.cache.stats(),
            coalescing: self.in_flight.stats(),
        }
    }

    /// Cache-then-coalesce-then-fetch resolution for one key.
    async fn resolve(&self, key: CacheKey) -> GeocodeReply {
        if let Some(outcome) = self.cache.get(&key) {
            debug!(key = ?key, "geocode cache hit");
            return Ok(outcome);
        }

        match self.in_flight.register(key) {
            Registration::Follower(mut rx) => rx
                .recv()
                .await
                .map_err(|_| GeocodeError::InFlightDropped)?,
            Registration::Leader { key, _sender } => {
                let reply = self.fetch(&key).await;
                if let Ok(outcome) = &reply {
                    self.cache.insert(key.clone(), outcome.clone());
                }
                self.in_flight.complete(&key, reply.clone());
                reply
            }
        }
    }

    /// Runs attempts with per-attempt timeout and exponential backoff.
    async fn fetch(&self, key: &CacheKey) -> GeocodeReply {
        let max_attempts = self.config.max_attempts.max(1);
        let mut backoff = self.config.base_backoff;

        for attempt in 1..=max_attempts {
            let result = match timeout(self.config.attempt_timeout, self.attempt(key)).await {
                Ok(result) => result,
                Err(_) => Err(ClientError::Timeout),
            };

            match result {
                Ok(outcome) => return Ok(outcome),
                Err(error) if error.is_transient() && attempt < max_attempts => {
                    debug!(key = ?key, attempt, %error, "transient geocode failure, retrying");
                    sleep(backoff).await;
                    backoff = (backoff * 2).min(self.config.max_backoff);
                }
                Err(error) => {
                    warn!(key = ?key, attempt, %error, "geocode request failed");
                    return Err(GeocodeError::Exhausted {
                        attempts: attempt,
                        last: error,
                    });
                }
            }
        }

        // The loop always returns; max_attempts is at least one.
        Err(GeocodeError::Exhausted {
            attempts: max_attempts,
            last: ClientError::Timeout,
        })
    }

    /// One external call, mapped to a domain outcome.
    async fn attempt(&self, key: &CacheKey) -> Result<GeocodeOutcome, ClientError> {
        match key {
            CacheKey::Query(query) => {
                let places = self.client.forward(query).await?;
                let outcome = match places.into_iter().next() {
                    Some(raw) => {
                        let point = GeoPoint::new(raw.lat, raw.lng).map_err(|e| {
                            ClientError::InvalidResponse(format!(
                                "service returned out-of-range place: {}",
                                e
                            ))
                        })?;
                        ForwardOutcome::Found(GeocodedPlace {
                            point,
                            formatted_address: raw.formatted_address,
                        })
                    }
                    None => ForwardOutcome::NoMatch,
                };
                Ok(GeocodeOutcome::Forward(outcome))
            }
            CacheKey::Coord { .. } => {
                let (lat, lng) = key.as_coord().unwrap_or((0.0, 0.0));
                let addresses = self.client.reverse(lat, lng).await?;
                let outcome = match addresses.into_iter().next() {
                    Some(address) => ReverseOutcome::Address(address),
                    None => ReverseOutcome::Unavailable,
                };
                Ok(GeocodeOutcome::Reverse(outcome))
            }
        }
    }
}
