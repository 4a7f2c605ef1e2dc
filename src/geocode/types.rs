//! Geocoding types and outcomes

use crate::coord::GeoPoint;
use thiserror::Error;

/// Errors returned by a [`GeocodeClient`] implementation.
///
/// Transient variants are retried by the gateway; definitive ones are
/// surfaced after the first attempt.
///
/// [`GeocodeClient`]: super::client::GeocodeClient
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// Network-level failure (connection refused, DNS, reset).
    #[error("transport error: {0}")]
    Transport(String),
    /// The attempt exceeded its time budget.
    #[error("request timed out")]
    Timeout,
    /// Non-success HTTP status from the geocoding service.
    #[error("HTTP {status} from geocoding service")]
    Http { status: u16 },
    /// The service answered with a body the client could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Returns true if the failure is worth retrying.
    ///
    /// Server-side errors and throttling count as transient; malformed
    /// responses and client-side HTTP errors do not.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport(_) | ClientError::Timeout => true,
            ClientError::Http { status } => *status == 429 || *status >= 500,
            ClientError::InvalidResponse(_) => false,
        }
    }
}

/// Errors surfaced by the gateway after its retry budget is spent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeocodeError {
    /// All attempts failed; `last` is the final attempt's error.
    #[error("geocoding failed after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: ClientError },
    /// The in-flight request this caller was waiting on went away
    /// without broadcasting a result.
    #[error("in-flight geocode request was dropped")]
    InFlightDropped,
}

/// A raw forward-geocoding hit as returned by the external service.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPlace {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
}

/// A validated forward-geocoding result.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    /// Resolved position, validated against coordinate ranges.
    pub point: GeoPoint,
    /// Human-readable address of the place.
    pub formatted_address: String,
}

/// Result of a forward (address → coordinates) lookup.
///
/// `NoMatch` is a normal, user-visible outcome, not an error: the
/// service definitively found nothing for the query.
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardOutcome {
    /// The best hit for the query.
    Found(GeocodedPlace),
    /// The service found no place for the query.
    NoMatch,
}

/// Result of a reverse (coordinates → address) lookup.
///
/// `Unavailable` never blocks the caller: the record proceeds with a
/// placeholder address instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ReverseOutcome {
    /// The formatted address at the queried position.
    Address(String),
    /// No address could be resolved.
    Unavailable,
}

/// A cached or broadcast geocoding outcome, either direction.
///
/// The key kind determines the variant: query keys hold forward
/// outcomes, coordinate keys hold reverse outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Forward(ForwardOutcome),
    Reverse(ReverseOutcome),
}

/// Decimal places kept when normalizing coordinates into cache keys.
///
/// Six places is roughly 0.1 m of position, well below the precision a
/// reverse lookup distinguishes.
const COORD_KEY_SCALE: f64 = 1_000_000.0;

/// Normalized identity of a geocoding request.
///
/// Identical repeated queries map to the same key so they short-circuit
/// to the session cache or coalesce onto one in-flight call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Reverse lookup, coordinates rounded to six decimal places.
    Coord { lat_e6: i64, lng_e6: i64 },
    /// Forward lookup, trimmed and lower-cased query text.
    Query(String),
}

impl CacheKey {
    /// Key for a reverse lookup at the given position.
    pub fn coord(point: &GeoPoint) -> Self {
        CacheKey::Coord {
            lat_e6: (point.lat() * COORD_KEY_SCALE).round() as i64,
            lng_e6: (point.lng() * COORD_KEY_SCALE).round() as i64,
        }
    }

    /// Key for a forward lookup of the given query text.
    pub fn query(text: &str) -> Self {
        CacheKey::Query(text.trim().to_lowercase())
    }

    /// Reconstructs the canonical coordinates of a `Coord` key.
    pub fn as_coord(&self) -> Option<(f64, f64)> {
        match self {
            CacheKey::Coord { lat_e6, lng_e6 } => Some((
                *lat_e6 as f64 / COORD_KEY_SCALE,
                *lng_e6 as f64 / COORD_KEY_SCALE,
            )),
            CacheKey::Query(_) => None,
        }
    }
}
