//! Geocoding gateway
//!
//! The directory's sole asynchronous boundary: forward and reverse
//! geocoding against an external service, with a session cache,
//! in-flight request coalescing, bounded retry with exponential
//! backoff, and sequence tokens for discarding stale results.

mod cache;
mod client;
mod coalesce;
mod gateway;
mod nominatim;
mod seq;
mod types;

pub use cache::{CacheStats, GeocodeCache};
#[cfg(test)]
pub use client::tests::MockGeocodeClient;
pub use client::GeocodeClient;
pub use coalesce::{CoalescingStats, GeocodeReply, InFlightTable, Registration};
pub use gateway::{GatewayStats, GeocodingGateway};
pub use nominatim::NominatimClient;
pub use seq::{SeqCounter, SeqToken};
pub use types::{
    CacheKey, ClientError, ForwardOutcome, GeocodeError, GeocodeOutcome, GeocodedPlace, RawPlace,
    ReverseOutcome,
};
