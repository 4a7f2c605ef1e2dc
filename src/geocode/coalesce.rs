//! In-flight request coalescing.
//!
//! When several callers ask for the same normalized key before the
//! first answer arrives, only one external call runs. The first caller
//! becomes the leader and performs the lookup; followers subscribe to a
//! broadcast channel and receive the leader's result (or its failure).
//!
//! Uses `DashMap` for lock-free concurrent registration and atomic
//! counters for statistics.

use super::types::{CacheKey, GeocodeError, GeocodeOutcome};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// The value broadcast to coalesced waiters.
pub type GeocodeReply = Result<GeocodeOutcome, GeocodeError>;

/// Typical fan-in for one key is small; 16 leaves headroom.
const CHANNEL_CAPACITY: usize = 16;

/// Outcome of registering interest in a key.
pub enum Registration {
    /// First request for this key; the caller must perform the lookup
    /// and call [`InFlightTable::complete`] with the result.
    Leader {
        key: CacheKey,
        /// Held so the channel stays open while the leader works.
        _sender: broadcast::Sender<GeocodeReply>,
    },
    /// A lookup for this key is already running; wait on the receiver.
    Follower(broadcast::Receiver<GeocodeReply>),
}

impl Registration {
    /// Returns true if this registration must perform the lookup.
    pub fn is_leader(&self) -> bool {
        matches!(self, Registration::Leader { .. })
    }
}

/// Coalescing statistics snapshot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoalescingStats {
    /// Total registrations received.
    pub total_requests: u64,
    /// Registrations that waited on an existing lookup.
    pub coalesced_requests: u64,
    /// Registrations that triggered a new lookup.
    pub new_requests: u64,
}

impl CoalescingStats {
    /// Share of requests answered without a new external call.
    pub fn coalescing_ratio(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.coalesced_requests as f64 / self.total_requests as f64
        }
    }
}

/// Tracks in-flight geocoding requests by normalized key.
#[derive(Debug, Default)]
pub struct InFlightTable {
    in_flight: DashMap<CacheKey, broadcast::Sender<GeocodeReply>>,
    total_requests: AtomicU64,
    coalesced_requests: AtomicU64,
    new_requests: AtomicU64,
}

impl InFlightTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in a key.
    ///
    /// The entry API makes check-and-insert atomic, so exactly one
    /// caller becomes the leader even under concurrent registration.
    pub fn register(&self, key: CacheKey) -> Registration {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        match self.in_flight.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                let rx = entry.get().subscribe();
                self.coalesced_requests.fetch_add(1, Ordering::Relaxed);
                debug!(key = ?key, "coalescing onto in-flight geocode request");
                Registration::Follower(rx)
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
                entry.insert(tx.clone());
                self.new_requests.fetch_add(1, Ordering::Relaxed);
                Registration::Leader { key, _sender: tx }
            }
        }
    }

    /// Completes a lookup, broadcasting the reply to all waiters and
    /// clearing the in-flight entry.
    pub fn complete(&self, key: &CacheKey, reply: GeocodeReply) {
        if let Some((_, tx)) = self.in_flight.remove(key) {
            let waiters = tx.receiver_count();
            // Send errors only mean every follower already gave up.
            let _ = tx.send(reply);
            if waiters > 0 {
                debug!(key = ?key, waiters, "broadcast geocode result to waiters");
            }
        }
    }

    /// Number of keys currently being looked up.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> CoalescingStats {
        CoalescingStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            coalesced_requests: self.coalesced_requests.load(Ordering::Relaxed),
            new_requests: self.new_requests.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::types::ReverseOutcome;
    use std::sync::Arc;

    fn key() -> CacheKey {
        CacheKey::query("taipei station")
    }

    fn reply() -> GeocodeReply {
        Ok(GeocodeOutcome::Reverse(ReverseOutcome::Address(
            "somewhere".to_string(),
        )))
    }

    #[tokio::test]
    async fn test_first_registration_is_leader() {
        let table = InFlightTable::new();
        assert!(table.register(key()).is_leader());
        assert_eq!(table.in_flight_count(), 1);
    }

    #[tokio::test]
    async fn test_second_registration_is_follower() {
        let table = InFlightTable::new();
        let _leader = table.register(key());
        assert!(!table.register(key()).is_leader());
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_coalesce() {
        let table = InFlightTable::new();
        assert!(table.register(CacheKey::query("a")).is_leader());
        assert!(table.register(CacheKey::query("b")).is_leader());
    }

    #[tokio::test]
    async fn test_followers_receive_leader_reply() {
        let table = Arc::new(InFlightTable::new());
        let _leader = table.register(key());

        let followers: Vec<_> = (0..3).map(|_| table.register(key())).collect();
        table.complete(&key(), reply());

        for follower in followers {
            match follower {
                Registration::Follower(mut rx) => {
                    assert_eq!(rx.recv().await.unwrap(), reply());
                }
                Registration::Leader { .. } => panic!("expected follower"),
            }
        }
    }

    #[tokio::test]
    async fn test_completion_clears_in_flight() {
        let table = InFlightTable::new();
        let _leader = table.register(key());
        table.complete(&key(), reply());
        assert_eq!(table.in_flight_count(), 0);
        // The next registration leads again.
        assert!(table.register(key()).is_leader());
    }

    #[tokio::test]
    async fn test_failure_is_broadcast_too() {
        let table = InFlightTable::new();
        let _leader = table.register(key());
        let follower = table.register(key());

        table.complete(
            &key(),
            Err(GeocodeError::Exhausted {
                attempts: 3,
                last: crate::geocode::types::ClientError::Timeout,
            }),
        );

        if let Registration::Follower(mut rx) = follower {
            assert!(rx.recv().await.unwrap().is_err());
        } else {
            panic!("expected follower");
        }
    }

    #[tokio::test]
    async fn test_concurrent_registration_single_leader() {
        let table = Arc::new(InFlightTable::new());
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let t = Arc::clone(&table);
                tokio::spawn(async move { t.register(key()).is_leader() })
            })
            .collect();

        let leaders = futures::future::join_all(handles)
            .await
            .into_iter()
            .filter(|r| *r.as_ref().unwrap())
            .count();
        assert_eq!(leaders, 1);

        let stats = table.stats();
        assert_eq!(stats.total_requests, 10);
        assert_eq!(stats.new_requests, 1);
        assert_eq!(stats.coalesced_requests, 9);
        assert!((stats.coalescing_ratio() - 0.9).abs() < 1e-9);
    }
}
