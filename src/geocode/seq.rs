//! Sequence tokens for stale-result disregard.
//!
//! Cancellation of geocoding interest is cooperative: nothing aborts an
//! in-flight external call. Instead each logical caller issues a fresh
//! token per request, and a resolution is only applied if its token is
//! still the newest one issued. A late-arriving stale response is
//! discarded rather than overwriting newer state.

use std::sync::atomic::{AtomicU64, Ordering};

/// A token identifying one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SeqToken(u64);

/// Monotonically increasing token issuer for one logical caller.
#[derive(Debug, Default)]
pub struct SeqCounter {
    issued: AtomicU64,
}

impl SeqCounter {
    /// Creates a counter with no tokens issued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next token, superseding all earlier ones.
    pub fn issue(&self) -> SeqToken {
        SeqToken(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns true if no newer token has been issued since `token`.
    pub fn is_current(&self, token: SeqToken) -> bool {
        token.0 == self.issued.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_token_is_current() {
        let counter = SeqCounter::new();
        let token = counter.issue();
        assert!(counter.is_current(token));
    }

    #[test]
    fn test_newer_token_supersedes_older() {
        let counter = SeqCounter::new();
        let stale = counter.issue();
        let fresh = counter.issue();
        assert!(!counter.is_current(stale));
        assert!(counter.is_current(fresh));
    }

    #[test]
    fn test_tokens_are_ordered() {
        let counter = SeqCounter::new();
        let a = counter.issue();
        let b = counter.issue();
        assert!(a < b);
    }
}
