//! Shared health state for the /health endpoint.
//! Updated by FeedClient after every upstream call.

use std::sync::atomic::{AtomicU64, Ordering};

/// Upstream feed counters. Written by the feed client, read by the API.
#[derive(Default)]
pub struct HealthState {
    /// Calls that returned a payload with the success marker.
    pub feed_successes: AtomicU64,
    /// Calls that degraded to empty (transport, status, or marker failure).
    pub feed_failures: AtomicU64,
    /// Unix seconds of the last successful call (0 = none).
    pub last_success_at: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, at_secs: u64) {
        self.feed_successes.fetch_add(1, Ordering::Relaxed);
        self.last_success_at.store(at_secs, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.feed_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn success_count(&self) -> u64 {
        self.feed_successes.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.feed_failures.load(Ordering::Relaxed)
    }

    pub fn last_success_at(&self) -> Option<u64> {
        match self.last_success_at.load(Ordering::Relaxed) {
            0 => None,
            ts => Some(ts),
        }
    }
}
