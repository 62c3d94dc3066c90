//! Round-trip time of upstream feed requests, served on /api/stats/latency.

use std::sync::Mutex;
use std::time::Instant;

use hdrhistogram::Histogram;
use serde::Serialize;

/// Slowest request the histogram resolves (100s, in microseconds). Anything
/// slower is folded into the top bucket; the transport timeout is far below.
const MAX_TRACKED_US: u64 = 100_000_000;

/// Percentiles in milliseconds. Empty until the first feed request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencySnapshot {
    pub samples: u64,
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
}

pub struct FeedLatency {
    us: Mutex<Histogram<u64>>,
}

impl FeedLatency {
    pub fn new() -> Self {
        let us = Histogram::new_with_bounds(1, MAX_TRACKED_US, 3).expect("valid histogram bounds");
        Self { us: Mutex::new(us) }
    }

    /// Record one feed request that began at `started`.
    pub fn record_since(&self, started: Instant) {
        let us = u64::try_from(started.elapsed().as_micros())
            .unwrap_or(MAX_TRACKED_US)
            .clamp(1, MAX_TRACKED_US);
        if let Ok(mut h) = self.us.lock() {
            let _ = h.record(us);
        }
    }

    pub fn snapshot(&self) -> LatencySnapshot {
        let Ok(h) = self.us.lock() else {
            return LatencySnapshot::default();
        };
        if h.len() == 0 {
            return LatencySnapshot::default();
        }
        let ms = |q: f64| Some(h.value_at_quantile(q) as f64 / 1000.0);
        LatencySnapshot {
            samples: h.len(),
            p50_ms: ms(0.5),
            p95_ms: ms(0.95),
            p99_ms: ms(0.99),
        }
    }
}

impl Default for FeedLatency {
    fn default() -> Self {
        Self::new()
    }
}
