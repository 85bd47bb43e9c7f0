use std::time::Duration;

use serde::Serialize;

/// Collects statistics for high-resolution capture requests.
///
/// Lives behind the coordinator's lock; recording must stay cheap enough to
/// call from the capture worker.
pub struct CaptureStats {
    requested: u64,
    rejected: u64,
    published: u64,
    session_aborts: u64,
    color_decode_failures: u64,
    depth_decode_failures: u64,
    depth_missing: u64,
    last_latency_us: u64,
}

/// Snapshot of capture stats for serialisation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSnapshot {
    pub requested: u64,
    pub rejected: u64,
    pub published: u64,
    pub session_aborts: u64,
    pub color_decode_failures: u64,
    pub depth_decode_failures: u64,
    pub depth_missing: u64,
    pub publish_rate: f64,
    pub last_latency_ms: f64,
}

impl CaptureStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            requested: 0,
            rejected: 0,
            published: 0,
            session_aborts: 0,
            color_decode_failures: 0,
            depth_decode_failures: 0,
            depth_missing: 0,
            last_latency_us: 0,
        }
    }

    /// Record an accepted capture request.
    pub fn record_requested(&mut self) {
        self.requested += 1;
    }

    /// Record a request rejected because one was already in flight.
    pub fn record_rejected(&mut self) {
        self.rejected += 1;
    }

    /// Record a publish and the request-to-publish latency.
    pub fn record_published(&mut self, latency: Duration) {
        self.published += 1;
        self.last_latency_us = latency.as_micros() as u64;
    }

    /// Record a capture aborted because the session delivered no frame.
    pub fn record_session_abort(&mut self) {
        self.session_aborts += 1;
    }

    /// Record a capture aborted because the color buffer failed to decode.
    pub fn record_color_decode_failure(&mut self) {
        self.color_decode_failures += 1;
    }

    /// Record a publish that lost its depth image to a decode failure.
    pub fn record_depth_decode_failure(&mut self) {
        self.depth_decode_failures += 1;
    }

    /// Record a publish with no depth buffer available at all.
    pub fn record_depth_missing(&mut self) {
        self.depth_missing += 1;
    }

    /// Share of accepted requests that ended in a publish (0.0 - 100.0).
    pub fn publish_rate(&self) -> f64 {
        if self.requested == 0 {
            return 0.0;
        }
        (self.published as f64 / self.requested as f64) * 100.0
    }

    /// Latest request-to-publish latency in milliseconds.
    pub fn last_latency_ms(&self) -> f64 {
        self.last_latency_us as f64 / 1000.0
    }

    /// Take a serialisable snapshot.
    pub fn snapshot(&self) -> CaptureSnapshot {
        CaptureSnapshot {
            requested: self.requested,
            rejected: self.rejected,
            published: self.published,
            session_aborts: self.session_aborts,
            color_decode_failures: self.color_decode_failures,
            depth_decode_failures: self.depth_decode_failures,
            depth_missing: self.depth_missing,
            publish_rate: self.publish_rate(),
            last_latency_ms: self.last_latency_ms(),
        }
    }
}

impl Default for CaptureStats {
    fn default() -> Self {
        Self::new()
    }
}
