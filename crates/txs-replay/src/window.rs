//! The sliding replay window.

use txs_core::time::Timestamp;

/// A half-open simulated-time range `[start, end)` that slides forward by its
/// own span each tick, and snaps back to the epoch on a cold start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReplayWindow {
    epoch:     Timestamp,
    start:     Timestamp,
    span_secs: f64,
}

impl ReplayWindow {
    pub fn new(epoch: Timestamp, span_secs: f64) -> Self {
        Self { epoch, start: epoch, span_secs }
    }

    #[inline]
    pub fn start(&self) -> Timestamp {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Timestamp {
        self.start.add_secs_f64(self.span_secs)
    }

    #[inline]
    pub fn span_secs(&self) -> f64 {
        self.span_secs
    }

    /// Slide forward by one span.
    pub fn advance(&mut self) {
        self.start = self.end();
    }

    /// Snap back to the epoch (cold-start guard).
    pub fn reset(&mut self) {
        self.start = self.epoch;
    }
}
