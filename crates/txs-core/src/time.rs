//! Simulated time model.
//!
//! # Design
//!
//! Simulated time is a `Timestamp` — integer milliseconds since the Unix
//! epoch.  An integer canonical unit keeps window arithmetic exact across
//! millions of ticks; millisecond resolution is needed because time-slice
//! widths (`windowSize × timeWarp / numSlices`) are fractional seconds.
//!
//! Wall-clock pacing (the broadcaster's backoff) deliberately does NOT use
//! this type — it works in `std::time` terms.  `Timestamp` is simulated time
//! only.

use std::fmt;

/// An absolute simulated instant, in milliseconds since the Unix epoch.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// The replay epoch the original NYC trip data streams from.
    pub const DEFAULT_EPOCH: Timestamp = Timestamp::from_unix_secs(1_451_608_160);

    #[inline]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    #[inline]
    pub const fn from_unix_secs(secs: i64) -> Self {
        Self(secs * 1_000)
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// The instant `secs` (possibly fractional) seconds after `self`.
    #[inline]
    pub fn add_secs_f64(self, secs: f64) -> Self {
        Self(self.0 + (secs * 1_000.0).round() as i64)
    }

    #[inline]
    pub fn add_millis(self, ms: i64) -> Self {
        Self(self.0 + ms)
    }

    /// Signed seconds elapsed from `earlier` to `self` (negative if `self`
    /// precedes `earlier`).
    #[inline]
    pub fn seconds_since(self, earlier: Timestamp) -> f64 {
        (self.0 - earlier.0) as f64 / 1_000.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
