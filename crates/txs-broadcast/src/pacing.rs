//! Adaptive send pacing.
//!
//! The broadcaster measures the wall-clock gap between consecutive sends and
//! keeps a sliding window of them in a [`GapRing`].  A proportional
//! controller turns the latest gap into the next backoff: falling behind the
//! target rate shrinks the backoff toward zero, racing ahead grows it.

/// Fixed-capacity circular buffer of inter-send gaps, in seconds.
///
/// `clear()` resets the indices in place; the slot storage is allocated once.
pub struct GapRing {
    slots: Box<[f64]>,
    head:  usize,
    len:   usize,
}

impl GapRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![0.0; capacity].into_boxed_slice(),
            head:  0,
            len:   0,
        }
    }

    /// Record one gap, overwriting the oldest once full.
    pub fn record(&mut self, gap_secs: f64) {
        self.slots[self.head] = gap_secs;
        self.head = (self.head + 1) % self.slots.len();
        self.len = (self.len + 1).min(self.slots.len());
    }

    /// Mean of the recorded gaps; `None` while empty.
    pub fn mean(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        // With len < capacity the live entries are exactly slots[..len]
        // (head has not wrapped); once full, all slots are live.
        Some(self.slots[..self.len].iter().sum::<f64>() / self.len as f64)
    }

    /// Forget all recorded gaps without reallocating.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Proportional backoff controller owned by the consumer task.
pub struct PacingController {
    ring:         GapRing,
    backoff_secs: f64,
    target_rate:  f64,
}

impl PacingController {
    pub fn new(target_rate: f64, ring_capacity: usize) -> Self {
        Self {
            ring:         GapRing::new(ring_capacity),
            backoff_secs: 1.0 / target_rate,
            target_rate,
        }
    }

    /// Record the gap since the previous send and recompute the backoff.
    ///
    /// `effective` is the part of the gap not spent sleeping; the update
    /// steers it toward the target period `1/target_rate`.
    pub fn record_send(&mut self, gap_secs: f64) {
        self.ring.record(gap_secs);
        let effective = gap_secs - self.backoff_secs;
        self.backoff_secs = (1.0 - effective * self.target_rate) / self.target_rate;
    }

    /// The queue drained: start the next burst from the target period and
    /// drop the stale gap history.
    pub fn on_drained(&mut self) {
        self.backoff_secs = 1.0 / self.target_rate;
        self.ring.clear();
    }

    /// Seconds to sleep before the next dequeue (never negative).
    #[inline]
    pub fn sleep_secs(&self) -> f64 {
        self.backoff_secs.max(0.0)
    }

    /// Measured delivery rate over the ring window, if any sends were
    /// recorded.
    pub fn measured_rate(&self) -> Option<f64> {
        match self.ring.mean() {
            Some(mean) if mean > 0.0 => Some(1.0 / mean),
            _ => None,
        }
    }
}
