//! The trackpoint generator: one `tick()` per timer period.
//!
//! Each tick queries the store for movements overlapping the window, merges
//! them into the active set, then walks fixed-width time slices across the
//! window emitting events per movement in a fixed order: occupancy and
//! destination at pickup, completion at dropoff, probabilistic reservations
//! while unoccupied, and interpolated position fixes in between.  The output
//! list is padded up to the per-window update count by repeating a uniformly
//! spaced subset of itself.

use tracing::{debug, trace};

use txs_core::config::StreamConfig;
use txs_core::event::UpdateEvent;
use txs_core::rng::StreamRng;
use txs_core::time::Timestamp;
use txs_store::RouteStore;

use crate::active::ActiveRouteSet;
use crate::error::ReplayResult;
use crate::window::ReplayWindow;

/// Generates ordered update events from stored movements, tick by tick.
pub struct TrackpointGenerator {
    window:         ReplayWindow,
    active:         ActiveRouteSet,
    rng:            StreamRng,
    activity_floor: usize,
    updates_per_window: usize,
    reservation_interval_secs: f64,
}

impl TrackpointGenerator {
    pub fn new(config: &StreamConfig, rng: StreamRng) -> Self {
        Self {
            window: ReplayWindow::new(config.epoch_start, config.window_span_secs()),
            active: ActiveRouteSet::new(),
            rng,
            activity_floor: config.activity_floor(),
            updates_per_window: config.updates_per_window(),
            reservation_interval_secs: config.reservation_interval_secs,
        }
    }

    #[inline]
    pub fn window(&self) -> &ReplayWindow {
        &self.window
    }

    #[inline]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Run one tick: refresh the active set, synthesize this window's events,
    /// advance the window.
    ///
    /// A cold start (active set at or below the floor) resets the window to
    /// the epoch and yields no events; the window does not advance.  A store
    /// failure also leaves the window in place so the same span is retried.
    pub fn tick(&mut self, store: &dyn RouteStore) -> ReplayResult<Vec<UpdateEvent>> {
        let known = self.active.known_ids();
        let fresh = store.query_window(self.window.start(), self.window.end(), &known)?;
        self.active.merge(fresh);
        let evicted = self.active.evict_before(self.window.start());

        trace!(
            active = self.active.len(),
            evicted,
            window_start = %self.window.start(),
            "tick refresh"
        );

        if self.active.len() <= self.activity_floor {
            debug!(
                active = self.active.len(),
                floor = self.activity_floor,
                "active set below floor; cold-start window reset"
            );
            self.window.reset();
            return Ok(Vec::new());
        }

        let mut events = self.synthesize();
        pad_with_subset(&mut events, self.updates_per_window);

        self.window.advance();
        Ok(events)
    }

    /// Walk time slices across the window, appending events for each active
    /// movement in insertion order.
    fn synthesize(&mut self) -> Vec<UpdateEvent> {
        let active_len = self.active.len();
        // The slice count is fractional (5000 updates over 300 routes is
        // ~16.7 slices, not 16): the width comes from the ratio and the walk
        // stops at the window end.
        let slice_ratio = (self.updates_per_window as f64 / active_len as f64).max(1.0);
        let slice_secs = self.window.span_secs() / slice_ratio;
        let reservation_p =
            slice_secs / (self.reservation_interval_secs * active_len as f64);

        let window_start = self.window.start();
        let window_end = self.window.end();

        let mut events = Vec::with_capacity(self.updates_per_window);
        let mut index: u32 = 0;
        loop {
            let slice_start = window_start.add_secs_f64(index as f64 * slice_secs);
            if slice_start >= window_end {
                break;
            }
            // The final slice is clamped: an instant at or past the window
            // end belongs to the next window's first slice.
            let slice_end = window_start
                .add_secs_f64((index + 1) as f64 * slice_secs)
                .min(window_end);
            index += 1;

            for entry in self.active.iter_mut() {
                let m = &entry.stored.movement;

                if !entry.announced && in_slice(m.pickup_time, slice_start, slice_end) {
                    entry.announced = true;
                    events.push(UpdateEvent::occupancy(m));
                    events.push(UpdateEvent::destination(m));
                }

                if !entry.completed && in_slice(m.dropoff_time, slice_start, slice_end) {
                    entry.completed = true;
                    entry.reserved = false;
                    events.push(UpdateEvent::route_completed(m));
                }

                if m.passenger_count == 0
                    && !entry.reserved
                    && self.rng.gen_bool(reservation_p)
                {
                    entry.reserved = true;
                    events.push(UpdateEvent::reservation(m));
                }

                let frac = m.elapsed_fraction(slice_start);
                if frac > 0.0 && frac < 1.0 {
                    if let Some(pos) = m.path.point_at_fraction(frac) {
                        events.push(UpdateEvent::location(m, pos, entry.reserved));
                    }
                }
            }
        }
        events
    }
}

/// Membership of an instant in the half-open slice `[start, end)`.
#[inline]
fn in_slice(t: Timestamp, start: Timestamp, end: Timestamp) -> bool {
    start <= t && t < end
}

/// Grow `events` to `target` by repeating a uniformly spaced subset of the
/// original list, preserving relative order, looping passes until full.
pub(crate) fn pad_with_subset(events: &mut Vec<UpdateEvent>, target: usize) {
    let original = events.len();
    if original == 0 || original >= target {
        return;
    }
    while events.len() < target {
        let missing = target - events.len();
        let take = missing.min(original);
        let stride = original / take;

        let mut i = 0;
        while i < original && events.len() < target {
            let repeat = events[i].clone();
            events.push(repeat);
            i += stride;
        }
    }
}
