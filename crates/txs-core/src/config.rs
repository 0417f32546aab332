//! Pipeline configuration.
//!
//! Typically deserialized from a TOML/JSON file by the application and passed
//! to each component at construction.  All rate/size parameters are validated
//! once at startup — zero or negative values must never reach a division
//! inside the tick loop.

use crate::error::{CoreError, CoreResult};
use crate::time::Timestamp;

/// Top-level configuration shared across the pipeline.
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Number of vehicles in the dispatch fleet.
    pub fleet_size: u32,

    /// Assumed average vehicle speed in metres per second, used for
    /// reachability checks and repositioning drive-time estimates.
    pub vehicle_speed_mps: f64,

    /// Target delivery rate in events per wall-clock second.
    pub target_rate: f64,

    /// Generator tick period in wall-clock seconds.
    pub window_size_secs: f64,

    /// Multiplier compressing/expanding simulated seconds relative to
    /// wall-clock seconds.  Each tick replays `window_size_secs × time_warp`
    /// simulated seconds.
    pub time_warp: f64,

    /// Simulated instant the replay window starts (and resets) to.
    pub epoch_start: Timestamp,

    /// Cold-start guard: synthesis is skipped while the active route set is
    /// no larger than `fleet_size × activity_fraction`.
    pub activity_fraction: f64,

    /// Expected simulated seconds between reservation events across the whole
    /// active set (heuristic, tunable).
    pub reservation_interval_secs: f64,

    /// Capacity of the broadcaster's inter-send gap ring buffer.
    pub pacing_window: usize,

    /// Half-width, in degrees, of the uniform offset used for idle-drift
    /// destinations.
    pub drift_radius_deg: f64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            fleet_size: 400,
            vehicle_speed_mps: 2.222,
            target_rate: 500.0,
            window_size_secs: 10.0,
            time_warp: 1.0,
            epoch_start: Timestamp::DEFAULT_EPOCH,
            activity_fraction: 0.1,
            reservation_interval_secs: 10.0,
            pacing_window: 100,
            drift_radius_deg: 0.05,
        }
    }
}

impl StreamConfig {
    /// Reject parameter combinations that would poison the tick loop.
    ///
    /// Configuration errors are the only failures fatal to the whole system.
    pub fn validate(&self) -> CoreResult<()> {
        if self.fleet_size == 0 {
            return Err(CoreError::Config("fleet_size must be positive".into()));
        }
        if !(self.vehicle_speed_mps > 0.0) {
            return Err(CoreError::Config("vehicle_speed_mps must be positive".into()));
        }
        if !(self.target_rate > 0.0) {
            return Err(CoreError::Config("target_rate must be positive".into()));
        }
        if !(self.window_size_secs > 0.0) {
            return Err(CoreError::Config("window_size_secs must be positive".into()));
        }
        if !(self.time_warp > 0.0) {
            return Err(CoreError::Config("time_warp must be positive".into()));
        }
        if !(self.activity_fraction >= 0.0) {
            return Err(CoreError::Config("activity_fraction must be non-negative".into()));
        }
        if !(self.reservation_interval_secs > 0.0) {
            return Err(CoreError::Config(
                "reservation_interval_secs must be positive".into(),
            ));
        }
        if self.pacing_window == 0 {
            return Err(CoreError::Config("pacing_window must be positive".into()));
        }
        if !(self.drift_radius_deg > 0.0) {
            return Err(CoreError::Config("drift_radius_deg must be positive".into()));
        }
        Ok(())
    }

    /// Event queue capacity: two windows' worth of burst.
    #[inline]
    pub fn queue_capacity(&self) -> usize {
        (2.0 * self.target_rate * self.window_size_secs).ceil() as usize
    }

    /// Active-route count at or below which the generator skips synthesis.
    #[inline]
    pub fn activity_floor(&self) -> usize {
        (self.fleet_size as f64 * self.activity_fraction) as usize
    }

    /// Simulated seconds covered by one window.
    #[inline]
    pub fn window_span_secs(&self) -> f64 {
        self.window_size_secs * self.time_warp
    }

    /// Events synthesized per tick to hit the target rate.
    #[inline]
    pub fn updates_per_window(&self) -> usize {
        (self.window_size_secs * self.target_rate) as usize
    }
}
