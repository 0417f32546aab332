//! `txs-replay` — windowed replay of stored movements into update events.
//!
//! The [`TrackpointGenerator`] polls a [`txs_store::RouteStore`] on a fixed
//! tick, maintains the sliding [`ReplayWindow`] and [`ActiveRouteSet`], and
//! synthesizes the ordered event list the broadcaster delivers.

pub mod active;
pub mod error;
pub mod generator;
pub mod window;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use active::{ActiveRoute, ActiveRouteSet};
pub use error::{ReplayError, ReplayResult};
pub use generator::TrackpointGenerator;
pub use window::ReplayWindow;
