//! `txs-core` — foundational types for the taxistream replay pipeline.
//!
//! This crate is a dependency of every other `txs-*` crate.  It intentionally
//! has no `txs-*` dependencies and minimal external ones (`rand`, `thiserror`,
//! `serde`/`serde_json`).
//!
//! # What lives here
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`ids`]      | `VehicleId`, `MovementId`, `SubscriberId`             |
//! | [`geo`]      | `GeoPoint`, haversine + planar metrics                |
//! | [`path`]     | `TrackPath`, arc-length interpolation, JSON codec     |
//! | [`time`]     | `Timestamp` (simulated milliseconds)                  |
//! | [`rng`]      | `StreamRng` (seedable, injected)                      |
//! | [`movement`] | `Movement`, `VehicleStatus`, `Fare`                   |
//! | [`event`]    | `UpdateEvent` wire enum                               |
//! | [`config`]   | `StreamConfig` + startup validation                   |
//! | [`error`]    | `CoreError`, `CoreResult`                             |

pub mod config;
pub mod error;
pub mod event;
pub mod geo;
pub mod ids;
pub mod movement;
pub mod path;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::StreamConfig;
pub use error::{CoreError, CoreResult};
pub use event::UpdateEvent;
pub use geo::GeoPoint;
pub use ids::{MovementId, SubscriberId, VehicleId};
pub use movement::{Fare, Movement, VehicleStatus};
pub use path::TrackPath;
pub use rng::StreamRng;
pub use time::Timestamp;
