//! `txs-dispatch` — trip-request assignment and movement synthesis.
//!
//! Turns a stream of trip requests into per-vehicle movement chains: idle
//! drift while waiting, a repositioning leg to the pickup, then the occupied
//! trip.  Route geometry comes from a pluggable [`RouteResolver`].

pub mod error;
pub mod fleet;
#[cfg(feature = "osrm")]
pub mod osrm;
pub mod resolver;
pub mod simulator;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{DispatchError, DispatchResult};
pub use fleet::{Vehicle, can_reach};
#[cfg(feature = "osrm")]
pub use osrm::OsrmResolver;
pub use resolver::{ResolveError, ResolvedRoute, RouteResolver, StraightLineResolver};
pub use simulator::{DispatchSimulator, DispatchStats, TripRequest};
