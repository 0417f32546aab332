//! Route resolution seam.
//!
//! The dispatch simulator never computes geometry itself — it asks a
//! [`RouteResolver`] for a concrete route between two points at a departure
//! time.  [`StraightLineResolver`] is the default backend and needs no
//! network; the `osrm` feature adds a live routing-engine backend.

use txs_core::geo::GeoPoint;
use txs_core::path::TrackPath;
use txs_core::time::Timestamp;

/// A fully resolved route, ready to become a [`txs_core::Movement`].
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRoute {
    pub pickup:       GeoPoint,
    pub dropoff:      GeoPoint,
    pub pickup_time:  Timestamp,
    pub arrival_time: Timestamp,
    /// Routed (or great-circle) distance in metres.
    pub distance_m:   f64,
    pub path:         TrackPath,
}

impl ResolvedRoute {
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.arrival_time.seconds_since(self.pickup_time)
    }
}

/// Errors a resolver backend can report for a single request.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: GeoPoint, to: GeoPoint },

    #[error("resolver request failed: {0}")]
    Transport(String),
}

/// Computes a route between two points departing at a given instant.
pub trait RouteResolver {
    fn resolve(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        depart: Timestamp,
    ) -> Result<ResolvedRoute, ResolveError>;
}

// ── StraightLineResolver ──────────────────────────────────────────────────────

/// Resolves every route as a single straight segment driven at constant speed.
///
/// Distance is great-circle metres; duration follows from the configured
/// speed.  This is the backend used when no routing engine is available.
#[derive(Clone, Copy, Debug)]
pub struct StraightLineResolver {
    pub speed_mps: f64,
}

impl StraightLineResolver {
    pub fn new(speed_mps: f64) -> Self {
        Self { speed_mps }
    }
}

impl RouteResolver for StraightLineResolver {
    fn resolve(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        depart: Timestamp,
    ) -> Result<ResolvedRoute, ResolveError> {
        let distance_m = origin.haversine_m(destination);
        let duration = distance_m / self.speed_mps;
        Ok(ResolvedRoute {
            pickup:       origin,
            dropoff:      destination,
            pickup_time:  depart,
            arrival_time: depart.add_secs_f64(duration),
            distance_m,
            path:         TrackPath::straight(origin, destination),
        })
    }
}
