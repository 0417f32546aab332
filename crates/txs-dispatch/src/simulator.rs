//! Dispatch simulator.
//!
//! Assigns each incoming trip request to one vehicle and returns the full
//! chain of movements that assignment implies: zero or more idle-drift legs,
//! an optional repositioning leg to the pickup, and the occupied trip itself.
//!
//! Vehicle state is committed only when the whole chain resolves — a resolver
//! failure mid-chain leaves the fleet exactly as it was.

use tracing::{debug, warn};

use txs_core::config::StreamConfig;
use txs_core::geo::GeoPoint;
use txs_core::ids::VehicleId;
use txs_core::movement::{Fare, Movement, VehicleStatus};
use txs_core::rng::StreamRng;
use txs_core::time::Timestamp;

use crate::error::{DispatchError, DispatchResult};
use crate::fleet::{Vehicle, can_reach};
use crate::resolver::{ResolvedRoute, RouteResolver};

/// Slack factor for the repositioning gap: drift continues while the idle gap
/// exceeds 110% of the estimated drive time to the pickup.
const GAP_TOLERANCE: f64 = 1.1;

// ── TripRequest ───────────────────────────────────────────────────────────────

/// One trip request drawn from the source data.
#[derive(Clone, Debug, PartialEq)]
pub struct TripRequest {
    pub pickup_time:     Timestamp,
    pub dropoff_time:    Timestamp,
    pub pickup:          GeoPoint,
    pub dropoff:         GeoPoint,
    pub passenger_count: u32,
    pub fare:            Fare,
}

// ── DispatchStats ─────────────────────────────────────────────────────────────

/// Running counters over all requests seen by the simulator.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Requests received, assigned or not.
    pub total_routes:      u64,
    /// Requests that produced no movements (no candidate, or resolution
    /// failed).
    pub unresolved_routes: u64,
}

impl DispatchStats {
    /// Requests that were successfully placed on a vehicle.
    #[inline]
    pub fn placed(&self) -> u64 {
        self.total_routes - self.unresolved_routes
    }
}

// ── DispatchSimulator ─────────────────────────────────────────────────────────

/// Assigns trip requests to a fixed fleet of vehicles.
pub struct DispatchSimulator<R: RouteResolver> {
    resolver:         R,
    vehicles:         Vec<Vehicle>,
    rng:              StreamRng,
    speed_mps:        f64,
    drift_radius_deg: f64,
    stats:            DispatchStats,
}

impl<R: RouteResolver> DispatchSimulator<R> {
    pub fn new(resolver: R, config: &StreamConfig, rng: StreamRng) -> Self {
        let vehicles = (0..config.fleet_size)
            .map(|i| Vehicle::uninitialized(VehicleId(i), config.epoch_start))
            .collect();
        Self {
            resolver,
            vehicles,
            rng,
            speed_mps: config.vehicle_speed_mps,
            drift_radius_deg: config.drift_radius_deg,
            stats: DispatchStats::default(),
        }
    }

    #[inline]
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    #[inline]
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Assign `req` to a vehicle and return the resulting movement chain.
    ///
    /// The last movement is always the occupied trip carrying the request's
    /// exact fare and passenger count; any movements before it are `Free`
    /// repositioning legs with [`Fare::NONE`].
    ///
    /// Every call increments `total_routes`; failures also increment
    /// `unresolved_routes` and leave all vehicle state untouched.
    pub fn assign(&mut self, req: &TripRequest) -> DispatchResult<Vec<Movement>> {
        self.stats.total_routes += 1;

        let Some(idx) = self.pick_candidate(req) else {
            self.stats.unresolved_routes += 1;
            debug!(pickup_time = %req.pickup_time, "no candidate vehicle for request");
            return Err(DispatchError::NoCandidate(req.pickup_time));
        };

        match self.build_chain(self.vehicles[idx], req) {
            Ok((vehicle, movements)) => {
                self.vehicles[idx] = vehicle;
                Ok(movements)
            }
            Err(err) => {
                self.stats.unresolved_routes += 1;
                warn!(vehicle = %self.vehicles[idx].id, error = %err, "request unresolved");
                Err(err)
            }
        }
    }

    /// Pick a vehicle uniformly at random among those eligible for `req`:
    /// every uninitialized vehicle, plus every free vehicle that can reach the
    /// pickup in its available slack.
    fn pick_candidate(&mut self, req: &TripRequest) -> Option<usize> {
        let candidates: Vec<usize> = self
            .vehicles
            .iter()
            .enumerate()
            .filter(|(_, v)| {
                v.status == VehicleStatus::Uninitialized
                    || (v.status == VehicleStatus::Free
                        && can_reach(v, req.pickup_time, req.pickup, self.speed_mps))
            })
            .map(|(i, _)| i)
            .collect();
        self.rng.choose(&candidates).copied()
    }

    /// Build the full movement chain for `req` on a scratch copy of the
    /// vehicle.  The caller commits the returned vehicle state on success.
    fn build_chain(
        &mut self,
        mut vehicle: Vehicle,
        req: &TripRequest,
    ) -> DispatchResult<(Vehicle, Vec<Movement>)> {
        let mut movements = Vec::new();

        if vehicle.status != VehicleStatus::Uninitialized {
            // Drift around the current position while the idle gap is too
            // large for a plausible direct drive to the pickup.
            let mut approach = self.resolver.resolve(vehicle.pos, req.pickup, vehicle.time)?;
            while req.pickup_time.seconds_since(vehicle.time)
                > GAP_TOLERANCE * (approach.distance_m / self.speed_mps)
            {
                let before = vehicle.time;
                movements.push(self.drift(&mut vehicle)?);
                if vehicle.time <= before {
                    return Err(DispatchError::DriftStalled(vehicle.id));
                }
                approach = self.resolver.resolve(vehicle.pos, req.pickup, vehicle.time)?;
            }

            movements.push(free_movement(vehicle.id, &approach));
            vehicle.pos = approach.dropoff;
            vehicle.time = approach.arrival_time;
        }

        let trip = self.resolver.resolve(req.pickup, req.dropoff, req.pickup_time)?;

        // The resolver may snap endpoints onto its network; the vehicle ends
        // up where the recorded movement says it does.
        vehicle.status = VehicleStatus::Free;
        vehicle.pos = trip.dropoff;
        vehicle.time = req.dropoff_time;

        movements.push(Movement {
            vehicle:         vehicle.id,
            pickup_time:     req.pickup_time,
            dropoff_time:    req.dropoff_time,
            status:          VehicleStatus::Occupied,
            passenger_count: req.passenger_count,
            pickup_pos:      trip.pickup,
            dropoff_pos:     trip.dropoff,
            distance_m:      trip.distance_m,
            duration_secs:   req.dropoff_time.seconds_since(req.pickup_time),
            fare:            req.fare,
            path:            trip.path,
        });

        Ok((vehicle, movements))
    }

    /// Synthesize one idle-drift leg to a uniformly random offset around the
    /// vehicle's current position, advancing the scratch vehicle to its end.
    fn drift(&mut self, vehicle: &mut Vehicle) -> DispatchResult<Movement> {
        let r = self.drift_radius_deg;
        let dest = GeoPoint::new(
            vehicle.pos.lon + self.rng.gen_range(-r..=r),
            vehicle.pos.lat + self.rng.gen_range(-r..=r),
        );
        let route = self.resolver.resolve(vehicle.pos, dest, vehicle.time)?;
        let movement = free_movement(vehicle.id, &route);
        vehicle.pos = route.dropoff;
        vehicle.time = route.arrival_time;
        Ok(movement)
    }
}

/// A repositioning movement: `Free` status, zero passengers, no fare.
fn free_movement(vehicle: VehicleId, route: &ResolvedRoute) -> Movement {
    Movement {
        vehicle,
        pickup_time:     route.pickup_time,
        dropoff_time:    route.arrival_time,
        status:          VehicleStatus::Free,
        passenger_count: 0,
        pickup_pos:      route.pickup,
        dropoff_pos:     route.dropoff,
        distance_m:      route.distance_m,
        duration_secs:   route.duration_secs(),
        fare:            Fare::NONE,
        path:            route.path.clone(),
    }
}
