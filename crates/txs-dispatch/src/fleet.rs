//! Vehicle fleet state.

use txs_core::geo::GeoPoint;
use txs_core::ids::VehicleId;
use txs_core::movement::VehicleStatus;
use txs_core::time::Timestamp;

/// Dispatch-side state of one vehicle: where it will be free, and when.
///
/// `pos`/`time` describe the end of the vehicle's last committed movement.
/// For an `Uninitialized` vehicle they are placeholders — such a vehicle is
/// eligible for any request and teleports to its first pickup.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vehicle {
    pub id:     VehicleId,
    pub status: VehicleStatus,
    pub pos:    GeoPoint,
    pub time:   Timestamp,
}

impl Vehicle {
    pub fn uninitialized(id: VehicleId, epoch: Timestamp) -> Self {
        Self {
            id,
            status: VehicleStatus::Uninitialized,
            pos: GeoPoint::ORIGIN,
            time: epoch,
        }
    }
}

/// `true` when `vehicle` can plausibly be at `pickup` by `pickup_time`.
///
/// The check compares planar degree distance against the time slack times the
/// assumed speed, so the units are deliberately mixed — the threshold is a
/// heuristic, monotonic in slack, not a physical bound.  A vehicle is never
/// reachable for a pickup at or before the instant it becomes free.
#[inline]
pub fn can_reach(
    vehicle: &Vehicle,
    pickup_time: Timestamp,
    pickup: GeoPoint,
    speed_mps: f64,
) -> bool {
    pickup_time > vehicle.time
        && vehicle.pos.planar_deg(pickup) < pickup_time.seconds_since(vehicle.time) * speed_mps
}
