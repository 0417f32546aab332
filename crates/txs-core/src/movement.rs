//! The `Movement` record — one realized segment of vehicle activity.
//!
//! A movement is either a passenger trip (`Occupied`) or a repositioning /
//! idle-drift leg (`Free`, fare zeroed).  Movements are produced by the
//! dispatch simulator, persisted through the route store, and replayed by the
//! trackpoint generator.  They are immutable once created.

use crate::geo::GeoPoint;
use crate::ids::VehicleId;
use crate::path::TrackPath;
use crate::time::Timestamp;

// ── VehicleStatus ─────────────────────────────────────────────────────────────

/// The lifecycle state of a vehicle, also stamped onto each movement.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum VehicleStatus {
    /// Never dispatched; eligible for any request regardless of position.
    #[default]
    Uninitialized,
    /// Idle or repositioning without passengers.
    Free,
    /// Carrying passengers.
    Occupied,
}

impl VehicleStatus {
    /// Stable integer encoding for storage backends.
    #[inline]
    pub fn as_u8(self) -> u8 {
        match self {
            VehicleStatus::Uninitialized => 0,
            VehicleStatus::Free => 1,
            VehicleStatus::Occupied => 2,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(VehicleStatus::Uninitialized),
            1 => Some(VehicleStatus::Free),
            2 => Some(VehicleStatus::Occupied),
            _ => None,
        }
    }
}

// ── Fare ──────────────────────────────────────────────────────────────────────

/// Fare attributes attached to a trip.
///
/// Repositioning movements carry [`Fare::NONE`]: all amounts zero, payment
/// and trip type set to the `-1` sentinel.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Fare {
    pub fare_amount: f64,
    pub extra: f64,
    pub mta_tax: f64,
    pub tip_amount: f64,
    pub tolls_amount: f64,
    pub surcharge: f64,
    pub total_amount: f64,
    pub payment_type: i32,
    pub trip_type: i32,
}

impl Fare {
    /// The zero fare stamped onto repositioning movements.
    pub const NONE: Fare = Fare {
        fare_amount: 0.0,
        extra: 0.0,
        mta_tax: 0.0,
        tip_amount: 0.0,
        tolls_amount: 0.0,
        surcharge: 0.0,
        total_amount: 0.0,
        payment_type: -1,
        trip_type: -1,
    };
}

// ── Movement ──────────────────────────────────────────────────────────────────

/// One realized vehicle trip segment, occupied or repositioning.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Movement {
    pub vehicle: VehicleId,
    pub pickup_time: Timestamp,
    pub dropoff_time: Timestamp,
    pub status: VehicleStatus,
    /// Zero for repositioning movements.
    pub passenger_count: u32,
    pub pickup_pos: GeoPoint,
    pub dropoff_pos: GeoPoint,
    /// Real-world (great-circle / routed) distance in metres.
    pub distance_m: f64,
    pub duration_secs: f64,
    pub fare: Fare,
    pub path: TrackPath,
}

impl Movement {
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.status == VehicleStatus::Occupied
    }

    /// Fraction of the movement elapsed at `at`, unclamped.
    ///
    /// Strictly interior fractions (0, 1) correspond to a vehicle mid-route;
    /// a zero-duration movement reports 1.0.
    pub fn elapsed_fraction(&self, at: Timestamp) -> f64 {
        let total = self.dropoff_time.seconds_since(self.pickup_time);
        if total <= 0.0 {
            return 1.0;
        }
        at.seconds_since(self.pickup_time) / total
    }

    /// Interpolated position at `at`, assuming constant speed along the path.
    ///
    /// Returns `None` when the path is empty.
    pub fn position_at(&self, at: Timestamp) -> Option<GeoPoint> {
        self.path.point_at_fraction(self.elapsed_fraction(at))
    }
}
