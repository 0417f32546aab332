//! The `UpdateEvent` wire enum.
//!
//! Each variant serializes as a bare JSON object with camelCase keys and no
//! type tag, exactly as downstream stream processors expect.  Optional fields
//! on `LocationUpdate` are *absent* (not null) when the vehicle is not
//! occupied / not reserved.
//!
//! The enum is `#[serde(untagged)]`; variants are ordered most-specific-first
//! so that deserialization (used by consumers and tests) resolves each object
//! to the right variant by its required keys.

use crate::geo::GeoPoint;
use crate::ids::VehicleId;
use crate::movement::Movement;

/// A single vehicle update, queued then delivered, never persisted.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum UpdateEvent {
    /// A vehicle finished serving a route; fare details are published once.
    #[serde(rename_all = "camelCase")]
    RouteCompleted {
        vehicle_id: VehicleId,
        passenger_count: u32,
        distance: f64,
        duration: f64,
        fare_amount: f64,
        extra: f64,
        mta_tax: f64,
        tip_amount: f64,
        tolls_amount: f64,
        surcharge: f64,
        total_amount: f64,
        payment_type: i32,
        trip_type: i32,
    },

    /// An interpolated mid-route position fix.
    #[serde(rename_all = "camelCase")]
    LocationUpdate {
        vehicle_id: VehicleId,
        lon: f64,
        lat: f64,
        passenger_count: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        dest_lon: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        dest_lat: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reservation_lon: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reservation_lat: Option<f64>,
    },

    /// Where a vehicle will travel to, published when it gets booked.
    #[serde(rename_all = "camelCase")]
    Destination {
        vehicle_id: VehicleId,
        passenger_count: u32,
        dest_lon: f64,
        dest_lat: f64,
    },

    /// A vehicle received a reservation and is heading to the caller.
    #[serde(rename_all = "camelCase")]
    Reservation {
        vehicle_id: VehicleId,
        lon: f64,
        lat: f64,
    },

    /// Occupancy changed (a route just started).
    #[serde(rename_all = "camelCase")]
    Occupancy {
        vehicle_id: VehicleId,
        passenger_count: u32,
    },
}

impl UpdateEvent {
    pub fn occupancy(m: &Movement) -> Self {
        UpdateEvent::Occupancy {
            vehicle_id: m.vehicle,
            passenger_count: m.passenger_count,
        }
    }

    pub fn destination(m: &Movement) -> Self {
        UpdateEvent::Destination {
            vehicle_id: m.vehicle,
            passenger_count: m.passenger_count,
            dest_lon: m.dropoff_pos.lon,
            dest_lat: m.dropoff_pos.lat,
        }
    }

    /// Reservation target is the movement's dropoff point.
    pub fn reservation(m: &Movement) -> Self {
        UpdateEvent::Reservation {
            vehicle_id: m.vehicle,
            lon: m.dropoff_pos.lon,
            lat: m.dropoff_pos.lat,
        }
    }

    pub fn route_completed(m: &Movement) -> Self {
        UpdateEvent::RouteCompleted {
            vehicle_id: m.vehicle,
            passenger_count: m.passenger_count,
            distance: m.distance_m,
            duration: m.duration_secs,
            fare_amount: m.fare.fare_amount,
            extra: m.fare.extra,
            mta_tax: m.fare.mta_tax,
            tip_amount: m.fare.tip_amount,
            tolls_amount: m.fare.tolls_amount,
            surcharge: m.fare.surcharge,
            total_amount: m.fare.total_amount,
            payment_type: m.fare.payment_type,
            trip_type: m.fare.trip_type,
        }
    }

    /// A position fix at `pos`.  Destination fields are attached only while
    /// occupied; reservation fields only while `reserved`.
    pub fn location(m: &Movement, pos: GeoPoint, reserved: bool) -> Self {
        let (dest_lon, dest_lat) = if m.passenger_count > 0 {
            (Some(m.dropoff_pos.lon), Some(m.dropoff_pos.lat))
        } else {
            (None, None)
        };
        let (reservation_lon, reservation_lat) = if reserved {
            (Some(m.dropoff_pos.lon), Some(m.dropoff_pos.lat))
        } else {
            (None, None)
        };
        UpdateEvent::LocationUpdate {
            vehicle_id: m.vehicle,
            lon: pos.lon,
            lat: pos.lat,
            passenger_count: m.passenger_count,
            dest_lon,
            dest_lat,
            reservation_lon,
            reservation_lat,
        }
    }

    /// The vehicle this event concerns.
    pub fn vehicle_id(&self) -> VehicleId {
        match *self {
            UpdateEvent::RouteCompleted { vehicle_id, .. }
            | UpdateEvent::LocationUpdate { vehicle_id, .. }
            | UpdateEvent::Destination { vehicle_id, .. }
            | UpdateEvent::Reservation { vehicle_id, .. }
            | UpdateEvent::Occupancy { vehicle_id, .. } => vehicle_id,
        }
    }

    /// Position fixes are the only events the overload valve may shed.
    #[inline]
    pub fn is_location_update(&self) -> bool {
        matches!(self, UpdateEvent::LocationUpdate { .. })
    }
}
