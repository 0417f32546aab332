//! Geographic coordinate type and distance metrics.
//!
//! Two metrics live side by side on purpose:
//!
//! - [`GeoPoint::haversine_m`] — great-circle metres, used for real-world
//!   distances reported to consumers (trip distance, fares).
//! - [`GeoPoint::planar_deg`] — Euclidean distance on raw degree coordinates,
//!   used for dispatch reachability checks and path arithmetic.  It is cheap,
//!   monotonic in true distance at city scale, and matches the replayed data.

/// A WGS-84 geographic coordinate, longitude first to match the wire shape.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const ORIGIN: GeoPoint = GeoPoint { lon: 0.0, lat: 0.0 };

    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Haversine great-circle distance in metres.
    pub fn haversine_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// Euclidean distance in degree units, computed directly on coordinates.
    #[inline]
    pub fn planar_deg(self, other: GeoPoint) -> f64 {
        let d_lon = self.lon - other.lon;
        let d_lat = self.lat - other.lat;
        (d_lon * d_lon + d_lat * d_lat).sqrt()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}
