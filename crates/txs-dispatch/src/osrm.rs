//! OSRM-backed route resolver (feature `osrm`).
//!
//! Talks to a running OSRM HTTP instance via its `route/v1` service with
//! GeoJSON geometries.  Distances come from the engine; arrival times use the
//! engine's duration estimate.

use serde::Deserialize;

use txs_core::geo::GeoPoint;
use txs_core::path::TrackPath;
use txs_core::time::Timestamp;

use crate::resolver::{ResolveError, ResolvedRoute, RouteResolver};

/// Resolves routes against an OSRM HTTP endpoint.
pub struct OsrmResolver {
    base_url: String,
    client:   reqwest::blocking::Client,
}

impl OsrmResolver {
    /// `base_url` is the engine root, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client:   reqwest::blocking::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct OsrmResponse {
    code:   String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl RouteResolver for OsrmResolver {
    fn resolve(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        depart: Timestamp,
    ) -> Result<ResolvedRoute, ResolveError> {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url, origin.lon, origin.lat, destination.lon, destination.lat,
        );

        let response: OsrmResponse = self
            .client
            .get(&url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| ResolveError::Transport(e.to_string()))?
            .json()
            .map_err(|e| ResolveError::Transport(e.to_string()))?;

        if response.code != "Ok" {
            return Err(ResolveError::Transport(format!(
                "engine returned code {:?}",
                response.code
            )));
        }
        let Some(route) = response.routes.into_iter().next() else {
            return Err(ResolveError::NoRoute { from: origin, to: destination });
        };

        let points: Vec<GeoPoint> = route
            .geometry
            .coordinates
            .iter()
            .map(|&[lon, lat]| GeoPoint::new(lon, lat))
            .collect();
        if points.len() < 2 {
            return Err(ResolveError::NoRoute { from: origin, to: destination });
        }

        let path = TrackPath::new(points);
        // Snap endpoints to the routed geometry rather than the raw request.
        let pickup = path.start().unwrap_or(origin);
        let dropoff = path.end().unwrap_or(destination);

        Ok(ResolvedRoute {
            pickup,
            dropoff,
            pickup_time: depart,
            arrival_time: depart.add_secs_f64(route.duration),
            distance_m: route.distance,
            path,
        })
    }
}
