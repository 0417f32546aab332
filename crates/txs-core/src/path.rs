//! Path geometry: an ordered coordinate sequence with arc-length lookup.
//!
//! Positions along a path are computed by constant-speed arc-length
//! interpolation: walk segments accumulating planar length until the target
//! distance falls inside one, then interpolate linearly within it.  Distances
//! past either end clamp to the endpoints rather than failing — callers only
//! ask for strictly interior positions, but a slightly-late timestamp must not
//! take the pipeline down.

use crate::error::{CoreError, CoreResult};
use crate::geo::GeoPoint;

/// An ordered polyline of geographic coordinates.
#[derive(Clone, Debug, PartialEq, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TrackPath(pub Vec<GeoPoint>);

impl TrackPath {
    #[inline]
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self(points)
    }

    /// The degenerate two-point path from `a` to `b`.
    #[inline]
    pub fn straight(a: GeoPoint, b: GeoPoint) -> Self {
        Self(vec![a, b])
    }

    #[inline]
    pub fn points(&self) -> &[GeoPoint] {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn start(&self) -> Option<GeoPoint> {
        self.0.first().copied()
    }

    #[inline]
    pub fn end(&self) -> Option<GeoPoint> {
        self.0.last().copied()
    }

    /// Total planar length of the path, in degree units.
    pub fn length_deg(&self) -> f64 {
        self.0
            .windows(2)
            .map(|w| w[0].planar_deg(w[1]))
            .sum()
    }

    /// The coordinate `dist_deg` into the path (planar arc length).
    ///
    /// Returns `None` for an empty path.  Distances ≤ 0 return the first
    /// point; distances past the total length return the last.
    pub fn point_at(&self, dist_deg: f64) -> Option<GeoPoint> {
        let first = self.start()?;
        if dist_deg <= 0.0 {
            return Some(first);
        }

        let mut walked = 0.0;
        for w in self.0.windows(2) {
            let seg = w[0].planar_deg(w[1]);
            if walked + seg >= dist_deg {
                if seg == 0.0 {
                    return Some(w[0]);
                }
                let frac = (dist_deg - walked) / seg;
                return Some(GeoPoint::new(
                    w[0].lon + (w[1].lon - w[0].lon) * frac,
                    w[0].lat + (w[1].lat - w[0].lat) * frac,
                ));
            }
            walked += seg;
        }
        self.end()
    }

    /// The coordinate at `fraction` of the total path length (clamped).
    #[inline]
    pub fn point_at_fraction(&self, fraction: f64) -> Option<GeoPoint> {
        self.point_at(self.length_deg() * fraction)
    }

    // ── Persistence codec ─────────────────────────────────────────────────

    /// Encode as a JSON coordinate array for storage.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(CoreError::Geometry)
    }

    /// Decode a stored JSON coordinate array.
    pub fn from_json(encoded: &str) -> CoreResult<Self> {
        serde_json::from_str(encoded).map_err(CoreError::Geometry)
    }
}
