//! Candidate routes: one generated loop option and its metrics.
//!
//! - `LatLng`: plain WGS84 coordinate (degrees).
//! - `RouteMetrics`: every metric is optional; producers omit what they did not compute.
//!   Accessors apply the defaults used by filtering (distance 0, difficulty 1).
//! - `CandidateRoute`: keyed by `RouteId`, the hex rendering of its visitation mask.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::mask::NodeMask;

/// Geographic coordinate in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[inline]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Flat-plane embedding `(lat, lng)`; no geodesic correction.
    #[inline]
    pub fn planar(&self) -> Vector2<f64> {
        Vector2::new(self.lat, self.lng)
    }
}

/// Route identity derived from the visitation mask. Routes with equal masks share
/// an id; ids are not unique across sessions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteId(pub String);

impl RouteId {
    pub fn from_mask(mask: &NodeMask) -> Self {
        Self(mask.to_hex())
    }
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One elevation sample along the route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElevationSample {
    /// Distance along the route (miles).
    pub distance: f64,
    /// Elevation (feet).
    pub elevation: f64,
    pub lat: f64,
    pub lng: f64,
    /// Forward azimuth in degrees, `[0, 360)`.
    pub bearing: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    /// Total distance including the out-and-back stem (miles).
    pub total_distance: Option<f64>,
    /// Loop-only distance (miles).
    pub loop_distance: Option<f64>,
    pub loop_ratio: Option<f64>,
    pub turns: Option<u32>,
    /// Total climb (feet).
    pub total_climb: Option<f64>,
    /// Difficulty score in `[1, 10]`.
    pub difficulty: Option<f64>,
    pub node_count: Option<u32>,
    pub centroid: Option<LatLng>,
}

impl RouteMetrics {
    /// Distance used by range filtering; missing reads as 0.
    #[inline]
    pub fn distance_or_default(&self) -> f64 {
        self.total_distance.unwrap_or(0.0)
    }

    /// Difficulty used by range filtering; missing reads as 1.
    #[inline]
    pub fn difficulty_or_default(&self) -> f64 {
        self.difficulty.unwrap_or(1.0)
    }

    /// Centroid usable for spatial ordering (present and finite).
    #[inline]
    pub fn spatial_centroid(&self) -> Option<LatLng> {
        self.centroid.filter(LatLng::is_finite)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateRoute {
    pub id: RouteId,
    pub geometry: Vec<LatLng>,
    pub metrics: RouteMetrics,
    pub visited: NodeMask,
    pub elevation: Vec<ElevationSample>,
}

impl CandidateRoute {
    /// Build a route keyed by its mask. A missing centroid is filled from the mean
    /// position of the elevation samples when there are any.
    pub fn new(
        visited: NodeMask,
        geometry: Vec<LatLng>,
        mut metrics: RouteMetrics,
        elevation: Vec<ElevationSample>,
    ) -> Self {
        if metrics.centroid.is_none() {
            metrics.centroid = sample_centroid(&elevation);
        }
        Self {
            id: RouteId::from_mask(&visited),
            geometry,
            metrics,
            visited,
            elevation,
        }
    }
}

fn sample_centroid(samples: &[ElevationSample]) -> Option<LatLng> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    let (lat, lng) = samples
        .iter()
        .fold((0.0, 0.0), |(a, b), s| (a + s.lat, b + s.lng));
    Some(LatLng::new(lat / n, lng / n))
}

/// Difficulty from climb rate: `1 + (ft/mile / 200) * 9`, clamped to `[1, 10]`,
/// one decimal. Non-positive distance scores 1.
pub fn difficulty_score(total_miles: f64, total_climb_ft: f64) -> f64 {
    if !(total_miles > 0.0) {
        return 1.0;
    }
    let climb_rate = total_climb_ft / total_miles;
    let score = (1.0 + (climb_rate / 200.0) * 9.0).clamp(1.0, 10.0);
    (score * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_hex_of_mask() {
        let r = CandidateRoute::new(
            NodeMask::from(0b101),
            vec![],
            RouteMetrics::default(),
            vec![],
        );
        assert_eq!(r.id, RouteId("0x5".into()));
    }

    #[test]
    fn centroid_falls_back_to_elevation_samples() {
        let samples = vec![
            ElevationSample {
                lat: 35.0,
                lng: -82.0,
                ..Default::default()
            },
            ElevationSample {
                lat: 36.0,
                lng: -83.0,
                ..Default::default()
            },
        ];
        let r = CandidateRoute::new(NodeMask::zero(), vec![], RouteMetrics::default(), samples);
        let c = r.metrics.centroid.unwrap();
        assert!((c.lat - 35.5).abs() < 1e-12 && (c.lng + 82.5).abs() < 1e-12);

        // An explicit centroid wins.
        let given = RouteMetrics {
            centroid: Some(LatLng::new(1.0, 2.0)),
            ..Default::default()
        };
        let r2 = CandidateRoute::new(
            NodeMask::zero(),
            vec![],
            given,
            vec![ElevationSample::default()],
        );
        assert_eq!(r2.metrics.centroid, Some(LatLng::new(1.0, 2.0)));
    }

    #[test]
    fn metric_defaults() {
        let m = RouteMetrics {
            centroid: Some(LatLng::new(f64::NAN, 0.0)),
            ..Default::default()
        };
        assert_eq!(m.distance_or_default(), 0.0);
        assert_eq!(m.difficulty_or_default(), 1.0);
        assert!(m.spatial_centroid().is_none());
    }

    #[test]
    fn difficulty_score_clamps_and_rounds() {
        assert_eq!(difficulty_score(0.0, 500.0), 1.0);
        assert_eq!(difficulty_score(10.0, 0.0), 1.0);
        // 100 ft/mile -> 1 + 0.5 * 9 = 5.5
        assert_eq!(difficulty_score(10.0, 1000.0), 5.5);
        assert_eq!(difficulty_score(1.0, 10_000.0), 10.0);
        // 40 ft/mile -> 1 + 0.2 * 9
        assert!((difficulty_score(10.0, 400.0) - 2.8).abs() < 1e-12);
    }
}
