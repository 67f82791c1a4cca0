//! Inbound events from the route producer and the drawing tools.
//!
//! JSON form: one object per event, tagged by `type`, using the generator
//! server's field names. Route payloads are GeoJSON features whose `properties`
//! carry the metrics; positions are `[lng, lat]`.
//!
//! Decoding is lenient: every property is optional, masks go
//! through `WireMask`, and unknown geometry kinds decode as `Unsupported`.

use serde::{Deserialize, Serialize};

use crate::ingest::SetId;
use crate::mask::WireMask;
use crate::route::{CandidateRoute, ElevationSample, LatLng, RouteMetrics};
use crate::selection::SourceTool;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "PATHSET_CREATED")]
    SetCreated {
        #[serde(rename = "pathSetId")]
        set_id: SetId,
        #[serde(rename = "markerPosition")]
        origin: LatLng,
    },
    #[serde(rename = "PATH_RECEIVED")]
    RouteArrived {
        #[serde(rename = "pathSetId")]
        set_id: SetId,
        path: RouteFeature,
    },
    #[serde(rename = "GENERATION_COMPLETE")]
    SetComplete {
        #[serde(rename = "pathSetId")]
        set_id: SetId,
    },
    #[serde(rename = "REGION_RESOLVED")]
    RegionResolved {
        #[serde(default)]
        mask: WireMask,
        #[serde(rename = "toolType")]
        tool: SourceTool,
        #[serde(default)]
        geometry: Vec<LatLng>,
        #[serde(rename = "isExclude", default)]
        is_exclude: bool,
    },
}

impl Event {
    /// Wire tag, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SetCreated { .. } => "PATHSET_CREATED",
            Event::RouteArrived { .. } => "PATH_RECEIVED",
            Event::SetComplete { .. } => "GENERATION_COMPLETE",
            Event::RegionResolved { .. } => "REGION_RESOLVED",
        }
    }

    pub fn set_id(&self) -> Option<&SetId> {
        match self {
            Event::SetCreated { set_id, .. }
            | Event::RouteArrived { set_id, .. }
            | Event::SetComplete { set_id } => Some(set_id),
            Event::RegionResolved { .. } => None,
        }
    }
}

/// GeoJSON position; extra ordinates (altitude) are ignored.
pub type Position = Vec<f64>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeatureGeometry {
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    #[serde(other)]
    Unsupported,
}

impl FeatureGeometry {
    /// Flatten to one `(lat, lng)` sequence; malformed positions are skipped.
    pub fn to_path(&self) -> Vec<LatLng> {
        let to_ll = |p: &Position| match p.as_slice() {
            [lng, lat, ..] => Some(LatLng::new(*lat, *lng)),
            _ => None,
        };
        match self {
            FeatureGeometry::LineString { coordinates } => {
                coordinates.iter().filter_map(to_ll).collect()
            }
            FeatureGeometry::MultiLineString { coordinates } => {
                coordinates.iter().flatten().filter_map(to_ll).collect()
            }
            FeatureGeometry::Unsupported => Vec::new(),
        }
    }
}

/// Metrics block of a route feature.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteProperties {
    pub visited: WireMask,
    pub turns: Option<u32>,
    pub loop_ratio: Option<f64>,
    pub loop_miles: Option<f64>,
    pub total_miles: Option<f64>,
    pub node_count: Option<u32>,
    pub total_climb_ft: Option<f64>,
    pub difficulty: Option<f64>,
    /// Rows of `[distance_mi, elevation_ft, lat, lng, bearing]`.
    pub elevation_profile: Vec<Vec<f64>>,
    /// `[lat, lng]`.
    pub centroid: Option<[f64; 2]>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteFeature {
    #[serde(rename = "type", default = "feature_tag")]
    pub kind: String,
    #[serde(default)]
    pub geometry: Option<FeatureGeometry>,
    #[serde(default)]
    pub properties: RouteProperties,
}

fn feature_tag() -> String {
    "Feature".to_string()
}

impl RouteFeature {
    /// Decode into a candidate route. A missing or malformed mask becomes the zero
    /// mask; check `properties.visited.is_malformed()` first if that matters.
    pub fn into_route(self) -> CandidateRoute {
        let p = self.properties;
        let geometry = self.geometry.map(|g| g.to_path()).unwrap_or_default();
        let elevation = p
            .elevation_profile
            .iter()
            .filter_map(|row| match row.as_slice() {
                [distance, elevation, lat, lng, rest @ ..] => Some(ElevationSample {
                    distance: *distance,
                    elevation: *elevation,
                    lat: *lat,
                    lng: *lng,
                    bearing: rest.first().copied().unwrap_or(0.0),
                }),
                _ => None,
            })
            .collect();
        let metrics = RouteMetrics {
            total_distance: p.total_miles,
            loop_distance: p.loop_miles,
            loop_ratio: p.loop_ratio,
            turns: p.turns,
            total_climb: p.total_climb_ft,
            difficulty: p.difficulty,
            node_count: p.node_count,
            centroid: p.centroid.map(|[lat, lng]| LatLng::new(lat, lng)),
        };
        CandidateRoute::new(p.visited.into_mask(), geometry, metrics, elevation)
    }

    /// Encode a route the way the producer would send it.
    pub fn from_route(route: &CandidateRoute) -> Self {
        let m = &route.metrics;
        let properties = RouteProperties {
            visited: WireMask::Valid(route.visited.clone()),
            turns: m.turns,
            loop_ratio: m.loop_ratio,
            loop_miles: m.loop_distance,
            total_miles: m.total_distance,
            node_count: m.node_count,
            total_climb_ft: m.total_climb,
            difficulty: m.difficulty,
            elevation_profile: route
                .elevation
                .iter()
                .map(|s| vec![s.distance, s.elevation, s.lat, s.lng, s.bearing])
                .collect(),
            centroid: m.centroid.map(|c| [c.lat, c.lng]),
        };
        let geometry = FeatureGeometry::LineString {
            coordinates: route.geometry.iter().map(|c| vec![c.lng, c.lat]).collect(),
        };
        Self {
            kind: feature_tag(),
            geometry: Some(geometry),
            properties,
        }
    }
}
