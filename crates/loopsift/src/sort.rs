//! Sort engine: property orderings and the spatial-flow walk.
//!
//! Purpose
//! - Order a filtered view without touching the underlying arrival-ordered set.
//! - Keep output deterministic under repeated recomputation: every ordering is
//!   stable, and the spatial walk breaks ties by a fixed seed order.
//!
//! Spatial flow
//! - Seed: stable sort by centroid latitude, north to south; routes without a
//!   finite centroid go last.
//! - Walk: from the first seeded route, repeatedly step to the unvisited route with
//!   the smallest planar squared centroid distance `Δlat² + Δlng²`; ties go to the
//!   earlier seeded route. A missing centroid is infinitely far from everything.
//! - This is nearest-neighbor greedy, O(n²). It is not a shortest tour and is not
//!   meant to be one; candidate sets are tens of routes.

use std::cmp::Ordering;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::route::CandidateRoute;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Input (arrival) order.
    #[default]
    Arrival,
    Distance,
    LoopDistance,
    LoopRatio,
    Turns,
    Climb,
    Difficulty,
    NodeCount,
    SpatialFlow,
}

impl SortKey {
    /// Numeric sort value; missing or non-finite metrics read as 0. `None` for
    /// non-property keys.
    pub fn metric(self, route: &CandidateRoute) -> Option<f64> {
        let m = &route.metrics;
        let v = match self {
            SortKey::Arrival | SortKey::SpatialFlow => return None,
            SortKey::Distance => m.total_distance,
            SortKey::LoopDistance => m.loop_distance,
            SortKey::LoopRatio => m.loop_ratio,
            SortKey::Turns => m.turns.map(f64::from),
            SortKey::Climb => m.total_climb,
            SortKey::Difficulty => m.difficulty,
            SortKey::NodeCount => m.node_count.map(f64::from),
        };
        // -0.0 folds into 0.0 so total_cmp keeps them tied.
        Some(match v {
            Some(x) if x.is_finite() && x != 0.0 => x,
            _ => 0.0,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[inline]
    pub fn apply(self, o: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => o,
            SortDirection::Descending => o.reverse(),
        }
    }
}

/// Order a view. Descending reverses property comparisons; for `Arrival` and
/// `SpatialFlow` it reverses the finished sequence.
pub fn sort_routes<'r>(
    mut routes: Vec<&'r CandidateRoute>,
    key: SortKey,
    direction: SortDirection,
) -> Vec<&'r CandidateRoute> {
    match key {
        SortKey::Arrival => {}
        SortKey::SpatialFlow => routes = spatial_sort(routes),
        _ => {
            // metric() is finite here, so total_cmp agrees with numeric order.
            routes.sort_by(|a, b| {
                let ma = key.metric(a).unwrap_or(0.0);
                let mb = key.metric(b).unwrap_or(0.0);
                direction.apply(ma.total_cmp(&mb))
            });
            return routes;
        }
    }
    if direction == SortDirection::Descending {
        routes.reverse();
    }
    routes
}

/// North-to-south by centroid latitude; routes without a centroid last.
fn seed_order(a: &CandidateRoute, b: &CandidateRoute) -> Ordering {
    match (a.metrics.spatial_centroid(), b.metrics.spatial_centroid()) {
        (Some(ca), Some(cb)) => cb.lat.total_cmp(&ca.lat),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[inline]
fn planar_dist_sq(a: Option<Vector2<f64>>, b: Option<Vector2<f64>>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).norm_squared(),
        _ => f64::INFINITY,
    }
}

/// Nearest-neighbor walk over centroids (see module docs).
pub fn spatial_sort<'r>(mut routes: Vec<&'r CandidateRoute>) -> Vec<&'r CandidateRoute> {
    let n = routes.len();
    if n <= 1 {
        return routes;
    }
    routes.sort_by(|a, b| seed_order(a, b));
    let points: Vec<Option<Vector2<f64>>> = routes
        .iter()
        .map(|r| r.metrics.spatial_centroid().map(|c| c.planar()))
        .collect();

    let mut visited = vec![false; n];
    let mut out = Vec::with_capacity(n);
    let mut cur = 0usize;
    visited[cur] = true;
    out.push(routes[cur]);
    while out.len() < n {
        let mut best: Option<(usize, f64)> = None;
        for (j, seen) in visited.iter().enumerate() {
            if *seen {
                continue;
            }
            let d = planar_dist_sq(points[cur], points[j]);
            // strict `<` keeps the earliest seeded route on ties (including inf)
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        let Some((next, _)) = best else { break };
        visited[next] = true;
        out.push(routes[next]);
        cur = next;
    }
    out
}
