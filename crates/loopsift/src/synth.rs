//! Synthetic candidate routes (seeded, replayable).
//!
//! Purpose
//! - Stand in for the road-graph search when exercising the core: tests, benches
//!   and the CLI demo all draw from here.
//! - Every route is reproducible from a replay token `(seed, index)`, so a failing
//!   case can be regenerated in isolation.
//!
//! Model
//! - Visitation mask: `k` node indices drawn uniformly from `[0, node_space)`;
//!   node spaces wider than 64 bits are the normal case.
//! - Centroid: origin plus uniform jitter of `spread_deg` in each axis; geometry
//!   is a closed, radially jittered ring around it.
//! - Metrics: distance and climb rate drawn from their ranges, difficulty derived
//!   with `difficulty_score`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::event::{Event, RouteFeature};
use crate::ingest::SetId;
use crate::mask::NodeMask;
use crate::route::{difficulty_score, CandidateRoute, ElevationSample, LatLng, RouteMetrics};

/// Node count distribution per route.
#[derive(Clone, Copy, Debug)]
pub enum NodeCount {
    Fixed(usize),
    Uniform { min: usize, max: usize },
}

impl NodeCount {
    fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        match *self {
            NodeCount::Fixed(n) => n.max(1),
            NodeCount::Uniform { min, max } => {
                let lo = min.max(1);
                let hi = max.max(lo);
                rng.gen_range(lo..=hi)
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SynthCfg {
    pub route_count: usize,
    /// Mask bits are drawn from `[0, node_space)`.
    pub node_space: u64,
    pub nodes_per_route: NodeCount,
    pub origin: LatLng,
    /// Centroid jitter around the origin, degrees.
    pub spread_deg: f64,
    /// Ring radius of the drawn geometry, degrees.
    pub ring_radius_deg: f64,
    /// Vertices per ring (the ring is closed, so one more point is emitted).
    pub ring_vertices: usize,
    pub distance_miles: (f64, f64),
    pub climb_ft_per_mile: (f64, f64),
}

impl Default for SynthCfg {
    fn default() -> Self {
        Self {
            route_count: 30,
            node_space: 20_000,
            nodes_per_route: NodeCount::Uniform { min: 40, max: 160 },
            origin: LatLng::new(35.5951, -82.5515),
            spread_deg: 0.08,
            ring_radius_deg: 0.02,
            ring_vertices: 12,
            distance_miles: (2.0, 50.0),
            climb_ft_per_mile: (0.0, 220.0),
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

#[inline]
fn draw_in<R: Rng>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}

/// Draw one candidate route.
pub fn draw_route(cfg: &SynthCfg, tok: ReplayToken) -> CandidateRoute {
    let mut rng = tok.to_std_rng();
    let space = cfg.node_space.max(1);
    let k = cfg.nodes_per_route.sample(&mut rng);
    let visited = NodeMask::from_nodes((0..k).map(|_| rng.gen_range(0..space)));

    let centroid = LatLng::new(
        cfg.origin.lat + (rng.gen::<f64>() * 2.0 - 1.0) * cfg.spread_deg,
        cfg.origin.lng + (rng.gen::<f64>() * 2.0 - 1.0) * cfg.spread_deg,
    );
    let n = cfg.ring_vertices.max(3);
    let phase = rng.gen::<f64>() * std::f64::consts::TAU;
    let mut ring: Vec<LatLng> = (0..n)
        .map(|i| {
            let th = phase + std::f64::consts::TAU * (i as f64) / (n as f64);
            let r = cfg.ring_radius_deg * (0.75 + 0.5 * rng.gen::<f64>());
            LatLng::new(centroid.lat + r * th.sin(), centroid.lng + r * th.cos())
        })
        .collect();
    ring.push(ring[0]);

    let total = draw_in(&mut rng, cfg.distance_miles);
    let loop_ratio = rng.gen_range(0.5..=1.0);
    let climb = (total * draw_in(&mut rng, cfg.climb_ft_per_mile)).round();
    let turns = rng.gen_range(2..=30u32);

    let base_ft = 2000.0 + rng.gen::<f64>() * 500.0;
    let last = (ring.len() - 1) as f64;
    let elevation = ring
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let t = i as f64 / last;
            let next = ring.get(i + 1).copied().unwrap_or(*p);
            let bearing = (next.lng - p.lng).atan2(next.lat - p.lat).to_degrees().rem_euclid(360.0);
            ElevationSample {
                distance: total * t,
                elevation: base_ft + 0.5 * climb * (1.0 - (std::f64::consts::TAU * t).cos()) / 2.0,
                lat: p.lat,
                lng: p.lng,
                bearing,
            }
        })
        .collect();

    let metrics = RouteMetrics {
        total_distance: Some(total),
        loop_distance: Some(total * loop_ratio),
        loop_ratio: Some(loop_ratio),
        turns: Some(turns),
        total_climb: Some(climb),
        difficulty: Some(difficulty_score(total, climb)),
        node_count: u32::try_from(k).ok(),
        centroid: Some(centroid),
    };
    CandidateRoute::new(visited, ring, metrics, elevation)
}

/// `cfg.route_count` routes drawn with indices `0..route_count`.
pub fn draw_routes(cfg: &SynthCfg, seed: u64) -> Vec<CandidateRoute> {
    (0..cfg.route_count as u64)
        .map(|index| draw_route(cfg, ReplayToken { seed, index }))
        .collect()
}

/// A full producer session: created, every route, complete.
pub fn session_events(cfg: &SynthCfg, set_id: &SetId, seed: u64) -> Vec<Event> {
    let mut events = Vec::with_capacity(cfg.route_count + 2);
    events.push(Event::SetCreated {
        set_id: set_id.clone(),
        origin: cfg.origin,
    });
    events.extend(draw_routes(cfg, seed).iter().map(|r| Event::RouteArrived {
        set_id: set_id.clone(),
        path: RouteFeature::from_route(r),
    }));
    events.push(Event::SetComplete {
        set_id: set_id.clone(),
    });
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_is_deterministic() {
        let cfg = SynthCfg::default();
        let tok = ReplayToken { seed: 7, index: 3 };
        assert_eq!(draw_route(&cfg, tok), draw_route(&cfg, tok));
        assert_ne!(
            draw_route(&cfg, tok).visited,
            draw_route(&cfg, ReplayToken { seed: 7, index: 4 }).visited
        );
    }

    #[test]
    fn draws_respect_config() {
        let cfg = SynthCfg {
            route_count: 20,
            node_space: 500,
            nodes_per_route: NodeCount::Fixed(10),
            ..SynthCfg::default()
        };
        for r in draw_routes(&cfg, 1) {
            assert!(r.visited.bit_width() <= 500);
            assert!(r.visited.count() >= 1 && r.visited.count() <= 10);
            let d = r.metrics.total_distance.unwrap();
            assert!((2.0..=50.0).contains(&d));
            let diff = r.metrics.difficulty.unwrap();
            assert!((1.0..=10.0).contains(&diff));
            let c = r.metrics.centroid.unwrap();
            assert!((c.lat - cfg.origin.lat).abs() <= cfg.spread_deg + 1e-12);
            assert_eq!(r.geometry.len(), cfg.ring_vertices + 1);
            assert_eq!(r.geometry.first(), r.geometry.last());
            assert_eq!(r.elevation.len(), r.geometry.len());
        }
    }

    #[test]
    fn session_is_bracketed() {
        let cfg = SynthCfg {
            route_count: 4,
            ..SynthCfg::default()
        };
        let id = SetId::new("demo");
        let events = session_events(&cfg, &id, 5);
        assert_eq!(events.len(), 6);
        assert_eq!(events[0].kind(), "PATHSET_CREATED");
        assert_eq!(events[5].kind(), "GENERATION_COMPLETE");
        assert!(events.iter().all(|e| e.set_id() == Some(&id)));
    }
}
