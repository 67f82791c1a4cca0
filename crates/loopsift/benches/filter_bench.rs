//! Criterion microbenches for the filter stage and mask predicates.
//!
//! - Mask: subset/intersect on wide (20k-node) masks.
//! - Filter: 1k synthetic routes through range-only and mixed constraint stacks.
//!
//! Results live under `target/criterion`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use loopsift::filter::{filter_routes, FilterState, NumericRange};
use loopsift::mask::NodeMask;
use loopsift::selection::{Constraint, ConstraintMode, SourceTool};
use loopsift::synth::{draw_route, draw_routes, NodeCount, ReplayToken, SynthCfg};

fn wide_cfg(route_count: usize) -> SynthCfg {
    SynthCfg {
        route_count,
        node_space: 20_000,
        nodes_per_route: NodeCount::Uniform { min: 80, max: 240 },
        ..SynthCfg::default()
    }
}

fn bench_mask(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask");
    let cfg = wide_cfg(1);
    let a = draw_route(&cfg, ReplayToken { seed: 1, index: 0 }).visited;
    let b = draw_route(&cfg, ReplayToken { seed: 1, index: 1 }).visited;
    let probe = a.union(&NodeMask::from_nodes([3, 17_000]));
    group.bench_function(BenchmarkId::new("intersects", "20k"), |bch| {
        bch.iter(|| black_box(&a).intersects(black_box(&b)))
    });
    group.bench_function(BenchmarkId::new("is_subset_of", "20k"), |bch| {
        bch.iter(|| black_box(&a).is_subset_of(black_box(&probe)))
    });
    group.bench_function(BenchmarkId::new("jaccard", "20k"), |bch| {
        bch.iter(|| black_box(&a).jaccard(black_box(&b)))
    });
    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let routes = draw_routes(&wide_cfg(1_000), 42);
    let ranges = FilterState {
        distance: NumericRange::new(10.0, 30.0),
        difficulty: NumericRange::new(1.0, 6.0),
        ..FilterState::default()
    };
    group.bench_function(BenchmarkId::new("ranges_only", 1_000), |b| {
        b.iter(|| filter_routes(black_box(&routes), &ranges, &[]).len())
    });

    let region = |seed, index| {
        let r = draw_route(&wide_cfg(1), ReplayToken { seed, index });
        r.visited
    };
    let constraints = vec![
        Constraint::new(ConstraintMode::LooseInclude, region(7, 0), SourceTool::Region),
        Constraint::new(ConstraintMode::Exclude, region(7, 1), SourceTool::Region),
        Constraint::new(
            ConstraintMode::StrictInclude,
            NodeMask::from_nodes([5]),
            SourceTool::Trace,
        ),
    ];
    group.bench_function(BenchmarkId::new("mixed_constraints", 1_000), |b| {
        b.iter(|| filter_routes(black_box(&routes), &ranges, black_box(&constraints)).len())
    });
    group.finish();
}

criterion_group!(benches, bench_mask, bench_filter);
criterion_main!(benches);
