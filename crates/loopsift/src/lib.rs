//! Candidate-route narrowing and browsing core.
//!
//! A route producer streams candidate loops for one origin; the user narrows
//! them with region constraints (strict/loose include, exclude) and numeric
//! ranges, orders what is left, and steps through it with a cursor.
//!
//! Layout (leaves first)
//! - `mask`: arbitrary-width node bitsets and their set predicates.
//! - `route`: candidate routes and metrics.
//! - `ingest`: generation sessions → arrival-ordered route lists.
//! - `selection`: the undoable constraint list.
//! - `filter`, `sort`: pure view stages.
//! - `cursor`: index into the current view.
//! - `event`: producer/drawing-tool events and their JSON form.
//! - `explorer`: the owned context tying it all together.
//! - `synth`: seeded stand-in producer for tests, benches and demos.
//!
//! Model: single writer, serial events. The stores are only reachable through
//! `Explorer` (or the store types themselves); views are recomputed, not cached.

pub mod cursor;
pub mod event;
pub mod explorer;
pub mod filter;
pub mod ingest;
pub mod mask;
pub mod route;
pub mod selection;
pub mod sort;
pub mod synth;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use explorer::{Diagnostics, Explorer, View, ViewSummary};
pub use mask::{MaskParseError, NodeMask};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::event::{Event, FeatureGeometry, RouteFeature, RouteProperties};
    pub use crate::explorer::{Diagnostics, Explorer, View, ViewSummary};
    pub use crate::filter::{filter_routes, FilterState, NumericRange};
    pub use crate::ingest::{CandidateSet, CandidateStore, SetId};
    pub use crate::mask::{MaskParseError, NodeMask, WireMask};
    pub use crate::route::{CandidateRoute, ElevationSample, LatLng, RouteId, RouteMetrics};
    pub use crate::selection::{Constraint, ConstraintMode, SelectionRegistry, SourceTool};
    pub use crate::sort::{sort_routes, spatial_sort, SortDirection, SortKey};
}
