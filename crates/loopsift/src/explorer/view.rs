//! Outbound view handed to the rendering side.

use serde::Serialize;

use crate::ingest::SetId;
use crate::route::{CandidateRoute, LatLng, RouteId};
use crate::selection::{Constraint, ConstraintMode, SourceTool};

/// One recomputation of the active set through filter and sort.
#[derive(Clone, Debug)]
pub struct View<'a> {
    pub set_id: Option<&'a SetId>,
    pub origin: Option<LatLng>,
    pub complete: bool,
    /// Routes in the active set before filtering.
    pub total: usize,
    /// Filtered and sorted.
    pub routes: Vec<&'a CandidateRoute>,
    pub cursor: usize,
    /// Whether `next`/`prev` would move the cursor.
    pub has_next: bool,
    pub has_prev: bool,
    pub constraints: &'a [Constraint],
    pub can_undo: bool,
}

impl<'a> View<'a> {
    #[inline]
    pub fn filtered_count(&self) -> usize {
        self.routes.len()
    }

    /// Route under the cursor; `None` for an empty view.
    pub fn current(&self) -> Option<&'a CandidateRoute> {
        self.routes.get(self.cursor).copied()
    }

    pub fn summary(&self) -> ViewSummary {
        ViewSummary {
            set_id: self.set_id.cloned(),
            origin: self.origin,
            complete: self.complete,
            total: self.total,
            filtered: self.filtered_count(),
            cursor: self.cursor,
            current: self.current().map(|r| r.id.clone()),
            has_next: self.has_next,
            has_prev: self.has_prev,
            routes: self
                .routes
                .iter()
                .enumerate()
                .map(|(index, r)| RouteSummary::new(index, r))
                .collect(),
            constraints: self.constraints.iter().map(ConstraintSummary::new).collect(),
            can_undo: self.can_undo,
        }
    }
}

/// Owned, serializable snapshot of a `View`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewSummary {
    pub set_id: Option<SetId>,
    pub origin: Option<LatLng>,
    pub complete: bool,
    pub total: usize,
    pub filtered: usize,
    pub cursor: usize,
    pub current: Option<RouteId>,
    pub has_next: bool,
    pub has_prev: bool,
    pub routes: Vec<RouteSummary>,
    pub constraints: Vec<ConstraintSummary>,
    pub can_undo: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteSummary {
    pub index: usize,
    pub id: RouteId,
    pub distance: Option<f64>,
    pub difficulty: Option<f64>,
    pub loop_ratio: Option<f64>,
    pub turns: Option<u32>,
    pub climb: Option<f64>,
    pub centroid: Option<LatLng>,
}

impl RouteSummary {
    fn new(index: usize, r: &CandidateRoute) -> Self {
        let m = &r.metrics;
        Self {
            index,
            id: r.id.clone(),
            distance: m.total_distance,
            difficulty: m.difficulty,
            loop_ratio: m.loop_ratio,
            turns: m.turns,
            climb: m.total_climb,
            centroid: m.centroid,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConstraintSummary {
    pub mode: ConstraintMode,
    pub source: SourceTool,
    /// Member nodes in the mask.
    pub nodes: u64,
}

impl ConstraintSummary {
    fn new(c: &Constraint) -> Self {
        Self {
            mode: c.mode,
            source: c.source,
            nodes: c.mask.count(),
        }
    }
}
