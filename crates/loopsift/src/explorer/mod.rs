//! Explorer: the owned context that ties the stores to the derived view.
//!
//! Purpose
//! - Own the only mutable state: candidate sets, region constraints, filter
//!   parameters, the active-set selection and the cursor.
//! - Apply producer/UI events one at a time, to completion.
//! - Recompute the filtered-and-sorted view on demand; nothing derived is cached.
//!
//! Cursor rules
//! - Every mutator that can change the view re-clamps the cursor against a freshly
//!   recomputed view length.
//! - A change of sort key or direction resets the cursor to 0 outright.
//! - Switching the active set resets the cursor to 0.
//!
//! Fail-soft events (orphan appends, malformed masks, empty undos, ...) are
//! silent for callers but counted in `Diagnostics`.

mod diagnostics;
mod view;

pub use diagnostics::Diagnostics;
pub use view::{ConstraintSummary, RouteSummary, View, ViewSummary};

use crate::cursor::Cursor;
use crate::event::Event;
use crate::filter::{filter_routes, FilterState, NumericRange};
use crate::ingest::{CandidateSet, CandidateStore, SetId};
use crate::mask::{NodeMask, WireMask};
use crate::route::{CandidateRoute, LatLng};
use crate::selection::{Constraint, SelectionRegistry};
use crate::sort::{sort_routes, SortDirection, SortKey};

#[derive(Clone, Debug, Default)]
pub struct Explorer {
    store: CandidateStore,
    registry: SelectionRegistry,
    filter: FilterState,
    active: Option<SetId>,
    cursor: Cursor,
    diagnostics: Diagnostics,
}

impl Explorer {
    pub fn new(filter: FilterState) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Dispatch one inbound event.
    pub fn apply(&mut self, event: Event) {
        tracing::debug!(kind = event.kind(), set_id = ?event.set_id(), "apply");
        match event {
            Event::SetCreated { set_id, origin } => self.create_set(set_id, origin),
            Event::RouteArrived { set_id, path } => {
                if path.properties.visited.is_malformed() {
                    self.diagnostics.malformed_masks += 1;
                }
                self.append_route(&set_id, path.into_route());
            }
            Event::SetComplete { set_id } => self.mark_complete(&set_id),
            Event::RegionResolved {
                mask,
                tool,
                geometry,
                is_exclude,
            } => {
                let mask = self.accept_mask(mask);
                self.add_constraint(Constraint::from_region(mask, tool, geometry, is_exclude));
            }
        }
    }

    fn accept_mask(&mut self, mask: WireMask) -> NodeMask {
        if mask.is_malformed() {
            self.diagnostics.malformed_masks += 1;
        }
        mask.into_mask()
    }

    // ---- candidate ingest ----

    /// Start a session and make it the active set.
    pub fn create_set(&mut self, id: SetId, origin: LatLng) {
        tracing::debug!(set_id = %id, lat = origin.lat, lng = origin.lng, "set created");
        self.store.create_set(id.clone(), origin);
        self.active = Some(id);
        self.cursor.reset();
    }

    pub fn append_route(&mut self, id: &SetId, route: CandidateRoute) {
        if !self.store.append_route(id, route) {
            self.diagnostics.orphan_appends += 1;
            tracing::debug!(set_id = %id, "route for unknown set dropped");
            return;
        }
        if self.active.as_ref() == Some(id) {
            self.reclamp();
        }
    }

    pub fn mark_complete(&mut self, id: &SetId) {
        if self.store.mark_complete(id) {
            let routes = self.store.select(Some(id)).map_or(0, CandidateSet::len);
            tracing::debug!(set_id = %id, routes, "set complete");
        } else {
            self.diagnostics.orphan_completions += 1;
            tracing::debug!(set_id = %id, "completion for unknown set ignored");
        }
    }

    /// Switch the active set. `None`, or an unknown id, clears the selection.
    pub fn select_set(&mut self, id: Option<SetId>) -> Option<&CandidateSet> {
        self.active = id.filter(|id| self.store.contains(id));
        self.cursor.reset();
        self.active_set()
    }

    pub fn active_set(&self) -> Option<&CandidateSet> {
        self.store.select(self.active.as_ref())
    }

    #[inline]
    pub fn active_id(&self) -> Option<&SetId> {
        self.active.as_ref()
    }

    #[inline]
    pub fn store(&self) -> &CandidateStore {
        &self.store
    }

    // ---- selection registry ----

    pub fn add_constraint(&mut self, constraint: Constraint) {
        if constraint.mask.is_zero() {
            self.diagnostics.zero_mask_constraints += 1;
        }
        self.registry.add(constraint);
        self.reclamp();
    }

    pub fn undo_constraint(&mut self) {
        if self.registry.undo().is_none() {
            self.diagnostics.empty_undos += 1;
        }
        self.reclamp();
    }

    pub fn clear_constraints(&mut self) {
        self.registry.clear();
        self.reclamp();
    }

    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        self.registry.constraints()
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        self.registry.can_undo()
    }

    // ---- filter state ----

    pub fn set_distance_range(&mut self, range: NumericRange) {
        self.filter.distance = range;
        self.reclamp();
    }

    pub fn set_difficulty_range(&mut self, range: NumericRange) {
        self.filter.difficulty = range;
        self.reclamp();
    }

    /// Change the ordering. Any actual change sends the cursor back to 0.
    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        if key != self.filter.sort_key || direction != self.filter.direction {
            self.filter.sort_key = key;
            self.filter.direction = direction;
            self.cursor.reset();
        }
    }

    #[inline]
    pub fn filter_state(&self) -> FilterState {
        self.filter
    }

    /// Restore saved preferences: a range change plus a sort change.
    pub fn restore_filter_state(&mut self, state: FilterState) {
        self.set_sort(state.sort_key, state.direction);
        self.filter.distance = state.distance;
        self.filter.difficulty = state.difficulty;
        self.reclamp();
    }

    // ---- cursor ----

    pub fn next(&mut self) {
        let len = self.view_len();
        self.cursor.next(len);
    }

    pub fn prev(&mut self) {
        self.cursor.prev();
    }

    /// Jump straight to `index` in the current view (clamped).
    pub fn jump(&mut self, index: usize) {
        let len = self.view_len();
        self.cursor.set(index, len);
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor.index()
    }

    #[inline]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    // ---- derived view ----

    /// Filter then sort the active set's routes.
    pub fn view_routes(&self) -> Vec<&CandidateRoute> {
        let Some(set) = self.active_set() else {
            return Vec::new();
        };
        let filtered = filter_routes(set.routes(), &self.filter, self.registry.constraints());
        sort_routes(filtered, self.filter.sort_key, self.filter.direction)
    }

    /// Recompute the full outbound view.
    pub fn view(&self) -> View<'_> {
        let set = self.active_set();
        let routes = self.view_routes();
        View {
            set_id: self.active.as_ref(),
            origin: set.map(|s| s.origin),
            complete: set.is_some_and(CandidateSet::is_complete),
            total: set.map_or(0, CandidateSet::len),
            cursor: self.cursor.index(),
            has_next: self.cursor.has_next(routes.len()),
            has_prev: self.cursor.has_prev(),
            routes,
            constraints: self.registry.constraints(),
            can_undo: self.registry.can_undo(),
        }
    }

    /// Filtering alone decides the length; sorting only permutes.
    fn view_len(&self) -> usize {
        self.active_set().map_or(0, |set| {
            filter_routes(set.routes(), &self.filter, self.registry.constraints()).len()
        })
    }

    fn reclamp(&mut self) {
        let len = self.view_len();
        self.cursor.clamp(len);
    }
}
