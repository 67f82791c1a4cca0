//! Candidate ingest: generation sessions and their accumulating routes.
//!
//! A producer announces a session (`create_set`), streams routes into it
//! (`append_route`) and closes it (`mark_complete`). Routes keep arrival order;
//! sorting only ever happens in derived views.
//!
//! Fail-soft: appends and completions for unknown sessions are dropped, because
//! the producer's events may race each other. They return `false` so the owner can
//! count them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::route::{CandidateRoute, LatLng};

/// Generation-session identifier, as chosen by the producer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetId(pub String);

impl SetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for SetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The routes generated for one origin.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateSet {
    pub origin: LatLng,
    routes: Vec<CandidateRoute>,
    complete: bool,
}

impl CandidateSet {
    fn new(origin: LatLng) -> Self {
        Self {
            origin,
            routes: Vec::new(),
            complete: false,
        }
    }

    /// Routes in arrival order.
    #[inline]
    pub fn routes(&self) -> &[CandidateRoute] {
        &self.routes
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Session id → candidate set. Sets live until the store is dropped.
#[derive(Clone, Debug, Default)]
pub struct CandidateStore {
    sets: HashMap<SetId, CandidateSet>,
}

impl CandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a session; any previous set under `id` is discarded.
    pub fn create_set(&mut self, id: SetId, origin: LatLng) {
        self.sets.insert(id, CandidateSet::new(origin));
    }

    /// Append in arrival order. Returns `false` (and drops the route) for an unknown id.
    pub fn append_route(&mut self, id: &SetId, route: CandidateRoute) -> bool {
        match self.sets.get_mut(id) {
            Some(set) => {
                set.routes.push(route);
                true
            }
            None => false,
        }
    }

    /// Returns `false` for an unknown id.
    pub fn mark_complete(&mut self, id: &SetId) -> bool {
        match self.sets.get_mut(id) {
            Some(set) => {
                set.complete = true;
                true
            }
            None => false,
        }
    }

    /// Snapshot of a set; `None` for an unknown id or an explicit "no selection".
    pub fn select(&self, id: Option<&SetId>) -> Option<&CandidateSet> {
        id.and_then(|id| self.sets.get(id))
    }

    #[inline]
    pub fn contains(&self, id: &SetId) -> bool {
        self.sets.contains_key(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Known session ids, sorted.
    pub fn ids(&self) -> Vec<&SetId> {
        let mut ids: Vec<&SetId> = self.sets.keys().collect();
        ids.sort();
        ids
    }
}
