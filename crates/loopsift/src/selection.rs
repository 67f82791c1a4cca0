//! Selection registry: the user's region constraints, in declaration order.
//!
//! Append-only with pop-last undo. Constraints are never merged, edited or
//! deduplicated; a zero-mask constraint is legal and filters nothing.

use serde::{Deserialize, Serialize};

use crate::mask::NodeMask;
use crate::route::LatLng;

/// How a constraint's mask is matched against a route's visitation mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintMode {
    /// Route visits every node of the mask.
    StrictInclude,
    /// Route visits at least one node of the mask.
    LooseInclude,
    /// Route visits no node of the mask.
    Exclude,
}

/// Drawing tool that produced the region. Kept for rendering and debugging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTool {
    /// Polyline traced along roads.
    Trace,
    /// Closed polygon.
    Region,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub mode: ConstraintMode,
    pub mask: NodeMask,
    pub source: SourceTool,
    /// Outline as drawn; not used for filtering.
    #[serde(default)]
    pub geometry: Vec<LatLng>,
}

impl Constraint {
    pub fn new(mode: ConstraintMode, mask: NodeMask, source: SourceTool) -> Self {
        Self {
            mode,
            mask,
            source,
            geometry: Vec::new(),
        }
    }

    /// Constraint for a resolved drawing: exclusion wins over the tool, otherwise a
    /// trace is strict and a region is loose.
    pub fn from_region(
        mask: NodeMask,
        tool: SourceTool,
        geometry: Vec<LatLng>,
        is_exclude: bool,
    ) -> Self {
        let mode = match (is_exclude, tool) {
            (true, _) => ConstraintMode::Exclude,
            (false, SourceTool::Trace) => ConstraintMode::StrictInclude,
            (false, SourceTool::Region) => ConstraintMode::LooseInclude,
        };
        Self {
            mode,
            mask,
            source: tool,
            geometry,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionRegistry {
    constraints: Vec<Constraint>,
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Drop the most recent constraint; returns it, or `None` when already empty.
    pub fn undo(&mut self) -> Option<Constraint> {
        self.constraints.pop()
    }

    pub fn clear(&mut self) {
        self.constraints.clear();
    }

    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.constraints.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}
