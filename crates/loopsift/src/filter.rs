//! Filter pipeline: numeric ranges, then region constraints.
//!
//! Pure: `filter_routes` borrows its inputs and returns references in input
//! (arrival) order. Stages, in order:
//! 1. distance range (missing distance reads as 0),
//! 2. difficulty range (missing difficulty reads as 1),
//! 3. constraints: union of all exclude masks must not meet the route; every
//!    strict mask must be a subset of the route; every loose mask must meet it.
//!    Zero masks never reject.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::mask::NodeMask;
use crate::route::CandidateRoute;
use crate::selection::{Constraint, ConstraintMode};
use crate::sort::{SortDirection, SortKey};

/// Closed interval `[min, max]`. Infinite bounds serialize as `null`; a `null` or
/// missing bound reads back as unbounded on that side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    #[serde(
        serialize_with = "ser_bound",
        deserialize_with = "de_lower",
        default = "lower_unbounded"
    )]
    pub min: f64,
    #[serde(
        serialize_with = "ser_bound",
        deserialize_with = "de_upper",
        default = "upper_unbounded"
    )]
    pub max: f64,
}

fn lower_unbounded() -> f64 {
    f64::NEG_INFINITY
}

fn upper_unbounded() -> f64 {
    f64::INFINITY
}

fn ser_bound<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    if v.is_finite() {
        s.serialize_some(v)
    } else {
        s.serialize_none()
    }
}

fn de_lower<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NEG_INFINITY))
}

fn de_upper<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::INFINITY))
}

impl NumericRange {
    #[inline]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `[-inf, +inf]`: admits every non-NaN value.
    #[inline]
    pub fn unbounded() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        self.min <= v && v <= self.max
    }
}

/// User-tunable view parameters. This is the only state a preference store may
/// save and restore; it round-trips through serde as an opaque value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    /// Total distance, miles.
    pub distance: NumericRange,
    pub difficulty: NumericRange,
    pub sort_key: SortKey,
    pub direction: SortDirection,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            distance: NumericRange::new(0.0, f64::INFINITY),
            difficulty: NumericRange::new(1.0, 10.0),
            sort_key: SortKey::Arrival,
            direction: SortDirection::Ascending,
        }
    }
}

impl FilterState {
    /// Ranges that admit every route; default sort.
    pub fn full_range() -> Self {
        Self {
            distance: NumericRange::unbounded(),
            difficulty: NumericRange::unbounded(),
            ..Self::default()
        }
    }
}

/// Constraints folded into one pass-ready form: a single exclude union plus the
/// non-zero include masks.
#[derive(Clone, Debug, Default)]
pub struct CompiledConstraints<'a> {
    exclude: NodeMask,
    strict: Vec<&'a NodeMask>,
    loose: Vec<&'a NodeMask>,
}

impl<'a> CompiledConstraints<'a> {
    pub fn compile(constraints: &'a [Constraint]) -> Self {
        let mut out = CompiledConstraints::default();
        for c in constraints.iter().filter(|c| !c.mask.is_zero()) {
            match c.mode {
                ConstraintMode::Exclude => out.exclude.union_in_place(&c.mask),
                ConstraintMode::StrictInclude => out.strict.push(&c.mask),
                ConstraintMode::LooseInclude => out.loose.push(&c.mask),
            }
        }
        out
    }

    pub fn admits(&self, visited: &NodeMask) -> bool {
        !visited.intersects(&self.exclude)
            && self.strict.iter().all(|m| m.is_subset_of(visited))
            && self.loose.iter().all(|m| visited.intersects(m))
    }

    /// True when no constraint can reject anything.
    pub fn is_trivial(&self) -> bool {
        self.exclude.is_zero() && self.strict.is_empty() && self.loose.is_empty()
    }
}

pub fn filter_routes<'r>(
    routes: &'r [CandidateRoute],
    state: &FilterState,
    constraints: &[Constraint],
) -> Vec<&'r CandidateRoute> {
    let compiled = CompiledConstraints::compile(constraints);
    let trivial = compiled.is_trivial();
    routes
        .iter()
        .filter(|r| state.distance.contains(r.metrics.distance_or_default()))
        .filter(|r| state.difficulty.contains(r.metrics.difficulty_or_default()))
        .filter(|r| trivial || compiled.admits(&r.visited))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteMetrics;
    use crate::selection::SourceTool;

    fn route(bits: u64, distance: Option<f64>, difficulty: Option<f64>) -> CandidateRoute {
        let metrics = RouteMetrics {
            total_distance: distance,
            difficulty,
            ..Default::default()
        };
        CandidateRoute::new(NodeMask::from(bits), vec![], metrics, vec![])
    }

    fn three() -> Vec<CandidateRoute> {
        vec![
            route(0b111, Some(1.0), Some(1.0)),
            route(0b101, Some(1.0), Some(1.0)),
            route(0b010, Some(1.0), Some(1.0)),
        ]
    }

    fn ids(v: &[&CandidateRoute]) -> Vec<String> {
        v.iter().map(|r| r.id.0.clone()).collect()
    }

    fn only(mode: ConstraintMode, bits: u64) -> Vec<Constraint> {
        vec![Constraint::new(mode, NodeMask::from(bits), SourceTool::Region)]
    }

    #[test]
    fn strict_include() {
        let routes = three();
        let out = filter_routes(
            &routes,
            &FilterState::full_range(),
            &only(ConstraintMode::StrictInclude, 0b101),
        );
        assert_eq!(ids(&out), ["0x7", "0x5"]);
    }

    #[test]
    fn loose_include() {
        let routes = three();
        let out = filter_routes(
            &routes,
            &FilterState::full_range(),
            &only(ConstraintMode::LooseInclude, 0b010),
        );
        assert_eq!(ids(&out), ["0x2"]);
    }

    #[test]
    fn exclude() {
        let routes = three();
        let out = filter_routes(
            &routes,
            &FilterState::full_range(),
            &only(ConstraintMode::Exclude, 0b100),
        );
        assert_eq!(ids(&out), ["0x5", "0x2"]);
    }

    #[test]
    fn exclude_masks_are_unioned() {
        let routes = three();
        let mut cs = only(ConstraintMode::Exclude, 0b100);
        cs.extend(only(ConstraintMode::Exclude, 0b010));
        let out = filter_routes(&routes, &FilterState::full_range(), &cs);
        assert!(out.is_empty());
    }

    #[test]
    fn includes_are_anded_across_constraints() {
        let routes = three();
        // loose 0b011 admits all three; strict 0b100 only the first two; together the first two.
        let mut cs = only(ConstraintMode::LooseInclude, 0b011);
        cs.extend(only(ConstraintMode::StrictInclude, 0b100));
        let out = filter_routes(&routes, &FilterState::full_range(), &cs);
        assert_eq!(ids(&out), ["0x7", "0x5"]);
        // Two more loose constraints: only a route meeting both of them survives.
        cs.extend(only(ConstraintMode::LooseInclude, 0b010));
        cs.extend(only(ConstraintMode::LooseInclude, 0b001));
        let out = filter_routes(&routes, &FilterState::full_range(), &cs);
        assert_eq!(ids(&out), ["0x7"]);
    }

    #[test]
    fn zero_masks_never_reject() {
        let routes = three();
        for mode in [
            ConstraintMode::StrictInclude,
            ConstraintMode::LooseInclude,
            ConstraintMode::Exclude,
        ] {
            let out = filter_routes(&routes, &FilterState::full_range(), &only(mode, 0));
            assert_eq!(out.len(), 3, "{mode:?}");
        }
        assert!(CompiledConstraints::compile(&only(ConstraintMode::Exclude, 0)).is_trivial());
    }

    #[test]
    fn ranges_are_inclusive_and_defaults_apply() {
        let routes = vec![
            route(1, Some(8.0), Some(10.0)),
            route(2, Some(30.0), Some(1.0)),
            route(3, Some(30.5), Some(5.0)),
            route(4, None, None),
        ];
        let state = FilterState {
            distance: NumericRange::new(8.0, 30.0),
            difficulty: NumericRange::new(1.0, 10.0),
            ..Default::default()
        };
        assert_eq!(ids(&filter_routes(&routes, &state, &[])), ["0x1", "0x2"]);

        // Missing distance reads as 0 and missing difficulty as 1.
        let state = FilterState {
            distance: NumericRange::new(0.0, 0.0),
            difficulty: NumericRange::new(1.0, 1.0),
            ..Default::default()
        };
        assert_eq!(ids(&filter_routes(&routes, &state, &[])), ["0x4"]);
    }

    #[test]
    fn filter_state_round_trips_as_opaque_json() {
        let state = FilterState {
            distance: NumericRange::new(2.0, 12.5),
            sort_key: SortKey::SpatialFlow,
            direction: SortDirection::Descending,
            ..Default::default()
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: FilterState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
        // Unbounded ends survive the trip as nulls.
        let json = serde_json::to_string(&FilterState::default()).unwrap();
        assert!(json.contains(r#""max":null"#));
        let back: FilterState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FilterState::default());
        // Missing fields fall back to defaults.
        let partial: FilterState = serde_json::from_str(r#"{"sort_key":"turns"}"#).unwrap();
        assert_eq!(partial.sort_key, SortKey::Turns);
        assert_eq!(partial.difficulty, NumericRange::new(1.0, 10.0));
    }

    #[test]
    fn missing_bounds_read_as_unbounded() {
        let state: FilterState = serde_json::from_str(r#"{"distance":{"min":2}}"#).unwrap();
        assert_eq!(state.distance, NumericRange::new(2.0, f64::INFINITY));
        let state: FilterState = serde_json::from_str(r#"{"difficulty":{"max":4}}"#).unwrap();
        assert_eq!(state.difficulty, NumericRange::new(f64::NEG_INFINITY, 4.0));
        let open: NumericRange = serde_json::from_str("{}").unwrap();
        assert_eq!(open, NumericRange::unbounded());
    }
}
