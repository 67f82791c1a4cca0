use serde::Serialize;

/// Counters for fail-soft events. None of these are errors; they exist so that a
/// misbehaving producer (events out of order, bad masks) is visible somewhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Routes that arrived for a set id nobody created.
    pub orphan_appends: u64,
    pub orphan_completions: u64,
    /// Masks that failed to parse and were treated as zero.
    pub malformed_masks: u64,
    pub zero_mask_constraints: u64,
    pub empty_undos: u64,
}

impl Diagnostics {
    pub fn total(&self) -> u64 {
        self.orphan_appends
            + self.orphan_completions
            + self.malformed_masks
            + self.zero_mask_constraints
            + self.empty_undos
    }
}
