//! Navigation cursor over the current filtered-and-sorted view.
//!
//! Index-based, not identity-based: after a filter change the same index may
//! show a different route. Out-of-range indices snap back to 0; there is no
//! wraparound.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
}

impl Cursor {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Re-validate against a recomputed view of length `len`.
    #[inline]
    pub fn clamp(&mut self, len: usize) {
        if self.index >= len {
            self.index = 0;
        }
    }

    /// Explicit reset (sort order changed, so the old index means nothing).
    #[inline]
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Jump to `index`, subject to the usual clamp.
    pub fn set(&mut self, index: usize, len: usize) {
        self.index = index;
        self.clamp(len);
    }

    /// Step forward; no-op on the last item.
    pub fn next(&mut self, len: usize) {
        if self.index + 1 < len {
            self.index += 1;
        }
    }

    /// Step back; no-op on the first item.
    pub fn prev(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    #[inline]
    pub fn has_next(&self, len: usize) -> bool {
        self.index + 1 < len
    }

    #[inline]
    pub fn has_prev(&self) -> bool {
        self.index > 0
    }
}
