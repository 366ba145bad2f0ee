//! Edit primitives shared by incremental reparsing and re-annotation.
//!
//! A [`TextChange`] describes one content-change event in byte offsets of the
//! text *before* the change. A [`ChangeMarker`] turns it into the region whose
//! syntax and annotations cannot be carried over, plus the delta used to shift
//! everything after it.

use crate::Span;

/// A single replacement of `[start, old_end)` in the old text with `new_len`
/// bytes of new text.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TextChange {
    /// Start byte offset in old text.
    pub start: u32,
    /// End byte offset in old text (exclusive).
    pub old_end: u32,
    /// Length of replacement text in bytes.
    pub new_len: u32,
}

impl TextChange {
    #[inline]
    pub const fn new(start: u32, old_end: u32, new_len: u32) -> Self {
        TextChange {
            start,
            old_end,
            new_len,
        }
    }

    /// Insertion of `len` bytes at `at`.
    #[inline]
    pub const fn insert(at: u32, len: u32) -> Self {
        TextChange::new(at, at, len)
    }

    /// Deletion of `len` bytes starting at `start`.
    #[inline]
    pub const fn delete(start: u32, len: u32) -> Self {
        TextChange::new(start, start + len, 0)
    }

    /// Net change in document length.
    #[inline]
    pub fn delta(&self) -> i64 {
        i64::from(self.new_len) - i64::from(self.old_end - self.start)
    }

    #[inline]
    pub const fn old_len(&self) -> u32 {
        self.old_end - self.start
    }

    /// End of the replacement in the new text.
    #[inline]
    pub const fn new_end(&self) -> u32 {
        self.start + self.new_len
    }

    /// The replaced region in old-text coordinates.
    #[inline]
    pub const fn old_span(&self) -> Span {
        Span::new(self.start, self.old_end)
    }

    /// The inserted region in new-text coordinates.
    #[inline]
    pub const fn new_span(&self) -> Span {
        Span::new(self.start, self.new_end())
    }
}

/// Region of the old text invalidated by a change.
///
/// Nodes entirely before the region are reused as-is; nodes entirely after
/// it are reused after shifting by `delta`; anything intersecting it must be
/// rebuilt.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ChangeMarker {
    /// Start of the affected region.
    pub affected_start: u32,
    /// End of the affected region in the old text.
    pub affected_end: u32,
    /// Position adjustment for positions at or after `affected_end`.
    pub delta: i64,
}

impl ChangeMarker {
    #[inline]
    pub const fn new(affected_start: u32, affected_end: u32, delta: i64) -> Self {
        ChangeMarker {
            affected_start,
            affected_end,
            delta,
        }
    }

    /// Marker covering exactly the replaced region of `change`.
    #[inline]
    pub fn from_change(change: &TextChange) -> Self {
        ChangeMarker::new(change.start, change.old_end, change.delta())
    }

    #[inline]
    pub fn intersects(&self, span: Span) -> bool {
        self.affected_start < span.end && span.start < self.affected_end
    }

    /// Map an old-text position to the new text.
    ///
    /// Positions inside the affected region have no counterpart and are
    /// returned unchanged.
    #[inline]
    pub fn adjust_position(&self, pos: u32) -> u32 {
        if pos < self.affected_end {
            pos
        } else {
            let shifted = i64::from(pos) + self.delta;
            u32::try_from(shifted.max(0)).unwrap_or(u32::MAX)
        }
    }

    /// Map a reusable old span to the new text; `None` if it must be rebuilt.
    ///
    /// A span ending where the region starts lies before the edit and keeps
    /// its end, even for a pure insertion.
    #[inline]
    pub fn adjust_span(&self, span: Span) -> Option<Span> {
        if self.intersects(span) {
            None
        } else if span.end <= self.affected_start && span.start < self.affected_start {
            Some(span)
        } else {
            Some(Span::new(
                self.adjust_position(span.start),
                self.adjust_position(span.end),
            ))
        }
    }
}
