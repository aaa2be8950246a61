//! Bounded ring of display-line start offsets.
//!
//! The layout engine records line boundaries here as it scans. The capacity
//! bound is what keeps scans over arbitrarily long documents cheap; the two
//! overflow policies are what let one scan routine serve both directions:
//!
//! - overwrite on: the ring keeps the *last* `RING_SIZE` boundaries seen
//!   (backward scroll wants the boundaries nearest its limit);
//! - overwrite off: a refused push stops the scan, keeping the *first*
//!   `RING_SIZE` boundaries (forward scroll and table rebuilds consume from
//!   the front).
//!
//! Invariants:
//! - `len <= RING_SIZE`; `get(0)` is the oldest surviving entry,
//!   `get(len - 1)` the newest.
//! - Entries appear in scan order and are non-decreasing.

/// Ring capacity. Two is the minimum that works: a scan's starting offset
/// plus at least one boundary past it.
pub(crate) const RING_SIZE: usize = 2;

const _: () = assert!(RING_SIZE >= 2, "a scan needs its origin plus one boundary");

#[derive(Debug, Clone)]
pub(crate) struct LineRing {
    slots: [usize; RING_SIZE],
    beg: usize,
    len: usize,
}

impl LineRing {
    pub(crate) fn new() -> Self {
        Self {
            slots: [0; RING_SIZE],
            beg: 0,
            len: 0,
        }
    }

    /// Append `off`. With `overwrite` a full ring drops its oldest entry and
    /// the push succeeds; without it a full ring refuses and returns false.
    pub(crate) fn push(&mut self, off: usize, overwrite: bool) -> bool {
        if self.len == RING_SIZE {
            if !overwrite {
                return false;
            }
            self.slots[self.beg] = off;
            self.beg = (self.beg + 1) % RING_SIZE;
        } else {
            self.slots[(self.beg + self.len) % RING_SIZE] = off;
            self.len += 1;
        }
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Entry `i` in age order, oldest first.
    pub(crate) fn get(&self, i: usize) -> usize {
        debug_assert!(i < self.len, "ring index {i} out of {} entries", self.len);
        self.slots[(self.beg + i) % RING_SIZE]
    }

    pub(crate) fn last(&self) -> usize {
        debug_assert!(self.len > 0, "empty ring has no last entry");
        self.get(self.len - 1)
    }
}
