//! Per-window state.

use crate::DEFAULT_WEIGHT;
use core_buffer::BufferId;
use core_gui::Rect;
use std::ops::Range;

/// One pane: a rectangle onto a buffer, described by its line-start table.
///
/// `l` always holds `nl + 1` entries once the window has been placed:
/// `l[0]` is the top of the viewport, `l[i]` begins display line `i`, and
/// `l[nl]` is one past the last visible rune. A freshly created window has
/// `nl == 0` until the first frame layout reaches it.
#[derive(Debug, Clone)]
pub(crate) struct Window {
    pub(crate) buffer: BufferId,
    pub(crate) rect: Rect,
    pub(crate) cursor: usize,
    pub(crate) nl: usize,
    pub(crate) l: Vec<usize>,
    pub(crate) weight: u32,
}

impl Window {
    pub(crate) fn new(buffer: BufferId, rect: Rect) -> Self {
        Self {
            buffer,
            rect,
            cursor: 0,
            nl: 0,
            l: vec![0],
            weight: DEFAULT_WEIGHT,
        }
    }

    pub(crate) fn top(&self) -> usize {
        self.l[0]
    }

    /// Visible offsets, `[top, one-past-last)`. Empty while `nl == 0`.
    pub(crate) fn visible(&self) -> Range<usize> {
        self.l[0]..self.l[self.nl]
    }
}
