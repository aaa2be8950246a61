//! Line table maintenance and window painting.
//!
//! `update` and `draw` are the two consumers of a window's line-start table:
//! `update` rebuilds `l[1..=nl]` from the top by stitching unbounded layout
//! scans, `draw` walks the visible runes and must find every table entry
//! exactly where the walk reaches it. That cross-check is the assert in the
//! draw loop; it is how table corruption surfaces instead of painting
//! garbage.
//!
//! Text is emitted in fragments: runs of runes sharing a baseline, flushed
//! on row changes, around tabs (the pen jumps, the driver just draws) and
//! whenever a fragment fills. The caret is remembered during the walk and
//! painted last as an inverting fill, so it stays visible over its glyph.

use crate::layout::{self, LayoutCx};
use crate::window::Window;
use core_buffer::TextSource;
use core_gui::{Color, Driver, FontMetrics, Paint, Rect};

/// Longest run of runes handed to the driver in one call.
const MAX_FRAGMENT: usize = 512;
/// Caret width for zero-width runes (newlines, end-of-line positions).
const MIN_CARET_W: i32 = 4;

/// Painting context: the driver (mutably, for draw calls) plus the metrics
/// the pen walk needs.
pub(crate) struct PaintCx<'a> {
    pub(crate) driver: &'a mut dyn Driver,
    pub(crate) font: FontMetrics,
    pub(crate) tabw: i32,
    pub(crate) hmargin: i32,
    pub(crate) vmargin: i32,
}

/// Rebuild `l[1..=nl]` from `l[0]`.
///
/// Each unbounded scan yields the ring's worth of boundaries; copy all but
/// the origin into the table and rescan from the last one copied. The limbo
/// guarantees progress, so a short document just fills the tail of the table
/// with consecutive blank-line offsets.
pub(crate) fn update(cx: &LayoutCx, text: &dyn TextSource, w: &mut Window) {
    let mut l = 1;
    while l <= w.nl {
        let li = cx.line_starts(text, w.rect.w, w.l[l - 1], None);
        assert!(li.len() >= 2, "unbounded layout scan returned a single boundary");
        let mut i = 1;
        while i < li.len() && l <= w.nl {
            w.l[l] = li.get(i);
            i += 1;
            l += 1;
        }
    }
}

/// Paint one window: background, text fragments, then the caret.
pub(crate) fn draw(cx: &mut PaintCx, w: &Window, text: &dyn TextSource, bg: Color) {
    let clip = w.rect;
    cx.driver.fill_rect(clip, 0, 0, clip.w, clip.h, Paint::Solid(bg));

    let mut x = cx.hmargin;
    let mut y = cx.vmargin + cx.font.ascent;
    let mut frag = Fragment::new(x, y);
    let mut caret: Option<(i32, i32, i32)> = None;
    let mut next = 1;
    let mut c = w.l[0];
    let end = w.l[w.nl];
    while c < end {
        if next <= w.nl && c >= w.l[next] {
            assert_eq!(c, w.l[next], "line table out of step with the rune walk");
            x = cx.hmargin;
            y += cx.font.height;
            next += 1;
            frag.flush(cx.driver, clip, x, y);
        }
        let r = text.rune(c);
        let rw = layout::rune_width(&*cx.driver, cx.tabw, r, x - cx.hmargin);
        if c == w.cursor {
            let cw = if rw != 0 { rw } else { MIN_CARET_W };
            caret = Some((x, y - cx.font.ascent, cw));
        }
        x += rw;
        if r == '\t' {
            // Flush after advancing so the next fragment starts at the stop.
            frag.flush(cx.driver, clip, x, y);
        } else if r != '\n' {
            if frag.is_full() {
                // A display line can outgrow one fragment: terminal runes are
                // a single pixel wide and zero-width runes never wrap. Emit
                // the pending run and carry on from the pen.
                frag.flush(cx.driver, clip, x - rw, y);
            }
            frag.push(r);
        }
        c += 1;
    }
    frag.flush(cx.driver, clip, 0, 0);

    if let Some((caret_x, caret_y, caret_w)) = caret {
        cx.driver
            .fill_rect(clip, caret_x, caret_y, caret_w, cx.font.height, Paint::Invert);
    }
}

/// Pending run of runes awaiting one `draw_text` call. `x`, `y` remember the
/// pen position where the run began.
struct Fragment {
    runes: Vec<char>,
    x: i32,
    y: i32,
}

impl Fragment {
    fn new(x: i32, y: i32) -> Self {
        Self {
            runes: Vec::new(),
            x,
            y,
        }
    }

    fn is_full(&self) -> bool {
        self.runes.len() >= MAX_FRAGMENT
    }

    fn push(&mut self, r: char) {
        debug_assert!(self.runes.len() < MAX_FRAGMENT, "fragment pushed past capacity");
        self.runes.push(r);
    }

    /// Emit the pending run (if any) and restart the fragment at `(x, y)`.
    fn flush(&mut self, driver: &mut dyn Driver, clip: Rect, x: i32, y: i32) {
        if !self.runes.is_empty() {
            driver.draw_text(clip, &self.runes, self.x, self.y, Color::BLACK);
            self.runes.clear();
        }
        self.x = x;
        self.y = y;
    }
}
