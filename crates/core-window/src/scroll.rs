//! Viewport motion by whole display lines.
//!
//! Only the top offset moves here; the caller rebuilds the line table and
//! repaints afterwards. Backward motion is the interesting half: there is no
//! backward layout, so each round lays out the previous true line forward,
//! bounded by the current top, and consumes the recorded boundaries from the
//! newest backward. The ring's overwrite policy keeps exactly the boundaries
//! nearest the top, which are the ones a small scroll needs; larger scrolls
//! simply run more rounds.

use crate::layout::LayoutCx;
use crate::window::Window;
use core_buffer::TextSource;

pub(crate) fn scroll_window(cx: &LayoutCx, text: &dyn TextSource, w: &mut Window, n: i32) {
    let mut n = n;
    let mut start = w.top();
    if n < 0 {
        while n < 0 && start != 0 {
            let bol = text.line_start(start - 1);
            let li = cx.line_starts(text, w.rect.w, bol, Some(start - 1));
            let mut i = li.len();
            while n < 0 && i > 0 {
                i -= 1;
                start = li.get(i);
                debug_assert!(start < w.top(), "backward scroll must move above the old top");
                n += 1;
            }
        }
    } else {
        while n > 0 {
            let li = cx.line_starts(text, w.rect.w, start, None);
            assert!(li.len() >= 2, "unbounded layout scan returned a single boundary");
            let mut i = 1;
            while n > 0 && i < li.len() {
                start = li.get(i);
                i += 1;
                n -= 1;
            }
        }
    }
    w.l[0] = start;
}
