//! Soft-wrap layout engine.
//!
//! `line_starts` is the one scan every higher operation is built from: the
//! table rebuild stitches unbounded scans, forward scroll consumes them from
//! the front, backward scroll runs bounded scans and consumes them from the
//! back, and cursor reveal runs a bounded scan up to the cursor.
//!
//! Invariants:
//! - `from` must already be a display-line boundary (a true line start or a
//!   wrap point); the scan only ever reports boundaries at or after it.
//! - Unbounded scans always fill the ring: the text source's newline limbo
//!   supplies boundaries past end-of-buffer forever.
//! - Bounded scans report at least `from` itself, and exactly that when
//!   `from == limit`.
//! - Every display line holds at least one rune, so a window narrower than
//!   one rune still makes progress.

use crate::ring::LineRing;
use core_buffer::TextSource;
use core_gui::Driver;

/// Width of one rune for a pen at text-relative x offset `x`. Tabs advance
/// to the next stop, newlines are free, everything else asks the driver.
pub(crate) fn rune_width(driver: &dyn Driver, tabw: i32, r: char, x: i32) -> i32 {
    match r {
        '\t' => tabw - x % tabw,
        '\n' => 0,
        _ => driver.text_width(&[r]),
    }
}

/// Measurement context for the layout passes: the driver (read-only), the
/// pixel tab width, and the horizontal text margin.
pub(crate) struct LayoutCx<'a> {
    pub(crate) driver: &'a dyn Driver,
    pub(crate) tabw: i32,
    pub(crate) hmargin: i32,
}

impl LayoutCx<'_> {
    pub(crate) fn rune_width(&self, r: char, x: i32) -> i32 {
        rune_width(self.driver, self.tabw, r, x)
    }

    /// Scan forward from `from`, recording display-line starts into a ring.
    /// `width` is the window width in pixels; `limit`, when set, is the
    /// offset the scan must not pass (and switches the ring to overwrite).
    pub(crate) fn line_starts(
        &self,
        text: &dyn TextSource,
        width: i32,
        from: usize,
        limit: Option<usize>,
    ) -> LineRing {
        let overwrite = limit.is_some();
        let mut ring = LineRing::new();
        ring.push(from, overwrite);
        let mut x = 0;
        let mut off = from;
        loop {
            let r = text.rune(off);
            let rw = self.rune_width(r, x);
            // Wrap test before the limit test: a limit sitting exactly on a
            // wrap point must still get its boundary recorded, or the caller
            // would land on the previous display line. `x != 0` forces at
            // least one rune per line.
            if self.hmargin + x + rw > width && x != 0 {
                if !ring.push(off, overwrite) {
                    break;
                }
                x = 0;
                continue;
            }
            if limit.is_some_and(|lim| off >= lim) {
                break;
            }
            x += rw;
            off += 1;
            if r == '\n' {
                if !ring.push(off, overwrite) {
                    break;
                }
                x = 0;
            }
        }
        ring
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_buffer::EditBuffer;
    use core_gui::HeadlessDriver;

    // Headless metrics: 8 px runes, hmargin 16. A width of 16 + 8n fits
    // exactly n runes per display line.
    fn fit(n: i32) -> i32 {
        16 + 8 * n
    }

    fn cx(driver: &HeadlessDriver) -> LayoutCx<'_> {
        LayoutCx {
            driver,
            tabw: 8 * 8,
            hmargin: 16,
        }
    }

    #[test]
    fn newlines_bound_lines() {
        let (d, _p) = HeadlessDriver::new();
        let text = EditBuffer::from_str("ab\ncd\n");
        let li = cx(&d).line_starts(&text, fit(80), 0, None);
        assert_eq!(li.len(), 2);
        assert_eq!(li.get(0), 0);
        assert_eq!(li.get(1), 3);
    }

    #[test]
    fn long_line_wraps_at_window_width() {
        let (d, _p) = HeadlessDriver::new();
        let text = EditBuffer::from_str(&"x".repeat(30));
        let li = cx(&d).line_starts(&text, fit(10), 0, None);
        assert_eq!(li.get(0), 0);
        assert_eq!(li.get(1), 10);
    }

    #[test]
    fn limbo_supplies_boundaries_past_the_end() {
        let (d, _p) = HeadlessDriver::new();
        let text = EditBuffer::from_str("ab");
        // No newline in the buffer; the scan still fills the ring.
        let li = cx(&d).line_starts(&text, fit(10), 0, None);
        assert_eq!(li.len(), 2);
        assert_eq!(li.get(1), 3);
    }

    #[test]
    fn limit_on_a_wrap_point_records_the_boundary() {
        let (d, _p) = HeadlessDriver::new();
        let text = EditBuffer::from_str(&"x".repeat(30));
        // 10 runes per line; offset 20 is the second wrap point.
        let li = cx(&d).line_starts(&text, fit(10), 0, Some(20));
        assert_eq!(li.last(), 20);
        assert_eq!(li.get(0), 10);
    }

    #[test]
    fn limit_equal_to_from_yields_only_the_origin() {
        let (d, _p) = HeadlessDriver::new();
        let text = EditBuffer::from_str("hello");
        let li = cx(&d).line_starts(&text, fit(10), 3, Some(3));
        assert_eq!(li.len(), 1);
        assert_eq!(li.get(0), 3);
    }

    #[test]
    fn limit_keeps_the_boundaries_nearest_it() {
        let (d, _p) = HeadlessDriver::new();
        let text = EditBuffer::from_str(&"x".repeat(100));
        // Boundaries before 95: 10, 20, ..., 90. Overwrite keeps the last two
        // (ring holds the origin too only while it survives).
        let li = cx(&d).line_starts(&text, fit(10), 0, Some(95));
        assert_eq!(li.len(), 2);
        assert_eq!(li.get(0), 80);
        assert_eq!(li.get(1), 90);
    }

    #[test]
    fn window_narrower_than_a_rune_still_progresses() {
        let (d, _p) = HeadlessDriver::new();
        let text = EditBuffer::from_str("abc");
        // Width below hmargin + one rune: every line carries one rune.
        let li = cx(&d).line_starts(&text, 20, 0, None);
        assert_eq!(li.get(0), 0);
        assert_eq!(li.get(1), 1);
    }

    #[test]
    fn tab_advances_to_the_next_stop() {
        let (d, _p) = HeadlessDriver::new();
        let c = cx(&d);
        // Tab stop: 8 runes = 64 px. Pen at column 3 (24 px) advances 40 px.
        assert_eq!(c.rune_width('\t', 24), 40);
        assert_eq!(c.rune_width('\t', 0), 64);
        assert_eq!(c.rune_width('\t', 63), 1);
        assert_eq!(c.rune_width('\n', 24), 0);
        assert_eq!(c.rune_width('q', 24), 8);
    }

    #[test]
    fn wide_runes_wrap_by_measured_width() {
        let (d, _p) = HeadlessDriver::new();
        // 漢 measures 16 px; three per 48 px of text space.
        let text = EditBuffer::from_str(&"漢".repeat(8));
        let li = cx(&d).line_starts(&text, fit(6), 0, None);
        assert_eq!(li.get(0), 0);
        assert_eq!(li.get(1), 3);
    }
}
