//! The windowing context: registry, frame division, tag overlay, and the
//! operations the event loop drives.
//!
//! All mutable state lives here: the driver, the slot array, the tag.
//! Operations that lay text out borrow the driver immutably (measurement);
//! operations that paint borrow it mutably. Both run against the same
//! destructured fields, so the borrow checker enforces the measure/paint
//! split instead of a convention.
//!
//! Invariants:
//! - `tag.state` never names an empty slot: destroying the tag's owner hides
//!   the tag first.
//! - A placed window's table always holds `nl + 1` entries; `update` runs on
//!   every geometry change, scroll, and reveal before anything repaints.
//! - Frame division only happens over occupied slots and asserts a positive
//!   weight total.

use crate::draw::{self, PaintCx};
use crate::layout::LayoutCx;
use crate::scroll;
use crate::window::Window;
use crate::{CursorLoc, MAX_HEIGHT, MAX_WINDOWS, TagState, WindowId};
use core_buffer::{BufferId, BufferSource};
use core_gui::{Color, Driver, FontMetrics, Rect};
use std::ops::Range;
use tracing::{debug, info, trace};

struct Tag {
    win: Window,
    state: TagState,
}

pub struct WindowManager {
    driver: Box<dyn Driver>,
    font: FontMetrics,
    tabw: i32,
    hmargin: i32,
    vmargin: i32,
    frame_w: i32,
    frame_h: i32,
    wins: [Option<Window>; MAX_WINDOWS],
    tag: Tag,
}

fn lookup<'a>(wins: &'a [Option<Window>; MAX_WINDOWS], tag: &'a Tag, id: WindowId) -> &'a Window {
    match id {
        WindowId::Slot(i) => {
            let Some(w) = wins[i].as_ref() else {
                panic!("window slot {i} is empty");
            };
            w
        }
        WindowId::Tag => &tag.win,
    }
}

fn lookup_mut<'a>(
    wins: &'a mut [Option<Window>; MAX_WINDOWS],
    tag: &'a mut Tag,
    id: WindowId,
) -> &'a mut Window {
    match id {
        WindowId::Slot(i) => {
            let Some(w) = wins[i].as_mut() else {
                panic!("window slot {i} is empty");
            };
            w
        }
        WindowId::Tag => &mut tag.win,
    }
}

impl WindowManager {
    /// Build the context around an injected driver. `tag_buffer` is the
    /// dedicated buffer the tag window views; `tab_stop` is in runes.
    ///
    /// The frame starts at a placeholder size; the driver's initial resize
    /// event supplies the real one before anything is shown.
    pub fn new(driver: Box<dyn Driver>, tag_buffer: BufferId, tab_stop: u32) -> Self {
        let font = driver.font_metrics();
        assert!(font.height > 0, "driver reported a degenerate font height");
        let tabw = tab_stop as i32 * driver.text_width(&[' ']);
        assert!(tabw > 0, "tab stops need a positive space width");
        let hmargin = driver.hmargin();
        let vmargin = driver.vmargin();
        debug!(target: "window", tabw, hmargin, vmargin, "window_manager_ready");
        Self {
            driver,
            font,
            tabw,
            hmargin,
            vmargin,
            frame_w: 10,
            frame_h: 10,
            wins: std::array::from_fn(|_| None),
            tag: Tag {
                win: Window::new(tag_buffer, Rect::new(0, 0, 0, 0)),
                state: TagState::Hidden,
            },
        }
    }

    /// Claim the first free slot for a window onto `buffer`. `None` when the
    /// registry is full.
    pub fn create(&mut self, buffer: BufferId) -> Option<WindowId> {
        let slot = self.wins.iter().position(|w| w.is_none())?;
        let rect = Rect::new(0, 0, self.frame_w, self.frame_h);
        self.wins[slot] = Some(Window::new(buffer, rect));
        info!(target: "window", slot, "window_created");
        Some(WindowId::Slot(slot))
    }

    /// Free a window slot. A tag visible for the dying window is hidden
    /// first; the vacated screen region repaints on the next frame redraw.
    pub fn destroy(&mut self, id: WindowId) {
        let WindowId::Slot(slot) = id else {
            panic!("the tag window cannot be destroyed");
        };
        assert!(self.wins[slot].is_some(), "destroy of empty window slot {slot}");
        if self.tag.state == TagState::VisibleFor(id) {
            self.tag.state = TagState::Hidden;
        }
        self.wins[slot] = None;
        info!(target: "window", slot, "window_destroyed");
    }

    /// Place a window at `(x, 0)` with size `w`×`h`, rebuild its line table
    /// and repaint it (plus a tag overlaying it). Zero `w` or `h` keeps the
    /// geometry: a pure rebuild-and-repaint.
    pub fn move_window(&mut self, bufs: &dyn BufferSource, id: WindowId, x: i32, w: i32, h: i32) {
        {
            let Self {
                driver,
                wins,
                tag,
                font,
                tabw,
                hmargin,
                vmargin,
                ..
            } = self;
            let win = lookup_mut(wins, tag, id);
            if w != 0 && h != 0 {
                win.rect = Rect::new(x, 0, w, h);
                win.nl = ((h - *vmargin).max(0) / font.height) as usize;
                assert!(
                    win.nl < MAX_HEIGHT,
                    "window would show {} lines, limit is {MAX_HEIGHT}",
                    win.nl
                );
                win.l.resize(win.nl + 1, 0);
            }
            let cx = LayoutCx {
                driver: driver.as_ref(),
                tabw: *tabw,
                hmargin: *hmargin,
            };
            draw::update(&cx, bufs.text(win.buffer), win);
        }
        self.paint_with_overlay(bufs, id);
    }

    /// Rebuild a window's line table and repaint it, geometry unchanged.
    pub fn redraw(&mut self, bufs: &dyn BufferSource, id: WindowId) {
        self.move_window(bufs, id, 0, 0, 0);
    }

    /// Adopt a new frame size (zeros keep the stored one) and divide the
    /// width among occupied slots by weight: contiguous strips, full height,
    /// integer shares. A visible tag is re-placed on its owner's new strip.
    pub fn resize_frame(&mut self, bufs: &dyn BufferSource, w: i32, h: i32) {
        if w != 0 && h != 0 {
            self.frame_w = w;
            self.frame_h = h;
        }
        let occupied: Vec<usize> = (0..MAX_WINDOWS).filter(|&i| self.wins[i].is_some()).collect();
        if occupied.is_empty() {
            return;
        }
        let total: i64 = occupied
            .iter()
            .map(|&i| i64::from(self.weight(WindowId::Slot(i))))
            .sum();
        assert!(total > 0, "total window weight must be positive");
        debug!(
            target: "window.frame",
            width = self.frame_w,
            height = self.frame_h,
            windows = occupied.len(),
            "frame_resized"
        );
        let mut x = 0;
        for &i in &occupied {
            let id = WindowId::Slot(i);
            let share = i64::from(self.frame_w) * i64::from(self.weight(id)) / total;
            let ww = share as i32;
            self.move_window(bufs, id, x, ww, self.frame_h);
            x += ww;
            if self.tag.state == TagState::VisibleFor(id) {
                // Re-place the overlay on the freshly moved strip.
                self.tag.state = TagState::Hidden;
                self.toggle_tag(bufs, id);
            }
        }
    }

    /// Repaint every window at the stored frame size.
    pub fn redraw_frame(&mut self, bufs: &dyn BufferSource) {
        self.resize_frame(bufs, 0, 0);
    }

    /// Move the viewport by `n` display lines (negative is toward offset 0),
    /// rebuild the table and repaint. `n == 0` does nothing.
    pub fn scroll(&mut self, bufs: &dyn BufferSource, id: WindowId, n: i32) {
        if n == 0 {
            return;
        }
        {
            let Self {
                driver,
                wins,
                tag,
                tabw,
                hmargin,
                ..
            } = self;
            let win = lookup_mut(wins, tag, id);
            let cx = LayoutCx {
                driver: driver.as_ref(),
                tabw: *tabw,
                hmargin: *hmargin,
            };
            let text = bufs.text(win.buffer);
            scroll::scroll_window(&cx, text, win, n);
            draw::update(&cx, text, win);
        }
        trace!(target: "window.scroll", ?id, n, "viewport_scrolled");
        self.paint_with_overlay(bufs, id);
    }

    /// Bring the cursor's display line on screen at the requested place,
    /// then rebuild and repaint through the scroll path.
    pub fn show_cursor(&mut self, bufs: &dyn BufferSource, id: WindowId, loc: CursorLoc) {
        let delta = {
            let Self {
                driver,
                wins,
                tag,
                tabw,
                hmargin,
                ..
            } = self;
            let win = lookup_mut(wins, tag, id);
            let cx = LayoutCx {
                driver: driver.as_ref(),
                tabw: *tabw,
                hmargin: *hmargin,
            };
            let text = bufs.text(win.buffer);
            let bol = text.line_start(win.cursor);
            let li = cx.line_starts(text, win.rect.w, bol, Some(win.cursor));
            win.l[0] = li.last();
            let nl = win.nl as i32;
            match loc {
                CursorLoc::Top => 0,
                CursorLoc::Middle => -(nl / 2),
                CursorLoc::Bottom => -(nl - 1),
            }
        };
        trace!(target: "window.scroll", ?id, ?loc, "cursor_revealed");
        if delta != 0 {
            self.scroll(bufs, id, delta);
        } else {
            self.redraw(bufs, id);
        }
    }

    /// One shared tag window. Toggling for the current owner hides it;
    /// toggling for anyone else moves it onto the top third of that window.
    /// Toggling "for the tag" only ever hides.
    pub fn toggle_tag(&mut self, bufs: &dyn BufferSource, id: WindowId) {
        if let TagState::VisibleFor(owner) = self.tag.state {
            self.tag.state = TagState::Hidden;
            debug!(target: "window.tag", ?owner, "tag_hidden");
            self.redraw(bufs, owner);
            if owner == id || id == WindowId::Tag {
                return;
            }
        }
        if id == WindowId::Tag {
            return;
        }
        let rect = lookup(&self.wins, &self.tag, id).rect;
        self.tag.state = TagState::VisibleFor(id);
        debug!(target: "window.tag", owner = ?id, "tag_shown");
        self.move_window(bufs, WindowId::Tag, rect.x, rect.w, rect.h / 3);
    }

    fn paint_with_overlay(&mut self, bufs: &dyn BufferSource, id: WindowId) {
        self.paint(bufs, id);
        if self.tag.state == TagState::VisibleFor(id) {
            self.paint(bufs, WindowId::Tag);
        }
    }

    fn paint(&mut self, bufs: &dyn BufferSource, id: WindowId) {
        // A hidden tag owns no pixels; its stale rectangle belongs to the
        // window underneath.
        if id == WindowId::Tag && self.tag.state == TagState::Hidden {
            return;
        }
        let bg = match id {
            WindowId::Tag => Color::PALE_GREEN,
            WindowId::Slot(_) => Color::PALE_YELLOW,
        };
        let Self {
            driver,
            wins,
            tag,
            font,
            tabw,
            hmargin,
            vmargin,
            ..
        } = self;
        let win = lookup(wins, tag, id);
        let mut pcx = PaintCx {
            driver: driver.as_mut(),
            font: *font,
            tabw: *tabw,
            hmargin: *hmargin,
            vmargin: *vmargin,
        };
        draw::draw(&mut pcx, win, bufs.text(win.buffer), bg);
    }

    pub fn cursor(&self, id: WindowId) -> usize {
        self.win(id).cursor
    }

    /// Set the cursor offset. Offsets past the buffer are allowed (the
    /// caret just sits in the blank lines); no repaint happens here.
    pub fn set_cursor(&mut self, id: WindowId, off: usize) {
        let Self { wins, tag, .. } = self;
        lookup_mut(wins, tag, id).cursor = off;
    }

    /// Visible offsets, `[top, one-past-last)`.
    pub fn visible_range(&self, id: WindowId) -> Range<usize> {
        self.win(id).visible()
    }

    /// The line-start table (diagnostics and tests).
    pub fn line_table(&self, id: WindowId) -> &[usize] {
        &self.win(id).l
    }

    pub fn visible_lines(&self, id: WindowId) -> usize {
        self.win(id).nl
    }

    pub fn rect(&self, id: WindowId) -> Rect {
        self.win(id).rect
    }

    pub fn buffer_of(&self, id: WindowId) -> BufferId {
        self.win(id).buffer
    }

    pub fn weight(&self, id: WindowId) -> u32 {
        self.win(id).weight
    }

    /// Adjust a window's share of the frame; takes effect on the next frame
    /// division.
    pub fn set_weight(&mut self, id: WindowId, weight: u32) {
        assert!(weight > 0, "window weight must be positive");
        let Self { wins, tag, .. } = self;
        lookup_mut(wins, tag, id).weight = weight;
    }

    pub fn tag_state(&self) -> TagState {
        self.tag.state
    }

    pub fn tag_owner(&self) -> Option<WindowId> {
        match self.tag.state {
            TagState::VisibleFor(owner) => Some(owner),
            TagState::Hidden => None,
        }
    }

    /// Occupied user slots, in slot order.
    pub fn windows(&self) -> impl Iterator<Item = WindowId> + '_ {
        (0..MAX_WINDOWS)
            .filter(|&i| self.wins[i].is_some())
            .map(WindowId::Slot)
    }

    /// Window under a frame pixel, overlay first.
    pub fn window_at(&self, x: i32, y: i32) -> Option<WindowId> {
        if matches!(self.tag.state, TagState::VisibleFor(_)) && self.tag.win.rect.contains(x, y) {
            return Some(WindowId::Tag);
        }
        self.windows().find(|&id| self.win(id).rect.contains(x, y))
    }

    pub fn frame_size(&self) -> (i32, i32) {
        (self.frame_w, self.frame_h)
    }

    /// The injected driver, for the event loop (event retrieval, flushing).
    pub fn driver_mut(&mut self) -> &mut dyn Driver {
        self.driver.as_mut()
    }

    fn win(&self, id: WindowId) -> &Window {
        lookup(&self.wins, &self.tag, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_buffer::BufferStore;
    use core_gui::HeadlessDriver;

    fn mk(text: &str) -> (WindowManager, BufferStore, BufferId) {
        let mut store = BufferStore::new();
        let tag_buf = store.create();
        let buf = store.create_from_str(text);
        let (driver, _probe) = HeadlessDriver::new();
        let wm = WindowManager::new(Box::new(driver), tag_buf, 8);
        (wm, store, buf)
    }

    #[test]
    fn create_fills_slots_in_order_until_full() {
        let (mut wm, _store, buf) = mk("hello\n");
        for i in 0..MAX_WINDOWS {
            assert_eq!(wm.create(buf), Some(WindowId::Slot(i)));
        }
        assert_eq!(wm.create(buf), None);
    }

    #[test]
    fn destroy_frees_the_slot_for_reuse() {
        let (mut wm, _store, buf) = mk("hello\n");
        let a = wm.create(buf).unwrap();
        let b = wm.create(buf).unwrap();
        wm.destroy(a);
        assert_eq!(wm.windows().collect::<Vec<_>>(), vec![b]);
        assert_eq!(wm.create(buf), Some(a));
    }

    #[test]
    #[should_panic(expected = "empty")]
    fn destroy_of_empty_slot_is_a_caller_bug() {
        let (mut wm, _store, _buf) = mk("");
        wm.destroy(WindowId::Slot(0));
    }

    #[test]
    #[should_panic(expected = "tag")]
    fn destroy_of_the_tag_is_a_caller_bug() {
        let (mut wm, _store, _buf) = mk("");
        wm.destroy(WindowId::Tag);
    }

    #[test]
    #[should_panic(expected = "empty")]
    fn lookup_of_empty_slot_is_a_caller_bug() {
        let (mut wm, _store, buf) = mk("hi");
        let id = wm.create(buf).unwrap();
        wm.destroy(id);
        let _ = wm.cursor(id);
    }

    #[test]
    #[should_panic(expected = "weight")]
    fn zero_weight_is_refused() {
        let (mut wm, _store, buf) = mk("hi");
        let id = wm.create(buf).unwrap();
        wm.set_weight(id, 0);
    }

    #[test]
    fn destroying_the_tag_owner_hides_the_tag() {
        let (mut wm, store, buf) = mk("hello\n");
        let id = wm.create(buf).unwrap();
        wm.resize_frame(&store, 640, 480);
        wm.toggle_tag(&store, id);
        assert_eq!(wm.tag_owner(), Some(id));
        wm.destroy(id);
        assert_eq!(wm.tag_owner(), None);
    }

    #[test]
    fn window_at_prefers_the_overlay() {
        let (mut wm, store, buf) = mk("hello\n");
        let id = wm.create(buf).unwrap();
        wm.resize_frame(&store, 600, 300);
        assert_eq!(wm.window_at(10, 10), Some(id));
        wm.toggle_tag(&store, id);
        assert_eq!(wm.window_at(10, 10), Some(WindowId::Tag));
        // Below the overlay's third it is the owner again.
        assert_eq!(wm.window_at(10, 200), Some(id));
        assert_eq!(wm.window_at(700, 10), None);
    }

    #[test]
    fn cursor_roundtrip_and_limbo_offsets() {
        let (mut wm, _store, buf) = mk("ab");
        let id = wm.create(buf).unwrap();
        assert_eq!(wm.cursor(id), 0);
        wm.set_cursor(id, 17);
        assert_eq!(wm.cursor(id), 17);
    }
}
