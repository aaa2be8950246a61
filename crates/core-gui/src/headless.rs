//! Recording driver for tests and benches.
//!
//! Metrics mirror the X11 backend this contract was carved out of: a 12 px
//! font (ascent 10, descent 2), 8 px per rune column, hmargin 16, vmargin 2.
//! Layout tests therefore run on the same pixel numbers a real display
//! would produce.
//!
//! The driver half is moved into the window manager; the probe half stays
//! with the test and shares state through an `Rc`, so assertions can read
//! the recorded draw calls and scripts can feed events.

use crate::{Color, Driver, Event, FontMetrics, Paint, Pointer, Rect};
use anyhow::Result;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use unicode_width::UnicodeWidthChar;

const FONT: FontMetrics = FontMetrics {
    ascent: 10,
    descent: 2,
    height: 12,
};
const HMARGIN: i32 = 16;
const VMARGIN: i32 = 2;
const BORDER: i32 = 2;
/// Pixels per rune column; wide runes measure two columns.
const RUNE_COL_W: i32 = 8;

/// One recorded draw call, in the driver's coordinate terms (positions
/// relative to the clip rectangle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Text {
        clip: Rect,
        runes: Vec<char>,
        x: i32,
        y: i32,
        color: Color,
    },
    Fill {
        clip: Rect,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        paint: Paint,
    },
}

#[derive(Default)]
struct State {
    ops: Vec<DrawOp>,
    events: VecDeque<Event>,
    pointer: Pointer,
    rune_w: i32,
}

pub struct HeadlessDriver {
    state: Rc<RefCell<State>>,
}

/// Test-side handle onto a [`HeadlessDriver`]'s recordings.
pub struct HeadlessProbe {
    state: Rc<RefCell<State>>,
}

impl HeadlessDriver {
    pub fn new() -> (Self, HeadlessProbe) {
        Self::with_rune_width(RUNE_COL_W)
    }

    /// Override the per-column rune width (tab stops and wrap points scale
    /// with it).
    pub fn with_rune_width(rune_w: i32) -> (Self, HeadlessProbe) {
        let state = Rc::new(RefCell::new(State {
            rune_w,
            ..State::default()
        }));
        (
            Self {
                state: Rc::clone(&state),
            },
            HeadlessProbe { state },
        )
    }
}

impl HeadlessProbe {
    pub fn ops(&self) -> Vec<DrawOp> {
        self.state.borrow().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.state.borrow_mut().ops.clear();
    }

    /// Queue an event for the driver to hand out.
    pub fn push_event(&self, ev: Event) {
        self.state.borrow_mut().events.push_back(ev);
    }

    pub fn pointer(&self) -> Pointer {
        self.state.borrow().pointer
    }

    /// Recorded text draws only, in order.
    pub fn texts(&self) -> Vec<DrawOp> {
        self.state
            .borrow()
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { .. }))
            .cloned()
            .collect()
    }

    /// Recorded fills only, in order.
    pub fn fills(&self) -> Vec<DrawOp> {
        self.state
            .borrow()
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill { .. }))
            .cloned()
            .collect()
    }
}

impl Driver for HeadlessDriver {
    fn font_metrics(&self) -> FontMetrics {
        FONT
    }

    fn text_width(&self, runes: &[char]) -> i32 {
        let rune_w = self.state.borrow().rune_w;
        runes
            .iter()
            .map(|r| rune_w * r.width().unwrap_or(0) as i32)
            .sum()
    }

    fn draw_text(&mut self, clip: Rect, runes: &[char], x: i32, y: i32, color: Color) {
        self.state.borrow_mut().ops.push(DrawOp::Text {
            clip,
            runes: runes.to_vec(),
            x,
            y,
            color,
        });
    }

    fn fill_rect(&mut self, clip: Rect, x: i32, y: i32, w: i32, h: i32, paint: Paint) {
        self.state
            .borrow_mut()
            .ops
            .push(DrawOp::Fill { clip, x, y, w, h, paint });
    }

    fn next_event(&mut self) -> Result<Option<Event>> {
        Ok(self.state.borrow_mut().events.pop_front())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn set_pointer(&mut self, pointer: Pointer) {
        self.state.borrow_mut().pointer = pointer;
    }

    fn hmargin(&self) -> i32 {
        HMARGIN
    }

    fn vmargin(&self) -> i32 {
        VMARGIN
    }

    fn border(&self) -> i32 {
        BORDER
    }

    fn action_rect(&self) -> Rect {
        Rect::new(0, 0, HMARGIN - BORDER - 1, VMARGIN + FONT.height)
    }
}
