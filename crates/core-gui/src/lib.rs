//! Graphics and input driver contract.
//!
//! The windowing core never talks to a concrete backend; it measures and
//! draws through the [`Driver`] trait object injected at startup. Coordinates
//! are pixels. Drawing calls take positions relative to a clip rectangle's
//! origin and the driver offsets and clips them, so a window repaint never
//! needs to know where its strip sits in the frame.
//!
//! Two drivers ship here:
//! - [`TermDriver`]: crossterm backend where one terminal cell is one pixel
//!   unit (font height 1, rune width = Unicode column width).
//! - [`HeadlessDriver`]: recording driver for tests and benches with X11-like
//!   metrics (12 px font, 8 px runes), so layout math is exercised on
//!   realistic numbers.

use anyhow::Result;

pub mod headless;
pub mod term;

pub use headless::{DrawOp, HeadlessDriver, HeadlessProbe};
pub use term::TermDriver;

/// Pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    /// Intersection; a result with non-positive width or height is empty.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = (self.x + self.w).min(other.x + other.w);
        let b = (self.y + self.h).min(other.y + other.h);
        Rect::new(x, y, r - x, b - y)
    }
}

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Window body background.
    pub const PALE_YELLOW: Color = Color::rgb(255, 255, 234);
    /// Tag overlay background.
    pub const PALE_GREEN: Color = Color::rgb(234, 255, 234);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Fill style for [`Driver::fill_rect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Solid(Color),
    /// Invert destination pixels; inverting twice restores them. Used for the
    /// cursor caret so the glyph underneath stays readable.
    Invert,
}

/// Vertical font geometry. `height == ascent + descent`; text y coordinates
/// are baselines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub ascent: i32,
    pub descent: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pointer {
    #[default]
    Normal,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    F(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseKind {
    Down,
    Up,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mouse {
    pub kind: MouseKind,
    pub button: Button,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// New frame size in pixels. Real backends emit one of these as their
    /// first event so initial layout flows through the ordinary event path.
    Resize { width: i32, height: i32 },
    Key(Key),
    Mouse(Mouse),
}

/// The seam between the windowing core and a concrete graphics backend.
///
/// Lifecycle is constructor/`Drop`; a driver that claims the terminal or a
/// display connection restores it when dropped, panics included.
pub trait Driver {
    fn font_metrics(&self) -> FontMetrics;

    /// Measured pixel width of a rune sequence. Must be position-independent;
    /// tabs and newlines never reach this (the layout engine prices them).
    fn text_width(&self, runes: &[char]) -> i32;

    /// Draw runes at baseline `(x, y)` relative to `clip`'s origin, clipped
    /// to it.
    fn draw_text(&mut self, clip: Rect, runes: &[char], x: i32, y: i32, color: Color);

    /// Fill a rectangle relative to `clip`'s origin, clipped to it.
    fn fill_rect(&mut self, clip: Rect, x: i32, y: i32, w: i32, h: i32, paint: Paint);

    /// Next pending input event, or `None` when nothing arrived within the
    /// driver's polling interval.
    fn next_event(&mut self) -> Result<Option<Event>>;

    /// Present everything drawn since the last flush.
    fn flush(&mut self) -> Result<()>;

    fn set_pointer(&mut self, pointer: Pointer);

    /// Horizontal pixel margin between a window's edge and its text.
    fn hmargin(&self) -> i32;

    /// Vertical pixel margin above the first text line.
    fn vmargin(&self) -> i32;

    /// Border width between window strips.
    fn border(&self) -> i32;

    /// Top-left hot zone, sized from the margins and font height.
    fn action_rect(&self) -> Rect;
}
