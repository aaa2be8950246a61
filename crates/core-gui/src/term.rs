//! Crossterm-backed driver.
//!
//! One terminal cell is one pixel unit: font metrics are {ascent 1,
//! descent 0, height 1} and a rune's width is its Unicode column width. All
//! pixel math in the windowing core transfers unchanged, just with small
//! numbers.
//!
//! Drawing lands in an in-memory cell grid; `flush` repaints the whole grid
//! through crossterm's command queue (one `MoveTo` + styled `Print` per run
//! of equally-styled cells) and flushes stdout once. Wide runes occupy a
//! leader cell plus continuation cells of width 0, which never print; the
//! terminal's own width handling keeps columns aligned.
//!
//! Construction enables raw mode, the alternate screen and mouse capture;
//! `Drop` restores all three.

use crate::{
    Button, Color, Driver, Event, FontMetrics, Key, Mouse, MouseKind, Paint, Pointer, Rect,
};
use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CtEvent, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Attribute, Color as CtColor, Colors, Print, ResetColor, SetAttribute, SetColors},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use std::collections::VecDeque;
use std::io::{Write, stdout};
use std::time::Duration;
use tracing::debug;
use unicode_width::UnicodeWidthChar;

const FONT: FontMetrics = FontMetrics {
    ascent: 1,
    descent: 0,
    height: 1,
};
const HMARGIN: i32 = 2;
const VMARGIN: i32 = 1;
const BORDER: i32 = 1;
const POLL_INTERVAL: Duration = Duration::from_millis(50);

impl From<Color> for CtColor {
    fn from(c: Color) -> Self {
        CtColor::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    }
}

/// One screen cell. Leaders carry a rune and its column width; continuation
/// cells (width 0) pad out wide runes and print nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Cell {
    rune: char,
    width: u8,
    fg: Color,
    bg: Color,
    reverse: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            rune: ' ',
            width: 1,
            fg: Color::BLACK,
            bg: Color::WHITE,
            reverse: false,
        }
    }
}

impl Cell {
    fn style(&self) -> (Color, Color, bool) {
        (self.fg, self.bg, self.reverse)
    }
}

#[derive(Debug, Clone)]
struct CellGrid {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl CellGrid {
    fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Cell::default(); cols as usize * rows as usize],
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        *self = CellGrid::new(cols, rows);
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.cols && y < self.rows {
            Some(y as usize * self.cols as usize + x as usize)
        } else {
            None
        }
    }

    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.cols as i32, self.rows as i32)
    }

    fn fill(&mut self, clip: Rect, x: i32, y: i32, w: i32, h: i32, paint: Paint) {
        let r = Rect::new(clip.x + x, clip.y + y, w, h)
            .intersect(&clip)
            .intersect(&self.bounds());
        if r.is_empty() {
            return;
        }
        for cy in r.y..r.y + r.h {
            for cx in r.x..r.x + r.w {
                if let Some(idx) = self.index(cx as u16, cy as u16) {
                    match paint {
                        Paint::Solid(c) => {
                            self.cells[idx] = Cell {
                                bg: c,
                                ..Cell::default()
                            };
                        }
                        Paint::Invert => {
                            self.cells[idx].reverse = !self.cells[idx].reverse;
                        }
                    }
                }
            }
        }
    }

    fn draw_text(&mut self, clip: Rect, runes: &[char], x: i32, y: i32, color: Color) {
        let clip = clip.intersect(&self.bounds());
        let row = clip.y + y - FONT.ascent;
        if row < clip.y || row >= clip.y + clip.h {
            return;
        }
        let mut ax = clip.x + x;
        for &r in runes {
            let w = r.width().unwrap_or(0) as i32;
            if w == 0 {
                continue;
            }
            // Skip runes that would stick out of the clip, leader and
            // continuation alike.
            if ax >= clip.x && ax + w <= clip.x + clip.w {
                if let Some(idx) = self.index(ax as u16, row as u16) {
                    let cell = &mut self.cells[idx];
                    cell.rune = r;
                    cell.width = w as u8;
                    cell.fg = color;
                }
                for dx in 1..w {
                    if let Some(idx) = self.index((ax + dx) as u16, row as u16) {
                        let cell = &mut self.cells[idx];
                        cell.rune = ' ';
                        cell.width = 0;
                        cell.fg = color;
                    }
                }
            }
            ax += w;
        }
    }

    /// Repaint the whole grid. Orphaned continuation cells (their leader was
    /// overwritten by a clipped fill) print as blanks so columns stay in
    /// sync.
    fn emit(&self, out: &mut impl Write) -> Result<()> {
        for row in 0..self.rows {
            let mut x = 0u16;
            while x < self.cols {
                let start = x;
                let first = &self.cells[row as usize * self.cols as usize + x as usize];
                let style = first.style();
                let mut run = String::new();
                while x < self.cols {
                    let cell = &self.cells[row as usize * self.cols as usize + x as usize];
                    if cell.style() != style {
                        break;
                    }
                    if cell.width == 0 {
                        run.push(' ');
                        x += 1;
                    } else {
                        run.push(cell.rune);
                        x += cell.width as u16;
                    }
                }
                let (fg, bg, reverse) = style;
                let attr = if reverse {
                    Attribute::Reverse
                } else {
                    Attribute::NoReverse
                };
                queue!(
                    out,
                    MoveTo(start, row),
                    SetAttribute(attr),
                    SetColors(Colors::new(fg.into(), bg.into())),
                    Print(&run)
                )?;
            }
        }
        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
        out.flush()?;
        Ok(())
    }
}

pub struct TermDriver {
    grid: CellGrid,
    pending: VecDeque<Event>,
    pointer: Pointer,
    entered: bool,
}

impl TermDriver {
    /// Claims the terminal (raw mode, alternate screen, mouse capture) and
    /// queues the initial resize event.
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide, EnableMouseCapture)?;
        let (cols, rows) = terminal::size()?;
        debug!(target: "gui.term", cols, rows, "terminal_entered");
        let mut pending = VecDeque::new();
        pending.push_back(Event::Resize {
            width: cols as i32,
            height: rows as i32,
        });
        Ok(Self {
            grid: CellGrid::new(cols, rows),
            pending,
            pointer: Pointer::Normal,
            entered: true,
        })
    }

    fn leave(&mut self) {
        if self.entered {
            let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, Show);
            let _ = disable_raw_mode();
            self.entered = false;
        }
    }
}

impl Drop for TermDriver {
    fn drop(&mut self) {
        self.leave();
    }
}

fn map_key(k: KeyEvent) -> Option<Event> {
    if k.kind == KeyEventKind::Release {
        return None;
    }
    let key = match k.code {
        KeyCode::Char(c) if k.modifiers.contains(KeyModifiers::CONTROL) => Key::Ctrl(c),
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Char('\n'),
        KeyCode::Tab => Key::Char('\t'),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Escape,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::F(n) => Key::F(n),
        _ => return None,
    };
    Some(Event::Key(key))
}

fn map_button(b: MouseButton) -> Button {
    match b {
        MouseButton::Left => Button::Left,
        MouseButton::Middle => Button::Middle,
        MouseButton::Right => Button::Right,
    }
}

fn map_mouse(m: MouseEvent) -> Option<Event> {
    let (kind, button) = match m.kind {
        MouseEventKind::Down(b) => (MouseKind::Down, map_button(b)),
        MouseEventKind::Up(b) => (MouseKind::Up, map_button(b)),
        MouseEventKind::Drag(b) => (MouseKind::Move, map_button(b)),
        // Plain motion carries no button; the kind is what matters downstream.
        MouseEventKind::Moved => (MouseKind::Move, Button::Left),
        MouseEventKind::ScrollUp => (MouseKind::Down, Button::WheelUp),
        MouseEventKind::ScrollDown => (MouseKind::Down, Button::WheelDown),
        _ => return None,
    };
    Some(Event::Mouse(Mouse {
        kind,
        button,
        x: m.column as i32,
        y: m.row as i32,
    }))
}

impl Driver for TermDriver {
    fn font_metrics(&self) -> FontMetrics {
        FONT
    }

    fn text_width(&self, runes: &[char]) -> i32 {
        runes.iter().map(|r| r.width().unwrap_or(0) as i32).sum()
    }

    fn draw_text(&mut self, clip: Rect, runes: &[char], x: i32, y: i32, color: Color) {
        self.grid.draw_text(clip, runes, x, y, color);
    }

    fn fill_rect(&mut self, clip: Rect, x: i32, y: i32, w: i32, h: i32, paint: Paint) {
        self.grid.fill(clip, x, y, w, h, paint);
    }

    fn next_event(&mut self) -> Result<Option<Event>> {
        if let Some(ev) = self.pending.pop_front() {
            return Ok(Some(ev));
        }
        if !event::poll(POLL_INTERVAL)? {
            return Ok(None);
        }
        let ev = match event::read()? {
            CtEvent::Resize(cols, rows) => {
                self.grid.resize(cols, rows);
                debug!(target: "gui.term", cols, rows, "terminal_resized");
                Some(Event::Resize {
                    width: cols as i32,
                    height: rows as i32,
                })
            }
            CtEvent::Key(k) => map_key(k),
            CtEvent::Mouse(m) => map_mouse(m),
            _ => None,
        };
        Ok(ev)
    }

    fn flush(&mut self) -> Result<()> {
        self.grid.emit(&mut stdout())
    }

    fn set_pointer(&mut self, pointer: Pointer) {
        // Terminals have no pointer shape to change; remember it anyway so
        // shape changes are observable in the logs.
        if self.pointer != pointer {
            debug!(target: "gui.term", ?pointer, "pointer_shape");
            self.pointer = pointer;
        }
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
        // Hot zone sits inside the border with a cell of padding.
        Rect::new(0, 0, (HMARGIN - BORDER - 1).max(1), VMARGIN + FONT.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> CellGrid {
        CellGrid::new(20, 4)
    }

    fn cell(g: &CellGrid, x: u16, y: u16) -> &Cell {
        &g.cells[g.index(x, y).unwrap()]
    }

    #[test]
    fn solid_fill_respects_clip() {
        let mut g = grid();
        let clip = Rect::new(2, 1, 5, 2);
        g.fill(clip, 0, 0, 100, 100, Paint::Solid(Color::PALE_YELLOW));
        assert_eq!(cell(&g, 2, 1).bg, Color::PALE_YELLOW);
        assert_eq!(cell(&g, 6, 2).bg, Color::PALE_YELLOW);
        assert_eq!(cell(&g, 7, 1).bg, Color::WHITE);
        assert_eq!(cell(&g, 2, 0).bg, Color::WHITE);
    }

    #[test]
    fn invert_twice_is_identity() {
        let mut g = grid();
        let clip = Rect::new(0, 0, 20, 4);
        g.fill(clip, 3, 1, 2, 1, Paint::Invert);
        assert!(cell(&g, 3, 1).reverse);
        assert!(cell(&g, 4, 1).reverse);
        assert!(!cell(&g, 5, 1).reverse);
        g.fill(clip, 3, 1, 2, 1, Paint::Invert);
        assert!(!cell(&g, 3, 1).reverse);
    }

    #[test]
    fn text_lands_on_baseline_row_and_keeps_background() {
        let mut g = grid();
        let clip = Rect::new(1, 1, 10, 3);
        g.fill(clip, 0, 0, 10, 3, Paint::Solid(Color::PALE_GREEN));
        // Baseline 2 inside the clip => absolute row 2 (ascent 1).
        g.draw_text(clip, &['h', 'i'], 0, 2, Color::BLACK);
        assert_eq!(cell(&g, 1, 2).rune, 'h');
        assert_eq!(cell(&g, 2, 2).rune, 'i');
        assert_eq!(cell(&g, 1, 2).bg, Color::PALE_GREEN);
    }

    #[test]
    fn wide_rune_gets_continuation_cell() {
        let mut g = grid();
        let clip = Rect::new(0, 0, 20, 4);
        g.draw_text(clip, &['漢', 'x'], 0, 1, Color::BLACK);
        assert_eq!(cell(&g, 0, 0).rune, '漢');
        assert_eq!(cell(&g, 0, 0).width, 2);
        assert_eq!(cell(&g, 1, 0).width, 0);
        assert_eq!(cell(&g, 2, 0).rune, 'x');
    }

    #[test]
    fn text_outside_clip_is_dropped() {
        let mut g = grid();
        let clip = Rect::new(0, 0, 3, 2);
        g.draw_text(clip, &['a', 'b', 'c', 'd'], 0, 1, Color::BLACK);
        assert_eq!(cell(&g, 2, 0).rune, 'c');
        assert_eq!(cell(&g, 3, 0).rune, ' ');
        // Row below the clip.
        g.draw_text(clip, &['z'], 0, 3, Color::BLACK);
        assert_eq!(cell(&g, 0, 2).rune, ' ');
    }

    #[test]
    fn emit_prints_runs_and_reverse_attribute() {
        let mut g = CellGrid::new(6, 1);
        let clip = Rect::new(0, 0, 6, 1);
        g.draw_text(clip, &['h', 'i'], 0, 1, Color::BLACK);
        g.fill(clip, 0, 0, 1, 1, Paint::Invert);
        let mut out: Vec<u8> = Vec::new();
        g.emit(&mut out).unwrap();
        let s = String::from_utf8_lossy(&out);
        assert!(s.contains('h'));
        assert!(s.contains('i'));
        // Reverse-video attribute for the inverted cell.
        assert!(s.contains("\x1b[7m"));
    }
}
