//! Window layout and painting for a tiled editor frame.
//!
//! A frame holds up to [`MAX_WINDOWS`] side-by-side window strips plus one
//! shared tag overlay. Each window views a text buffer through a viewport
//! described entirely by its line-start table `l`: `l[0]` is the first
//! visible offset, `l[i]` starts display line `i`, and `l[nl]` bounds the
//! visible text. Every operation here reduces to rebuilding that table with
//! the wrap scan and repainting from it.
//!
//! Invariants:
//! - Line tables are strictly increasing while text remains and all entries
//!   are line-start offsets under the window's own width.
//! - Text never paints inside the margins; the caret never outlives a repaint
//!   (it is redrawn as part of every paint, never toggled).
//! - The tag overlay is painted after its owner whenever the owner repaints.
//!
//! Buffers come in through [`core_buffer::BufferSource`]; pixels go out
//! through [`core_gui::Driver`]. Nothing here knows which backend is real.

mod draw;
mod layout;
mod manager;
mod ring;
mod scroll;
mod window;

pub use manager::WindowManager;

/// Fixed number of user window slots.
pub const MAX_WINDOWS: usize = 6;

/// Upper bound on visible display lines per window; a taller window is a
/// configuration bug, not a layout case.
pub const MAX_HEIGHT: usize = 512;

/// Weight a freshly created window starts with.
pub const DEFAULT_WEIGHT: u32 = 500;

/// Names a window for every [`WindowManager`] operation. Slot ids stay valid
/// until the slot is destroyed; the tag is always addressable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowId {
    Slot(usize),
    Tag,
}

/// Where in the viewport a revealed cursor line lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorLoc {
    Top,
    Middle,
    Bottom,
}

/// Tag overlay visibility. The overlay is a real window; this only records
/// whether it is on screen and whose strip it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagState {
    Hidden,
    VisibleFor(WindowId),
}
