//! Rope-based edit buffers behind the narrow text view the windowing core
//! reads through.
//!
//! Offsets everywhere are rune (char) offsets, not bytes. Reads at or past the
//! end of a buffer yield `'\n'` forever; layout code relies on that to find
//! line boundaries without bounds checks, and scrolling past the end walks
//! through those synthetic blank lines.

use ropey::Rope;
use std::ops::Range;

/// Read-only rune access a window layout pass needs from a buffer.
pub trait TextSource {
    /// Rune at `off`. Offsets at or past `len()` read as `'\n'` (the newline
    /// limbo), so every scan eventually meets a line boundary.
    fn rune(&self, off: usize) -> char;

    /// Offset of the first rune of the newline-delimited line containing
    /// `off`. In the limbo every offset is its own line start.
    fn line_start(&self, off: usize) -> usize;

    /// Number of runes stored. Anything at or past this is limbo.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone, Default)]
pub struct EditBuffer {
    rope: Rope,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
        }
    }

    /// Insert `text` at rune offset `off`. Offsets in the limbo clamp to the
    /// end of the buffer.
    pub fn insert(&mut self, off: usize, text: &str) {
        let off = off.min(self.rope.len_chars());
        self.rope.insert(off, text);
    }

    /// Insert a single rune at `off` (clamped like [`EditBuffer::insert`]).
    pub fn insert_rune(&mut self, off: usize, r: char) {
        let off = off.min(self.rope.len_chars());
        self.rope.insert_char(off, r);
    }

    /// Remove the runes in `range` (clamped to the buffer).
    pub fn remove(&mut self, range: Range<usize>) {
        let n = self.rope.len_chars();
        let start = range.start.min(n);
        let end = range.end.min(n);
        if start < end {
            self.rope.remove(start..end);
        }
    }
}

impl TextSource for EditBuffer {
    fn rune(&self, off: usize) -> char {
        if off < self.rope.len_chars() {
            self.rope.char(off)
        } else {
            '\n'
        }
    }

    fn line_start(&self, off: usize) -> usize {
        let n = self.rope.len_chars();
        if off > n {
            // The rune before a limbo offset is always a newline.
            return off;
        }
        self.rope.line_to_char(self.rope.char_to_line(off))
    }

    fn len(&self) -> usize {
        self.rope.len_chars()
    }
}

/// Identifies a buffer inside a [`BufferStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

/// Resolves buffer ids to their text for layout and drawing.
///
/// The windowing core stores [`BufferId`]s, never buffer references, so the
/// store stays freely mutable between layout passes.
pub trait BufferSource {
    fn text(&self, id: BufferId) -> &dyn TextSource;
}

/// Owning collection of buffers. Buffers are created and never dropped;
/// ids are plain indices.
#[derive(Default)]
pub struct BufferStore {
    bufs: Vec<EditBuffer>,
}

impl BufferStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty buffer and return its id.
    pub fn create(&mut self) -> BufferId {
        self.bufs.push(EditBuffer::new());
        BufferId(self.bufs.len() - 1)
    }

    /// Add a buffer seeded with `content` and return its id.
    pub fn create_from_str(&mut self, content: &str) -> BufferId {
        self.bufs.push(EditBuffer::from_str(content));
        BufferId(self.bufs.len() - 1)
    }

    pub fn get(&self, id: BufferId) -> &EditBuffer {
        &self.bufs[id.0]
    }

    pub fn get_mut(&mut self, id: BufferId) -> &mut EditBuffer {
        &mut self.bufs[id.0]
    }
}

impl BufferSource for BufferStore {
    fn text(&self, id: BufferId) -> &dyn TextSource {
        &self.bufs[id.0]
    }
}
