//! Buffer/line data model and primitive edit operations (spec §3, §4.2).
//!
//! Lines live in an arena (`LineList`) addressed by [`LineId`] handles rather
//! than raw pointers (design note §9: "arena-with-indices... reifies the
//! invariant that a mark's line must be live into a bounds-checked index
//! lookup"). A handle stays valid across any edit that merely grows or
//! shrinks the line's byte vector in place; only a line *merge* or *split*
//! retires a handle, and both of those paths patch every mark/window that
//! named the retired line before returning.

pub mod case;
pub mod edit;
pub mod io_format;
pub mod motion;
pub mod region;
pub mod segment;
pub mod tabs;
pub mod width;
#[cfg(feature = "term-probe")]
pub mod width_probe;

pub use width::egc_width;

use std::collections::HashMap;

/// Handle into a buffer's [`LineList`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineId(usize);

#[derive(Debug, Clone)]
struct Slot {
    alive: bool,
    text: Vec<u8>,
    prev: Option<LineId>,
    next: Option<LineId>,
}

/// The ordered, non-empty sequence of [`Line`]s making up a buffer (spec
/// §3.1–§3.2). Always holds at least one (possibly empty) line.
#[derive(Debug, Clone)]
pub struct LineList {
    slots: Vec<Slot>,
    free: Vec<usize>,
    first: LineId,
    last: LineId,
    len: usize,
}

impl LineList {
    pub fn new() -> Self {
        let slot = Slot {
            alive: true,
            text: Vec::new(),
            prev: None,
            next: None,
        };
        Self {
            slots: vec![slot],
            free: Vec::new(),
            first: LineId(0),
            last: LineId(0),
            len: 1,
        }
    }

    pub fn from_bytes(bytes: &[u8], delim: io_format::LineDelim) -> Self {
        let mut list = Self::new();
        if bytes.is_empty() {
            return list;
        }
        let chunks = io_format::split_lines(bytes, delim);
        list.set_lines(chunks);
        list
    }

    /// Replace the entire contents with `lines` (used by `from_bytes` and by
    /// tests). Always leaves at least one line.
    fn set_lines(&mut self, lines: Vec<Vec<u8>>) {
        *self = LineList::new();
        if lines.is_empty() {
            return;
        }
        self.slots[0].text = lines[0].clone();
        let mut prev = self.first;
        for text in &lines[1..] {
            let id = self.push_after(prev, text.clone());
            prev = id;
        }
        self.last = prev;
    }

    fn push_after(&mut self, after: LineId, text: Vec<u8>) -> LineId {
        let new_slot = Slot {
            alive: true,
            text,
            prev: Some(after),
            next: self.slots[after.0].next,
        };
        let id = if let Some(idx) = self.free.pop() {
            self.slots[idx] = new_slot;
            LineId(idx)
        } else {
            self.slots.push(new_slot);
            LineId(self.slots.len() - 1)
        };
        if let Some(next) = self.slots[after.0].next {
            self.slots[next.0].prev = Some(id);
        }
        self.slots[after.0].next = Some(id);
        if self.last == after {
            self.last = id;
        }
        self.len += 1;
        id
    }

    fn free_line(&mut self, id: LineId) {
        debug_assert_ne!(self.len, 1, "LineList must keep at least one line");
        let prev = self.slots[id.0].prev;
        let next = self.slots[id.0].next;
        if let Some(p) = prev {
            self.slots[p.0].next = next;
        }
        if let Some(n) = next {
            self.slots[n.0].prev = prev;
        }
        if self.first == id {
            self.first = next.expect("freeing first line requires a successor");
        }
        if self.last == id {
            self.last = prev.expect("freeing last line requires a predecessor");
        }
        self.slots[id.0].alive = false;
        self.slots[id.0].text = Vec::new();
        self.free.push(id.0);
        self.len -= 1;
    }

    pub fn first(&self) -> LineId {
        self.first
    }
    pub fn last(&self) -> LineId {
        self.last
    }
    pub fn next(&self, id: LineId) -> Option<LineId> {
        self.slots[id.0].next
    }
    pub fn prev(&self, id: LineId) -> Option<LineId> {
        self.slots[id.0].prev
    }
    pub fn is_last(&self, id: LineId) -> bool {
        id == self.last
    }
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        false // always holds at least one line
    }
    pub fn is_node(&self, id: LineId) -> bool {
        self.slots.get(id.0).is_some_and(|s| s.alive)
    }

    pub fn text(&self, id: LineId) -> &[u8] {
        &self.slots[id.0].text
    }
    pub fn used(&self, id: LineId) -> usize {
        self.slots[id.0].text.len()
    }

    /// Iterate line ids from first to last.
    pub fn iter(&self) -> impl Iterator<Item = LineId> + '_ {
        let mut cur = Some(self.first);
        std::iter::from_fn(move || {
            let id = cur?;
            cur = self.next(id);
            Some(id)
        })
    }

    pub fn line_string(&self, id: LineId) -> String {
        String::from_utf8_lossy(self.text(id)).into_owned()
    }

    /// Insert `bytes` at `offset` within line `id`'s text. Never interprets
    /// `\n` (spec §4.2 `insertChars`); the handle `id` stays valid — only the
    /// backing `Vec<u8>` reallocates.
    pub fn insert_bytes(&mut self, id: LineId, offset: usize, bytes: &[u8]) {
        let text = &mut self.slots[id.0].text;
        debug_assert!(offset <= text.len());
        text.splice(offset..offset, bytes.iter().copied());
    }

    /// Remove `[start, end)` from line `id`'s text, returning the removed bytes.
    pub fn delete_range(&mut self, id: LineId, start: usize, end: usize) -> Vec<u8> {
        let text = &mut self.slots[id.0].text;
        debug_assert!(start <= end && end <= text.len());
        text.splice(start..end, std::iter::empty()).collect()
    }

    /// Split line `id` at `offset`: `id` keeps bytes `[0, offset)`, a new
    /// line inserted immediately after it gets `[offset, end)`. Returns the
    /// new line's id (spec §4.2 `insertNewline`).
    pub fn split(&mut self, id: LineId, offset: usize) -> LineId {
        let tail = {
            let text = &mut self.slots[id.0].text;
            debug_assert!(offset <= text.len());
            text.split_off(offset)
        };
        self.push_after(id, tail)
    }

    /// Merge line `id`'s successor onto the end of `id`'s text, removing the
    /// successor node. Returns `(removed_line, id_len_before_merge)` so the
    /// caller can relocate marks/windows that named the removed line (spec
    /// §4.2 `joinLines`). Returns `None` if `id` is the last line.
    pub fn merge_next(&mut self, id: LineId) -> Option<(LineId, usize)> {
        let next = self.slots[id.0].next?;
        let len_a = self.slots[id.0].text.len();
        let next_text = self.slots[next.0].text.clone();
        self.slots[id.0].text.extend_from_slice(&next_text);
        self.free_line(next);
        Some((next, len_a))
    }
}

impl Default for LineList {
    fn default() -> Self {
        Self::new()
    }
}

/// A (Line, offset) pair (spec §3.3). `offset == line.used` means end-of-line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub line: LineId,
    pub offset: usize,
}

impl Point {
    pub fn new(line: LineId, offset: usize) -> Self {
        Self { line, offset }
    }
}

/// Reserved mark names (spec §3.4).
pub const REG_MARK: char = '.';
pub const WRK_MARK: char = ' ';

/// A named captured point plus a preferred redisplay row (spec §3.4).
#[derive(Debug, Clone, Copy)]
pub struct Mark {
    pub name: char,
    pub point: Point,
    pub reframe_row: i32,
    /// `false` models the source's "offset < 0" invisible-mark sentinel: an
    /// invisible mark is present but not user-selectable.
    pub visible: bool,
}

impl Mark {
    pub fn new(name: char, point: Point) -> Self {
        Self {
            name,
            point,
            reframe_row: -1,
            visible: true,
        }
    }
}

/// A visible viewport onto a buffer (spec §3.5).
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub top_line: LineId,
    pub point: Point,
    pub first_col: usize,
    pub rows: u16,
    pub top_row: u16,
    pub flags: WindowFlags,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WindowFlags: u8 {
        /// Single-line change; cheapest redisplay.
        const WF_EDIT = 0b0000_0001;
        /// Structural change (split/merge/multi-line); full-window repaint.
        const WF_HARD = 0b0000_0010;
        /// Point moved off-screen or a reframe was explicitly requested.
        const WF_REFRAME = 0b0000_0100;
    }
}

/// Saved display state retained when a buffer's last window closes (spec
/// §3.5, testable property #6).
#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub top_line: LineId,
    pub point: Point,
    pub first_col: usize,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BufferModes: u32 {
        const TERM_ATTR = 0b0000_0001;
        const HARD_TABS = 0b0000_0010;
    }
}

/// A named, editable line list plus the marks/windows/state riding on it
/// (spec §3.7).
#[derive(Debug, Clone)]
pub struct Buffer {
    pub name: String,
    pub filename: Option<String>,
    pub lines: LineList,
    pub marks: HashMap<char, Mark>,
    pub windows: Vec<Window>,
    pub saved_face: Option<Face>,
    pub modes: BufferModes,
    pub change_count: u64,
    pub narrowed: Option<Narrowing>,
    pub soft_tab_size: usize,
    pub input_delim: io_format::LineDelim,
    pub output_delim: io_format::LineDelim,
    pub final_line_unterminated: bool,
}

/// Lines hidden at head/tail while the buffer is narrowed (spec §3.7).
#[derive(Debug, Clone)]
pub struct Narrowing {
    pub head: Vec<Vec<u8>>,
    pub tail: Vec<Vec<u8>>,
}

impl Buffer {
    pub fn new(name: impl Into<String>) -> Self {
        let lines = LineList::new();
        let first = lines.first();
        let mut marks = HashMap::new();
        marks.insert(REG_MARK, Mark::new(REG_MARK, Point::new(first, 0)));
        Self {
            name: name.into(),
            filename: None,
            lines,
            marks,
            windows: Vec::new(),
            saved_face: None,
            modes: BufferModes::empty(),
            change_count: 0,
            narrowed: None,
            soft_tab_size: 8,
            input_delim: io_format::LineDelim::Lf,
            output_delim: io_format::LineDelim::Lf,
            final_line_unterminated: true,
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        let (delim, unterminated) = io_format::detect_delim(bytes);
        let lines = LineList::from_bytes(bytes, delim);
        let first = lines.first();
        let mut marks = HashMap::new();
        marks.insert(REG_MARK, Mark::new(REG_MARK, Point::new(first, 0)));
        Self {
            name: name.into(),
            filename: None,
            lines,
            marks,
            windows: Vec::new(),
            saved_face: None,
            modes: BufferModes::empty(),
            change_count: 0,
            narrowed: None,
            soft_tab_size: 8,
            input_delim: delim,
            output_delim: delim,
            final_line_unterminated: unterminated,
        }
    }

    pub fn nwind(&self) -> usize {
        self.windows.len()
    }

    pub fn line_string(&self, id: LineId) -> String {
        self.lines.line_string(id)
    }

    pub fn reg_mark(&self) -> &Mark {
        self.marks.get(&REG_MARK).expect("RegMark always present")
    }

    pub fn set_reg_mark(&mut self, point: Point) {
        self.marks.get_mut(&REG_MARK).unwrap().point = point;
    }

    pub fn find_mark(&self, name: char) -> Option<&Mark> {
        self.marks.get(&name)
    }

    pub fn create_mark(&mut self, name: char, point: Point) {
        self.marks.insert(name, Mark::new(name, point));
    }

    /// Atomically exchange `point` with mark `name`, preserving the mark's
    /// reframe row (spec §4.6 `swapMark`).
    pub fn swap_mark(&mut self, name: char, point: &mut Point) -> bool {
        if let Some(mark) = self.marks.get_mut(&name) {
            std::mem::swap(&mut mark.point, point);
            true
        } else {
            false
        }
    }

    /// Close window `idx`; if it was the last window, save its face onto the
    /// buffer (spec §3.5, testable property #6).
    pub fn close_window(&mut self, idx: usize) {
        let w = self.windows.remove(idx);
        if self.windows.is_empty() {
            self.saved_face = Some(Face {
                top_line: w.top_line,
                point: w.point,
                first_col: w.first_col,
            });
        }
    }
}
