//! Edit primitives and the invariant maintenance that follows every one of
//! them (spec §4.2). Commands never touch line bytes directly; everything
//! funnels through this module.

use crate::{Buffer, LineId, Point, WindowFlags};
use tracing::trace;

/// Disposition requested for bytes removed by [`delete_chars`] (spec §4.2,
/// grounded on the kill/undelete paths in `memacs/edit.c`/`region.c`). The
/// kill ring and undelete buffer themselves are external collaborators
/// (spec §1); this only tags what was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDisposition {
    Discard,
    Kill,
    Undelete,
}

/// Direction a `joinLines` removes its adjacent delimiter in (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinDir {
    /// Join the current line with the line *below* it.
    Forward,
    /// Join the current line with the line *above* it.
    Backward,
}

/// Bytes removed by a delete, tagged with the disposition the caller asked for.
#[derive(Debug, Clone)]
pub struct RemovedText {
    pub bytes: Vec<u8>,
    pub disposition: DeleteDisposition,
}

/// Relocate every mark and window point on `line` after an insertion of
/// `len` bytes at `pos` (spec invariant #4: `>` stays, strictly-greater
/// shifts).
fn relocate_insert(buf: &mut Buffer, line: LineId, pos: usize, len: usize) {
    for mark in buf.marks.values_mut() {
        if mark.point.line == line && mark.point.offset > pos {
            mark.point.offset += len;
        }
    }
    for w in &mut buf.windows {
        if w.point.line == line && w.point.offset > pos {
            w.point.offset += len;
        }
    }
}

/// Relocate marks/windows after deleting `[start, end)` on `line` (spec
/// invariant #5): offsets in `(start, end]` collapse to `start`; offsets
/// `> end` shift left by `end - start`; offsets `<= start` are untouched.
fn relocate_delete(buf: &mut Buffer, line: LineId, start: usize, end: usize) {
    let len = end - start;
    for mark in buf.marks.values_mut() {
        if mark.point.line == line {
            if mark.point.offset > start && mark.point.offset <= end {
                mark.point.offset = start;
            } else if mark.point.offset > end {
                mark.point.offset -= len;
            }
        }
    }
    for w in &mut buf.windows {
        if w.point.line == line {
            if w.point.offset > start && w.point.offset <= end {
                w.point.offset = start;
            } else if w.point.offset > end {
                w.point.offset -= len;
            }
        }
    }
}

/// Relocate every mark/window/top_line pointer from `from` to `to`, shifting
/// offsets on `from` forward by `base_offset` (used after a line merge or a
/// split moved content between lines).
fn relocate_line(buf: &mut Buffer, from: LineId, to: LineId, base_offset: usize) {
    for mark in buf.marks.values_mut() {
        if mark.point.line == from {
            mark.point.line = to;
            mark.point.offset += base_offset;
        }
    }
    for w in &mut buf.windows {
        if w.point.line == from {
            w.point.line = to;
            w.point.offset += base_offset;
        }
        if w.top_line == from {
            w.top_line = to;
        }
    }
}

fn mark_changed(buf: &mut Buffer, multi_line: bool) {
    buf.change_count += 1;
    let hint = if multi_line || buf.nwind() > 1 {
        WindowFlags::WF_HARD
    } else {
        WindowFlags::WF_EDIT
    };
    for w in &mut buf.windows {
        w.flags |= hint;
    }
}

/// Insert byte `c` `n` times at `point`. Never interprets `\n`.
pub fn insert_chars(buf: &mut Buffer, point: &mut Point, n: usize, c: u8) {
    if n == 0 {
        return;
    }
    let bytes = vec![c; n];
    buf.lines.insert_bytes(point.line, point.offset, &bytes);
    relocate_insert(buf, point.line, point.offset, n);
    point.offset += n;
    mark_changed(buf, false);
    trace!(target: "text.edit", n, "insert_chars");
}

/// Split the current line at `point`, producing two lines. Point moves to
/// the start of the new (second) line.
pub fn insert_newline(buf: &mut Buffer, point: &mut Point) {
    let new_line = buf.lines.split(point.line, point.offset);
    // Everything at or after `point.offset` on the old line moved onto
    // `new_line` at `offset - point.offset`.
    relocate_split(buf, point.line, new_line, point.offset);
    point.line = new_line;
    point.offset = 0;
    mark_changed(buf, true);
    trace!(target: "text.edit", "insert_newline");
}

/// Relocate marks/windows that sat in the tail moved to `new_line` by a
/// split at `split_at` on `old_line`. `RegMark`/point exactly at
/// `split_at` is intentionally left behind on `old_line` (matches spec's
/// "offset == line.used means just before the delimiter").
fn relocate_split(buf: &mut Buffer, old_line: LineId, new_line: LineId, split_at: usize) {
    for mark in buf.marks.values_mut() {
        if mark.point.line == old_line && mark.point.offset > split_at {
            mark.point.line = new_line;
            mark.point.offset -= split_at;
        }
    }
    for w in &mut buf.windows {
        if w.point.line == old_line && w.point.offset > split_at {
            w.point.line = new_line;
            w.point.offset -= split_at;
        }
        // top_line never relocates here: a split only ever grows the buffer,
        // it never retires `old_line`.
    }
}

/// Insert `s`'s bytes at `point`; any `\n` triggers [`insert_newline`].
pub fn insert_string(buf: &mut Buffer, point: &mut Point, s: &[u8]) {
    let mut run_start = 0;
    for (i, &b) in s.iter().enumerate() {
        if b == b'\n' {
            if i > run_start {
                insert_bytes_run(buf, point, &s[run_start..i]);
            }
            insert_newline(buf, point);
            run_start = i + 1;
        }
    }
    if run_start < s.len() {
        insert_bytes_run(buf, point, &s[run_start..]);
    }
}

fn insert_bytes_run(buf: &mut Buffer, point: &mut Point, bytes: &[u8]) {
    buf.lines.insert_bytes(point.line, point.offset, bytes);
    relocate_insert(buf, point.line, point.offset, bytes.len());
    point.offset += bytes.len();
    mark_changed(buf, false);
}

/// Delete `n` bytes starting at `point`: positive goes forward, negative
/// backward, crossing line delimiters (merging lines) as needed (spec §4.2,
/// testable property "deleteChars spanning the last line delimiter").
pub fn delete_chars(
    buf: &mut Buffer,
    point: &mut Point,
    n: i64,
    disposition: DeleteDisposition,
) -> RemovedText {
    let bytes = if n >= 0 {
        delete_forward(buf, point, n as usize)
    } else {
        delete_backward(buf, point, (-n) as usize)
    };
    RemovedText { bytes, disposition }
}

fn delete_forward(buf: &mut Buffer, point: &mut Point, mut remaining: usize) -> Vec<u8> {
    let mut removed = Vec::new();
    let mut multi_line = false;
    while remaining > 0 {
        let avail = buf.lines.used(point.line) - point.offset;
        if remaining <= avail {
            let end = point.offset + remaining;
            let chunk = buf.lines.delete_range(point.line, point.offset, end);
            relocate_delete(buf, point.line, point.offset, end);
            removed.extend_from_slice(&chunk);
            remaining = 0;
        } else {
            let chunk = buf
                .lines
                .delete_range(point.line, point.offset, point.offset + avail);
            relocate_delete(buf, point.line, point.offset, point.offset + avail);
            removed.extend_from_slice(&chunk);
            remaining -= avail;
            if buf.lines.is_last(point.line) {
                break; // nothing more to consume at end-of-buffer
            }
            let len_a = buf.lines.used(point.line);
            let (removed_line, _) = buf.lines.merge_next(point.line).unwrap();
            relocate_line(buf, removed_line, point.line, len_a);
            removed.push(b'\n');
            remaining -= 1;
            multi_line = true;
        }
    }
    mark_changed(buf, multi_line);
    removed
}

fn delete_backward(buf: &mut Buffer, point: &mut Point, mut remaining: usize) -> Vec<u8> {
    let mut removed = Vec::new();
    let mut multi_line = false;
    while remaining > 0 {
        if point.offset >= remaining {
            let start = point.offset - remaining;
            let chunk = buf.lines.delete_range(point.line, start, point.offset);
            relocate_delete(buf, point.line, start, point.offset);
            removed.splice(0..0, chunk);
            point.offset = start;
            remaining = 0;
        } else {
            let chunk = buf.lines.delete_range(point.line, 0, point.offset);
            relocate_delete(buf, point.line, 0, point.offset);
            removed.splice(0..0, chunk);
            remaining -= point.offset;
            let Some(prev) = buf.lines.prev(point.line) else {
                point.offset = 0;
                break; // beginning-of-buffer
            };
            let len_prev = buf.lines.used(prev);
            let (removed_line, _) = buf.lines.merge_next(prev).unwrap();
            relocate_line(buf, removed_line, prev, len_prev);
            removed.splice(0..0, [b'\n']);
            remaining -= 1;
            point.line = prev;
            point.offset = len_prev;
            multi_line = true;
        }
    }
    mark_changed(buf, multi_line);
    removed
}

/// Remove the line delimiter adjacent to `point`, merging two lines into
/// one (spec §4.2 `joinLines`).
pub fn join_lines(buf: &mut Buffer, point: &mut Point, dir: JoinDir) -> bool {
    match dir {
        JoinDir::Forward => {
            if buf.lines.is_last(point.line) {
                return false;
            }
            let len_a = buf.lines.used(point.line);
            let (removed_line, _) = buf.lines.merge_next(point.line).unwrap();
            relocate_line(buf, removed_line, point.line, len_a);
            mark_changed(buf, true);
            true
        }
        JoinDir::Backward => {
            let Some(prev) = buf.lines.prev(point.line) else {
                return false;
            };
            let len_prev = buf.lines.used(prev);
            let (removed_line, _) = buf.lines.merge_next(prev).unwrap();
            relocate_line(buf, removed_line, prev, len_prev);
            point.line = prev;
            point.offset = len_prev;
            mark_changed(buf, true);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::REG_MARK;

    #[test]
    fn insert_chars_shifts_marks_strictly_after_point() {
        let mut buf = Buffer::from_bytes("t", b"hello");
        let first = buf.lines.first();
        buf.create_mark('a', Point::new(first, 2));
        buf.create_mark('b', Point::new(first, 5));
        let mut point = Point::new(first, 2);
        insert_chars(&mut buf, &mut point, 3, b'X');
        assert_eq!(buf.line_string(first), "heXXXllo");
        // mark at offset 2 stays (rule: `==` stays, spec invariant #4)
        assert_eq!(buf.find_mark('a').unwrap().point.offset, 2);
        assert_eq!(buf.find_mark('b').unwrap().point.offset, 8);
        assert_eq!(point.offset, 5);
    }

    #[test]
    fn insertion_with_multiple_windows_relocates_each_independently() {
        // Scenario 3 from spec §8.
        let mut buf = Buffer::from_bytes("t", b"hello");
        let first = buf.lines.first();
        buf.windows.push(crate::Window {
            top_line: first,
            point: Point::new(first, 0),
            first_col: 0,
            rows: 10,
            top_row: 0,
            flags: crate::WindowFlags::empty(),
        });
        buf.windows.push(crate::Window {
            top_line: first,
            point: Point::new(first, 5),
            first_col: 0,
            rows: 10,
            top_row: 0,
            flags: crate::WindowFlags::empty(),
        });
        let mut point = buf.windows[0].point;
        insert_chars(&mut buf, &mut point, 3, b'X');
        buf.windows[0].point = point;
        assert_eq!(buf.windows[0].point.offset, 3);
        assert_eq!(buf.windows[1].point.offset, 8);
        assert!(buf.line_string(first).starts_with("XXX"));
    }

    #[test]
    fn delete_at_exact_offset_stays_anchored() {
        let mut buf = Buffer::from_bytes("t", b"hello");
        let first = buf.lines.first();
        buf.create_mark('a', Point::new(first, 2));
        let mut point = Point::new(first, 2);
        delete_chars(&mut buf, &mut point, 2, DeleteDisposition::Discard);
        // mark exactly at deletion boundary stays at the boundary (`>` not `>=`)
        assert_eq!(buf.find_mark('a').unwrap().point.offset, 2);
        assert_eq!(buf.line_string(first), "heo");
    }

    #[test]
    fn insert_newline_at_end_of_buffer_creates_empty_last_line() {
        let mut buf = Buffer::from_bytes("t", b"abcd");
        let first = buf.lines.first();
        let mut point = Point::new(first, 4);
        insert_newline(&mut buf, &mut point);
        assert_eq!(buf.lines.len(), 2);
        assert!(buf.lines.is_last(point.line));
        assert_eq!(buf.lines.used(point.line), 0);
    }

    #[test]
    fn delete_spanning_delimiter_merges_lines() {
        let mut buf = Buffer::from_bytes("t", b"ab\ncd");
        let first = buf.lines.first();
        let mut point = Point::new(first, 1);
        // delete 'b' + '\n' + 'c' == 3 bytes forward
        let removed = delete_chars(&mut buf, &mut point, 3, DeleteDisposition::Discard);
        assert_eq!(removed.bytes, b"b\nc");
        assert_eq!(buf.lines.len(), 1);
        assert_eq!(buf.line_string(buf.lines.first()), "ad");
    }

    #[test]
    fn undo_of_insert_chars_is_identity() {
        let mut buf = Buffer::from_bytes("t", b"hello");
        let first = buf.lines.first();
        let mut point = Point::new(first, 2);
        let before = buf.line_string(first);
        insert_chars(&mut buf, &mut point, 3, b'X');
        delete_chars(&mut buf, &mut point, -3, DeleteDisposition::Discard);
        assert_eq!(buf.line_string(first), before);
        assert_eq!(point.offset, 2);
    }

    #[test]
    fn reg_mark_present_after_construction() {
        let buf = Buffer::new("scratch");
        assert!(buf.find_mark(REG_MARK).is_some());
    }
}
