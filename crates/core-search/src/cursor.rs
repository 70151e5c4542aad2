//! Streaming character source over a buffer's line list (spec §4.3: "a
//! streaming/callback interface that lets the matcher consume characters
//! from a caller-provided source... so the line list is never copied into
//! a flat buffer"), grounded on `search.c`'s `RegScan`, which advances a
//! `Point` one character at a time during a scan rather than building a
//! flattened string.
//!
//! [`BufferCursor::get_next`]/[`BufferCursor::rewind`] are this crate's
//! `getNext`/`rewind`; [`compare`] is its `compare`. The plain-text engine
//! (`plain.rs`) is built entirely on this interface.

use core_text::{Buffer, Point};

/// Which way a [`BufferCursor`] walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Pulls bytes one at a time from a buffer's line list, crossing line
/// boundaries as an implicit `\n`, without ever materializing the buffer
/// as one contiguous string.
pub struct BufferCursor<'b> {
    buf: &'b Buffer,
    direction: Direction,
    point: Option<Point>,
}

impl<'b> BufferCursor<'b> {
    pub fn new(buf: &'b Buffer, start: Point, direction: Direction) -> Self {
        Self {
            buf,
            direction,
            point: Some(start),
        }
    }

    /// Current scan position, or `None` once the cursor has run off the
    /// start/end of the buffer.
    pub fn pos(&self) -> Option<Point> {
        self.point
    }

    /// Reset the scan position without losing the source's buffer/direction.
    pub fn rewind(&mut self, to: Point) {
        self.point = Some(to);
    }

    /// Pull and consume the next byte in scan direction.
    pub fn get_next(&mut self) -> Option<u8> {
        let point = self.point?;
        match self.direction {
            Direction::Forward => {
                let text = self.buf.lines.text(point.line);
                if point.offset < text.len() {
                    let b = text[point.offset];
                    self.point = Some(Point::new(point.line, point.offset + 1));
                    Some(b)
                } else {
                    match self.buf.lines.next(point.line) {
                        Some(next) => {
                            self.point = Some(Point::new(next, 0));
                            Some(b'\n')
                        }
                        None => {
                            self.point = None;
                            None
                        }
                    }
                }
            }
            Direction::Backward => {
                if point.offset > 0 {
                    let text = self.buf.lines.text(point.line);
                    let b = text[point.offset - 1];
                    self.point = Some(Point::new(point.line, point.offset - 1));
                    Some(b)
                } else {
                    match self.buf.lines.prev(point.line) {
                        Some(prev) => {
                            let len = self.buf.lines.used(prev);
                            self.point = Some(Point::new(prev, len));
                            Some(b'\n')
                        }
                        None => {
                            self.point = None;
                            None
                        }
                    }
                }
            }
        }
    }
}

/// Byte comparison honoring the search's exactness (spec §4.3 exactness
/// rule); this is the source's `compare`.
pub fn compare(a: u8, b: u8, ignore_case: bool) -> bool {
    if ignore_case {
        a.eq_ignore_ascii_case(&b)
    } else {
        a == b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_cursor_crosses_line_boundary_as_newline() {
        let buf = Buffer::from_bytes("t", b"ab\ncd");
        let mut cur = BufferCursor::new(&buf, Point::new(buf.lines.first(), 0), Direction::Forward);
        let bytes: Vec<u8> = std::iter::from_fn(|| cur.get_next()).collect();
        assert_eq!(bytes, b"ab\ncd");
    }

    #[test]
    fn backward_cursor_walks_right_to_left() {
        let buf = Buffer::from_bytes("t", b"ab\ncd");
        let last = buf.lines.last();
        let len = buf.lines.used(last);
        let mut cur = BufferCursor::new(&buf, Point::new(last, len), Direction::Backward);
        let bytes: Vec<u8> = std::iter::from_fn(|| cur.get_next()).collect();
        assert_eq!(bytes, b"dc\nba");
    }

    #[test]
    fn rewind_resets_scan_position() {
        let buf = Buffer::from_bytes("t", b"abcdef");
        let first = buf.lines.first();
        let mut cur = BufferCursor::new(&buf, Point::new(first, 0), Direction::Forward);
        cur.get_next();
        cur.get_next();
        cur.rewind(Point::new(first, 0));
        assert_eq!(cur.get_next(), Some(b'a'));
    }

    #[test]
    fn compare_respects_ignore_case() {
        assert!(compare(b'A', b'a', true));
        assert!(!compare(b'A', b'a', false));
    }
}
