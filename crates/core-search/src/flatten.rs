//! Flattens a buffer's line list into one byte string (lines joined by
//! `\n`) plus a table mapping flat offsets back to `(LineId, offset)`.
//!
//! `plain.rs` and `fuzzy.rs` do not use this: they scan directly over
//! `cursor::BufferCursor` and never copy the buffer. `regexp.rs` is the
//! sole user, because `regex::bytes::Regex` requires a contiguous `&[u8]`
//! to match against — there is no streaming entry point in that crate to
//! hand it a character source instead.

use core_text::{Buffer, LineId, Point};

pub struct Flat {
    pub bytes: Vec<u8>,
    /// `(line, start_offset_in_flat)` for every line, in order.
    starts: Vec<(LineId, usize)>,
}

impl Flat {
    pub fn build(buf: &Buffer) -> Flat {
        let mut bytes = Vec::new();
        let mut starts = Vec::new();
        let mut first = true;
        for id in buf.lines.iter() {
            if !first {
                bytes.push(b'\n');
            }
            first = false;
            starts.push((id, bytes.len()));
            bytes.extend_from_slice(buf.lines.text(id));
        }
        Flat { bytes, starts }
    }

    pub fn flat_offset(&self, point: Point) -> usize {
        let idx = self
            .starts
            .iter()
            .position(|(id, _)| *id == point.line)
            .unwrap_or(0);
        self.starts[idx].1 + point.offset
    }

    pub fn point_at(&self, flat_offset: usize) -> Point {
        let idx = self
            .starts
            .partition_point(|(_, start)| *start <= flat_offset)
            .saturating_sub(1);
        let (line, start) = self.starts[idx];
        Point::new(line, flat_offset - start)
    }
}
