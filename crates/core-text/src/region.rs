//! Region extraction (spec §3.9, §4.2), grounded on `memacs/region.c`'s
//! `getregion`/`regionToStr` and line-block expansion.

use crate::{Buffer, LineId, Point};

/// A `(point, size, lineCount)` triple (spec §3.9). `size` is the signed
/// byte count between `point` and `RegMark`; negative means the region runs
/// backward from `point`.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub point: Point,
    pub size: i64,
    pub line_count: usize,
}

impl Region {
    /// Build the region between `point` and `mark`, counting line breaks
    /// crossed. Does not normalize direction (callers needing a forward,
    /// origin-anchored region should call [`Region::normalized`]).
    pub fn between(buf: &Buffer, point: Point, mark: Point) -> Region {
        let (lo, hi, forward) = if line_offset(buf, point.line) < line_offset(buf, mark.line)
            || (point.line == mark.line && point.offset <= mark.offset)
        {
            (point, mark, true)
        } else {
            (mark, point, false)
        };
        let mut size = 0i64;
        let mut line_count = 0usize;
        let mut cur = lo.line;
        loop {
            let used = buf.lines.used(cur);
            let start = if cur == lo.line { lo.offset } else { 0 };
            let end = if cur == hi.line { hi.offset } else { used };
            size += (end - start) as i64;
            if cur == hi.line {
                break;
            }
            size += 1; // the line delimiter
            line_count += 1;
            cur = buf
                .lines
                .next(cur)
                .expect("hi.line must be reachable forward from lo.line");
        }
        Region {
            point,
            size: if forward { size } else { -size },
            line_count,
        }
    }

    /// A region anchored at its lower-offset endpoint, with a non-negative
    /// byte count (spec §4.2 "extraction always normalizes... unless an
    /// option requests preservation of direction").
    pub fn normalized(buf: &Buffer, point: Point, mark: Point) -> Region {
        let mut r = Region::between(buf, point, mark);
        if r.size < 0 {
            r.point = mark;
            r.size = -r.size;
        }
        r
    }
}

/// Approximate a line's position for ordering two points without an O(n)
/// full-buffer scan: walks forward from `id` counting hops, capped by the
/// buffer length, so `between` only ever does a single linear pass overall.
fn line_offset(buf: &Buffer, id: LineId) -> usize {
    let mut n = 0;
    let mut cur = buf.lines.first();
    loop {
        if cur == id {
            return n;
        }
        match buf.lines.next(cur) {
            Some(next) => {
                cur = next;
                n += 1;
            }
            None => return usize::MAX,
        }
    }
}

/// Concatenate the bytes covered by `region`, joining lines with `\n` (spec
/// §4.2 `regionToString`).
pub fn region_to_string(buf: &Buffer, region: &Region) -> Vec<u8> {
    let size = region.size.unsigned_abs() as usize;
    let mut out = Vec::with_capacity(size);
    let mut remaining = size;
    let mut line = region.point.line;
    let mut offset = region.point.offset;
    while remaining > 0 {
        let text = buf.lines.text(line);
        let avail = text.len() - offset;
        if avail >= remaining {
            out.extend_from_slice(&text[offset..offset + remaining]);
            remaining = 0;
        } else {
            out.extend_from_slice(&text[offset..]);
            remaining -= avail;
            out.push(b'\n');
            remaining -= 1;
            line = buf
                .lines
                .next(line)
                .expect("region size must not exceed buffer contents");
            offset = 0;
        }
    }
    out
}

/// Expand `(point, n)` into a line-block region (spec §4.2 `lineRegion`):
/// `n == 1` is the current line through its trailing newline, `n == 0` is
/// the region's lines (between `point` and `RegMark`), `n < 0` goes
/// `|n| - 1` lines backward from `point`.
pub fn line_region(buf: &Buffer, point: Point, mark: Point, n: i64) -> Region {
    if n == 0 {
        let r = Region::normalized(buf, point, mark);
        return expand_to_line_boundaries(buf, r.point, r.line_count + 1);
    }
    if n > 0 {
        return expand_to_line_boundaries(buf, Point::new(point.line, 0), n as usize);
    }
    let back = (-n) as usize;
    let mut start_line = point.line;
    for _ in 0..back.saturating_sub(1) {
        start_line = buf.lines.prev(start_line).unwrap_or(start_line);
    }
    let count = back.saturating_sub(1) + 1;
    expand_to_line_boundaries(buf, Point::new(start_line, 0), count)
}

fn expand_to_line_boundaries(buf: &Buffer, start: Point, line_count: usize) -> Region {
    let mut size = 0i64;
    let mut line = start.line;
    for i in 0..line_count {
        size += buf.lines.used(line) as i64;
        let has_more = i + 1 < line_count;
        if has_more || !buf.lines.is_last(line) {
            size += 1;
        }
        if !has_more {
            break;
        }
        match buf.lines.next(line) {
            Some(next) => line = next,
            None => break,
        }
    }
    Region {
        point: Point::new(start.line, 0),
        size,
        line_count: line_count.saturating_sub(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_between_same_line_forward() {
        let buf = Buffer::from_bytes("t", b"hello world");
        let first = buf.lines.first();
        let r = Region::between(&buf, Point::new(first, 0), Point::new(first, 5));
        assert_eq!(r.size, 5);
        assert_eq!(region_to_string(&buf, &r), b"hello");
    }

    #[test]
    fn region_between_is_signed_by_direction() {
        let buf = Buffer::from_bytes("t", b"hello world");
        let first = buf.lines.first();
        let r = Region::between(&buf, Point::new(first, 5), Point::new(first, 0));
        assert_eq!(r.size, -5);
        let n = Region::normalized(&buf, Point::new(first, 5), Point::new(first, 0));
        assert_eq!(n.size, 5);
        assert_eq!(region_to_string(&buf, &n), b"hello");
    }

    #[test]
    fn region_spans_multiple_lines_with_delimiters() {
        let buf = Buffer::from_bytes("t", b"abc\ndef\nghi");
        let first = buf.lines.first();
        let last = buf.lines.last();
        let r = Region::between(&buf, Point::new(first, 0), Point::new(last, 3));
        assert_eq!(r.line_count, 2);
        assert_eq!(region_to_string(&buf, &r), b"abc\ndef\nghi");
    }

    #[test]
    fn line_region_n_1_covers_current_line_and_delimiter() {
        let buf = Buffer::from_bytes("t", b"abc\ndef");
        let first = buf.lines.first();
        let r = line_region(&buf, Point::new(first, 0), Point::new(first, 0), 1);
        assert_eq!(region_to_string(&buf, &r), b"abc\n");
    }
}
