//! Regex search wrapping the `regex` crate (design note §9: "wrap `regex`
//! rather than port the original's hand-rolled RE engine"). Forward search
//! compiles the pattern as given; backward search is implemented by
//! repeated forward scanning over the flattened text and keeping the
//! last match at or before the start point — `regex` has no native
//! reverse-scan mode, mirroring why `search.c` keeps a separately
//! compiled/reversed backward pattern.
//!
//! Unlike `plain.rs`, this engine still copies the buffer into one
//! contiguous byte string via [`crate::flatten::Flat`] instead of scanning
//! through `cursor::BufferCursor`: `regex::bytes::Regex` only matches
//! against a `&[u8]` slice, so there is no streaming entry point to hand it
//! a caller-provided character source. This is the one place in the crate
//! that does not meet the streaming requirement, and it is an architectural
//! constraint of the `regex` crate rather than an oversight — see
//! DESIGN.md.

use crate::flatten::Flat;
use crate::{MatchFlags, MatchSpan};
use core_text::{Buffer, Point};
use regex::bytes::Regex;
use tracing::warn;

fn compile(pattern: &str, flags: MatchFlags) -> Option<Regex> {
    let mut opts = String::new();
    if flags.contains(MatchFlags::IGNORE) {
        opts.push('i');
    }
    if flags.contains(MatchFlags::MULTI) {
        opts.push('s');
    }
    let full = if opts.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{opts}){pattern}")
    };
    match Regex::new(&full) {
        Ok(re) => Some(re),
        Err(err) => {
            warn!(target: "search.regexp", %err, "pattern_compile_failed");
            None
        }
    }
}

pub fn search_forward(
    buf: &Buffer,
    from: Point,
    pattern: &str,
    flags: MatchFlags,
) -> Option<MatchSpan> {
    let re = compile(pattern, flags)?;
    let flat = Flat::build(buf);
    let start = flat.flat_offset(from);
    let caps = re.captures_at(&flat.bytes, start)?;
    Some(span_with_groups(&flat, &re, &caps))
}

pub fn search_backward(
    buf: &Buffer,
    from: Point,
    pattern: &str,
    flags: MatchFlags,
) -> Option<MatchSpan> {
    let re = compile(pattern, flags)?;
    let flat = Flat::build(buf);
    let upto = flat.flat_offset(from);
    let mut last = None;
    let mut pos = 0;
    while let Some(caps) = re.captures_at(&flat.bytes, pos) {
        let m = caps.get(0).unwrap();
        if m.start() >= upto {
            break;
        }
        let next_pos = if m.end() > m.start() { m.end() } else { m.end() + 1 };
        last = Some(span_with_groups(&flat, &re, &caps));
        pos = next_pos;
    }
    last
}

/// Build a [`MatchSpan`] from a regex `Captures`, per `search.c`'s
/// `saveMatch`: group 0 is the whole match, groups 1..n are the pattern's
/// capture groups in order, `None` where a group didn't participate.
fn span_with_groups(flat: &Flat, re: &Regex, caps: &regex::bytes::Captures) -> MatchSpan {
    let whole = caps.get(0).unwrap();
    let start = flat.point_at(whole.start());
    let end = flat.point_at(whole.end());
    let groups = (0..re.captures_len())
        .map(|i| {
            caps.get(i)
                .map(|g| (flat.point_at(g.start()), flat.point_at(g.end())))
        })
        .collect();
    MatchSpan { start, end, groups }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regex_forward_match() {
        let buf = Buffer::from_bytes("t", b"foo123bar");
        let first = buf.lines.first();
        let m = search_forward(&buf, Point::new(first, 0), r"\d+", MatchFlags::REGEXP).unwrap();
        assert_eq!(m.start.offset, 3);
        assert_eq!(m.end.offset, 6);
    }

    #[test]
    fn regex_case_insensitive() {
        let buf = Buffer::from_bytes("t", b"Hello World");
        let first = buf.lines.first();
        let m = search_forward(
            &buf,
            Point::new(first, 0),
            "world",
            MatchFlags::REGEXP | MatchFlags::IGNORE,
        )
        .unwrap();
        assert_eq!(m.start.offset, 6);
    }

    #[test]
    fn regex_backward_finds_last_preceding_match() {
        let buf = Buffer::from_bytes("t", b"a1 b2 c3");
        let first = buf.lines.first();
        let m = search_backward(&buf, Point::new(first, 8), r"[a-z]\d", MatchFlags::REGEXP).unwrap();
        assert_eq!(m.start.offset, 6);
    }

    #[test]
    fn invalid_pattern_returns_none() {
        let buf = Buffer::from_bytes("t", b"abc");
        let first = buf.lines.first();
        assert!(search_forward(&buf, Point::new(first, 0), "(unclosed", MatchFlags::REGEXP).is_none());
    }

    #[test]
    fn forward_match_captures_groups_in_order() {
        let buf = Buffer::from_bytes("t", b"x=333 z=333");
        let first = buf.lines.first();
        let m = search_forward(
            &buf,
            Point::new(first, 0),
            r"(z)=(\d+)",
            MatchFlags::REGEXP,
        )
        .unwrap();
        assert_eq!(m.groups.len(), 3);
        let g1 = m.group(1).unwrap();
        let g2 = m.group(2).unwrap();
        assert_eq!(g1.0.offset, 6);
        assert_eq!(g1.1.offset, 7);
        assert_eq!(g2.0.offset, 8);
        assert_eq!(g2.1.offset, 11);
    }

    #[test]
    fn backward_match_also_captures_groups() {
        let buf = Buffer::from_bytes("t", b"x=111 z=333");
        let first = buf.lines.first();
        let len = buf.lines.used(first);
        let m = search_backward(
            &buf,
            Point::new(first, len),
            r"(z)=(\d+)",
            MatchFlags::REGEXP,
        )
        .unwrap();
        assert_eq!(m.group(0).unwrap(), (m.start, m.end));
        assert!(m.group(1).is_some());
        assert!(m.group(2).is_some());
    }
}
