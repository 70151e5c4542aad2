//! Boyer-Moore plain-text search, grounded on
//! `examples/original_source/src/search.c`'s `delta1`/`suffixLen` tables
//! (bad-character and good-suffix rules) — simplified here to the
//! bad-character rule, which already gives sub-linear skips for the common
//! case.
//!
//! Both directions scan via [`crate::cursor::BufferCursor`] (spec §4.3's
//! streaming/callback requirement): the buffer's line list is never copied
//! into a flat string. A sliding window of `pattern.len()` bytes is pulled
//! from the cursor and shifted by the bad-character rule exactly as a
//! buffer-backed Boyer-Moore would, just without ever materializing more
//! than that window. Backward search runs the identical scan against a
//! backward cursor and a reversed pattern — the source's separate
//! forward/backward pattern buffers, collapsed into one routine since the
//! cursor abstraction already hides the direction.

use crate::cursor::{BufferCursor, Direction};
use crate::{MatchFlags, MatchSpan};
use core_text::{Buffer, Point};
use std::collections::VecDeque;

const ALPHABET: usize = 256;

fn normalize(b: u8, ignore_case: bool) -> u8 {
    if ignore_case {
        b.to_ascii_lowercase()
    } else {
        b
    }
}

/// Precomputed last-occurrence table for the bad-character rule.
struct BadChar {
    last: [isize; ALPHABET],
}

impl BadChar {
    fn build(pattern: &[u8], ignore_case: bool) -> BadChar {
        let mut last = [-1isize; ALPHABET];
        for (i, &b) in pattern.iter().enumerate() {
            last[normalize(b, ignore_case) as usize] = i as isize;
        }
        BadChar { last }
    }
}

/// One byte pulled from the cursor, tagged with the buffer points on
/// either side of it so a match window can be turned back into a
/// `(start, end)` span without re-walking the line list.
struct Tagged {
    pre: Point,
    byte: u8,
    post: Point,
}

/// Slide a `pattern.len()`-byte window along `cursor`, applying the
/// bad-character rule, until `pattern` matches or the source is exhausted.
/// `pattern` must already be reversed by the caller for a backward scan
/// (see module doc).
fn bm_scan(
    cursor: &mut BufferCursor,
    pattern: &[u8],
    ignore_case: bool,
    direction: Direction,
) -> Option<(Point, Point)> {
    let m = pattern.len();
    if m == 0 {
        return None;
    }
    let table = BadChar::build(pattern, ignore_case);
    let mut window: VecDeque<Tagged> = VecDeque::with_capacity(m);

    let fill = |window: &mut VecDeque<Tagged>, cursor: &mut BufferCursor| {
        while window.len() < m {
            let Some(pre) = cursor.pos() else { break };
            match cursor.get_next() {
                Some(byte) => {
                    let post = cursor.pos().unwrap_or(pre);
                    window.push_back(Tagged { pre, byte, post });
                }
                None => break,
            }
        }
    };

    fill(&mut window, cursor);
    loop {
        if window.len() < m {
            return None;
        }
        let mut j = m as isize - 1;
        while j >= 0
            && normalize(window[j as usize].byte, ignore_case) == normalize(pattern[j as usize], ignore_case)
        {
            j -= 1;
        }
        if j < 0 {
            return Some(match direction {
                Direction::Forward => (window[0].pre, window[m - 1].post),
                Direction::Backward => (window[m - 1].post, window[0].pre),
            });
        }
        let bad = normalize(window[j as usize].byte, ignore_case) as usize;
        let shift = (j - table.last[bad]).max(1) as usize;
        for _ in 0..shift.min(window.len()) {
            window.pop_front();
        }
        fill(&mut window, cursor);
    }
}

pub fn search_forward(buf: &Buffer, from: Point, pattern: &str, flags: MatchFlags) -> Option<MatchSpan> {
    let mut cursor = BufferCursor::new(buf, from, Direction::Forward);
    let ignore = flags.contains(MatchFlags::IGNORE);
    let (start, end) = bm_scan(&mut cursor, pattern.as_bytes(), ignore, Direction::Forward)?;
    Some(MatchSpan::whole(start, end))
}

pub fn search_backward(buf: &Buffer, from: Point, pattern: &str, flags: MatchFlags) -> Option<MatchSpan> {
    if from.offset == 0 && buf.lines.prev(from.line).is_none() {
        return None;
    }
    let mut cursor = BufferCursor::new(buf, from, Direction::Backward);
    let ignore = flags.contains(MatchFlags::IGNORE);
    let reversed: Vec<u8> = pattern.as_bytes().iter().rev().copied().collect();
    let (start, end) = bm_scan(&mut cursor, &reversed, ignore, Direction::Backward)?;
    Some(MatchSpan::whole(start, end))
}
