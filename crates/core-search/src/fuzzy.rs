//! Approximate ("fuzzy") matching (spec §4.3, `MatchFlags::FUZZY`).
//!
//! `search.c` implements this by handing the pattern to TRE's approximate
//! regex executor (`xregauexec`/`xregaexec`) whenever `SOpt_Fuzzy` is set.
//! This crate has no TRE binding, so fuzzy search here is a from-scratch
//! bounded edit-distance scan (Sellers' online algorithm) run over
//! [`crate::cursor::BufferCursor`] rather than an approximate-regex engine;
//! it only ever compares literal pattern text, never a compiled `regex`.
//! The edit-distance budget (one error per four pattern characters) and
//! the reported match span (always `pattern.len()` bytes ending where the
//! budget was first satisfied) are this transformation's own choice — see
//! DESIGN.md.

use crate::cursor::{BufferCursor, Direction};
use crate::MatchSpan;
use core_text::{Buffer, Point};
use std::collections::VecDeque;

fn max_distance(pattern_len: usize) -> usize {
    (pattern_len / 4).max(1)
}

/// Scan `cursor` one byte at a time, tracking the edit distance between
/// `pattern` and the text consumed so far via Sellers' algorithm, and
/// return the span of the first window whose distance is within budget.
fn fuzzy_scan(cursor: &mut BufferCursor, pattern: &[u8], ignore_case: bool) -> Option<(Point, Point)> {
    let m = pattern.len();
    if m == 0 {
        return None;
    }
    let budget = max_distance(m);
    let mut col: Vec<usize> = (0..=m).collect();
    let mut history: VecDeque<Point> = VecDeque::with_capacity(m + budget + 1);

    // Track the best (lowest-distance) window seen so far; once we're
    // within budget, keep scanning a few more bytes in case the distance
    // improves further (e.g. an exact match completing right after an
    // earlier, partial one comes into budget), giving up only after
    // `budget` consecutive steps without improvement.
    let mut best: Option<(usize, Point, Point)> = None;
    let mut grace = 0usize;

    loop {
        let Some(pre) = cursor.pos() else { break };
        let Some(byte) = cursor.get_next() else { break };
        let post = cursor.pos().unwrap_or(pre);
        history.push_back(pre);
        if history.len() > m + budget {
            history.pop_front();
        }

        let mut prev_diag = col[0];
        col[0] = 0;
        for i in 1..=m {
            let cost = if crate::cursor::compare(pattern[i - 1], byte, ignore_case) {
                0
            } else {
                1
            };
            let deletion = col[i] + 1;
            let insertion = col[i - 1] + 1;
            let substitution = prev_diag + cost;
            let cur = deletion.min(insertion).min(substitution);
            prev_diag = col[i];
            col[i] = cur;
        }

        if col[m] <= budget {
            let improved = best.is_none_or(|(best_dist, _, _)| col[m] < best_dist);
            if improved {
                let start = history
                    .get(history.len().saturating_sub(m))
                    .copied()
                    .unwrap_or(pre);
                best = Some((col[m], start, post));
                grace = 0;
            } else {
                grace += 1;
                if grace > budget {
                    break;
                }
            }
        } else if best.is_some() {
            grace += 1;
            if grace > budget {
                break;
            }
        }
    }

    best.map(|(_, start, end)| (start, end))
}

pub fn search_forward(buf: &Buffer, from: Point, pattern: &str, ignore_case: bool) -> Option<MatchSpan> {
    let mut cursor = BufferCursor::new(buf, from, Direction::Forward);
    let (start, end) = fuzzy_scan(&mut cursor, pattern.as_bytes(), ignore_case)?;
    Some(MatchSpan::whole(start, end))
}

pub fn search_backward(buf: &Buffer, from: Point, pattern: &str, ignore_case: bool) -> Option<MatchSpan> {
    let mut cursor = BufferCursor::new(buf, from, Direction::Backward);
    let reversed: Vec<u8> = pattern.as_bytes().iter().rev().copied().collect();
    let (scan_start, scan_end) = fuzzy_scan(&mut cursor, &reversed, ignore_case)?;
    // The backward cursor yields points in decreasing buffer order, so the
    // scan's "start"/"end" are swapped relative to buffer order.
    Some(MatchSpan::whole(scan_end, scan_start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchFlags;

    #[test]
    fn exact_text_matches_with_zero_errors() {
        let buf = Buffer::from_bytes("t", b"the quick brown fox");
        let first = buf.lines.first();
        let m = search_forward(&buf, Point::new(first, 0), "quick", false).unwrap();
        assert_eq!(m.start.offset, 4);
        assert_eq!(m.end.offset, 9);
    }

    #[test]
    fn one_substitution_within_budget_still_matches() {
        let buf = Buffer::from_bytes("t", b"the quack brown fox");
        let first = buf.lines.first();
        let m = search_forward(&buf, Point::new(first, 0), "quick", false);
        assert!(m.is_some());
    }

    #[test]
    fn unrelated_text_does_not_match() {
        let buf = Buffer::from_bytes("t", b"completely unrelated content");
        let first = buf.lines.first();
        assert!(search_forward(&buf, Point::new(first, 0), "quick", false).is_none());
    }

    #[test]
    fn fuzzy_flag_is_consulted_by_top_level_dispatch() {
        let buf = Buffer::from_bytes("t", b"the quack brown fox");
        let first = buf.lines.first();
        let m = crate::search_forward(&buf, Point::new(first, 0), "quick", MatchFlags::FUZZY);
        assert!(m.is_some());
    }
}
