//! Cursor motion over the line-list model (spec §4.6 `moveChar`/`moveLine`/
//! `moveWord`), grounded on `memacs/nav.c`'s forward/backward character and
//! line-wise motion routines.
//!
//! These operate purely on a [`Buffer`] + [`Point`] pair and know nothing of
//! sessions, keymaps, or commands.

use crate::{Buffer, Point};
use unicode_segmentation::UnicodeSegmentation;

/// Move `point` one grapheme cluster left, crossing the line delimiter onto
/// the previous line's end when already at offset 0 (spec §4.6 `moveChar`,
/// negative `n`).
pub fn char_left(buf: &Buffer, point: &mut Point) -> bool {
    if point.offset > 0 {
        let line = buf.line_string(point.line);
        let prev = prev_boundary(&line, point.offset);
        point.offset = prev;
        true
    } else if let Some(prev_line) = buf.lines.prev(point.line) {
        point.line = prev_line;
        point.offset = buf.lines.used(prev_line);
        true
    } else {
        false
    }
}

/// Move `point` one grapheme cluster right, crossing onto the next line's
/// start at end-of-line (spec §4.6 `moveChar`, positive `n`).
pub fn char_right(buf: &Buffer, point: &mut Point) -> bool {
    let used = buf.lines.used(point.line);
    if point.offset < used {
        let line = buf.line_string(point.line);
        let next = next_boundary(&line, point.offset);
        point.offset = next.min(used);
        true
    } else if let Some(next_line) = buf.lines.next(point.line) {
        point.line = next_line;
        point.offset = 0;
        true
    } else {
        false
    }
}

/// Apply [`char_left`]/[`char_right`] `n.abs()` times in the direction of
/// `n`'s sign. Stops early (returns the count actually moved) at a buffer
/// boundary, matching `moveChar`'s "stops at buffer start/end" edge case.
pub fn move_char(buf: &Buffer, point: &mut Point, n: i64) -> i64 {
    let mut moved = 0;
    if n >= 0 {
        for _ in 0..n {
            if !char_right(buf, point) {
                break;
            }
            moved += 1;
        }
    } else {
        for _ in 0..(-n) {
            if !char_left(buf, point) {
                break;
            }
            moved -= 1;
        }
    }
    moved
}

/// Move to the first byte of the current line.
pub fn line_start(point: &mut Point) {
    point.offset = 0;
}

/// Move to one past the last byte of the current line.
pub fn line_end(buf: &Buffer, point: &mut Point) {
    point.offset = buf.lines.used(point.line);
}

/// Move `n` lines forward (`n >= 0`) or backward (`n < 0`), preserving a
/// sticky visual column the way `memacs/nav.c`'s `lforw`/`lback` callers do.
/// `goal_col` is threaded in/out across a run of vertical motions; pass
/// `None` on the first call of a run.
pub fn move_line(buf: &Buffer, point: &mut Point, n: i64, goal_col: Option<usize>) -> Option<usize> {
    let goal = goal_col.unwrap_or_else(|| visual_col(&buf.line_string(point.line), point.offset));
    let mut line = point.line;
    if n >= 0 {
        for _ in 0..n {
            match buf.lines.next(line) {
                Some(next) => line = next,
                None => break,
            }
        }
    } else {
        for _ in 0..(-n) {
            match buf.lines.prev(line) {
                Some(prev) => line = prev,
                None => break,
            }
        }
    }
    point.line = line;
    point.offset = byte_for_visual_col(&buf.line_string(line), goal);
    Some(goal)
}

fn visual_col(line: &str, byte_offset: usize) -> usize {
    let mut col = 0;
    for (b, g) in line.grapheme_indices(true) {
        if b >= byte_offset {
            break;
        }
        col += crate::egc_width(g) as usize;
    }
    col
}

fn byte_for_visual_col(line: &str, target_col: usize) -> usize {
    let mut col = 0;
    let mut byte = 0;
    for (b, g) in line.grapheme_indices(true) {
        let w = crate::egc_width(g) as usize;
        if col + w > target_col {
            return b;
        }
        col += w;
        byte = b + g.len();
    }
    byte
}

fn prev_boundary(line: &str, byte: usize) -> usize {
    line[..byte]
        .grapheme_indices(true)
        .last()
        .map(|(b, _)| b)
        .unwrap_or(0)
}

fn next_boundary(line: &str, byte: usize) -> usize {
    line.grapheme_indices(true)
        .find(|(b, _)| *b > byte)
        .map(|(b, _)| b)
        .unwrap_or(line.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClusterKind {
    Word,
    Blank,
    Other,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn classify(cluster: &str) -> ClusterKind {
    let mut chars = cluster.chars();
    let first = chars.next().unwrap_or(' ');
    if first.is_whitespace() {
        ClusterKind::Blank
    } else if is_word_char(first) {
        ClusterKind::Word
    } else {
        ClusterKind::Other
    }
}

/// Move forward to the start of the next word, crossing line boundaries and
/// treating an empty line as its own stop (spec §4.6 `moveWord`, grounded on
/// `memacs/nav.c`'s `forwWord`).
pub fn word_forward(buf: &Buffer, point: &mut Point) {
    // Skip the remainder of the current token.
    let line = buf.line_string(point.line);
    if point.offset < line.len() {
        let nb = next_boundary(&line, point.offset);
        let kind = classify(&line[point.offset..nb]);
        if kind != ClusterKind::Blank {
            point.offset = skip_kind(&line, point.offset, kind);
        }
    }
    skip_blanks_forward(buf, point);
}

fn skip_kind(line: &str, mut byte: usize, kind: ClusterKind) -> usize {
    while byte < line.len() {
        let nb = next_boundary(line, byte);
        if classify(&line[byte..nb]) != kind {
            break;
        }
        byte = nb;
    }
    byte
}

fn skip_blanks_forward(buf: &Buffer, point: &mut Point) {
    loop {
        let line = buf.line_string(point.line);
        if point.offset >= line.len() {
            match buf.lines.next(point.line) {
                Some(next) => {
                    point.line = next;
                    point.offset = 0;
                    if buf.lines.used(next) == 0 {
                        return; // empty lines are their own stop
                    }
                    continue;
                }
                None => return,
            }
        }
        let nb = next_boundary(&line, point.offset);
        if classify(&line[point.offset..nb]) == ClusterKind::Blank {
            point.offset = nb;
            continue;
        }
        return;
    }
}

/// Move backward to the start of the previous word (spec §4.6 `moveWord`,
/// grounded on `memacs/nav.c`'s `backWord`).
pub fn word_backward(buf: &Buffer, point: &mut Point) {
    loop {
        if point.offset == 0 {
            match buf.lines.prev(point.line) {
                Some(prev) => {
                    point.line = prev;
                    point.offset = buf.lines.used(prev);
                    if point.offset == 0 {
                        return; // empty lines are their own stop
                    }
                    continue;
                }
                None => return,
            }
        }
        let line = buf.line_string(point.line);
        let pb = prev_boundary(&line, point.offset);
        let kind = classify(&line[pb..point.offset]);
        if kind == ClusterKind::Blank {
            point.offset = pb;
            continue;
        }
        let mut byte = pb;
        while byte > 0 {
            let before = prev_boundary(&line, byte);
            if classify(&line[before..byte]) != kind {
                break;
            }
            byte = before;
        }
        point.offset = byte;
        return;
    }
}
