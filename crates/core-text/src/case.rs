//! Case transforms by word, line, or region (spec §4.2 "Case transforms"),
//! grounded on `memacs/edit.c`'s `wordCaseKwds` family (`upperCaseWord`,
//! `lowerCaseWord`, `upperCaseLine`, `upperCaseRegion`, ...).

use crate::region::{self, Region};
use crate::{Buffer, LineId, Point};

/// Which letters in a matched span get changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOp {
    Upper,
    Lower,
    Title,
}

/// A word is any maximal run of characters in this set (spec default
/// `A-Za-z0-9_`, overridable per buffer/session).
pub fn is_word_char(c: char, word_chars: &str) -> bool {
    if word_chars.is_empty() {
        c.is_ascii_alphanumeric() || c == '_'
    } else {
        word_chars.contains(c)
    }
}

fn apply_case(s: &str, op: CaseOp, title_start: &mut bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match op {
            CaseOp::Upper => out.extend(c.to_uppercase()),
            CaseOp::Lower => out.extend(c.to_lowercase()),
            CaseOp::Title => {
                if *title_start {
                    out.extend(c.to_uppercase());
                } else {
                    out.extend(c.to_lowercase());
                }
                *title_start = !c.is_alphanumeric() && c != '_';
            }
        }
    }
    out
}

/// Transform the next `word_count` words (or up to `char_limit` bytes,
/// whichever bounds first) starting at `point`, advancing `point` past what
/// was changed (spec §4.2 "Word-case scans forward... consuming wordCount
/// words or charCount characters, whichever bounds first").
pub fn case_word(
    buf: &mut Buffer,
    point: &mut Point,
    op: CaseOp,
    word_count: usize,
    char_limit: Option<usize>,
) {
    let mut words_done = 0;
    let mut chars_done = 0;
    while words_done < word_count {
        if let Some(limit) = char_limit {
            if chars_done >= limit {
                break;
            }
        }
        let line = buf.lines.text(point.line).to_vec();
        if point.offset >= line.len() {
            let Some(next) = buf.lines.next(point.line) else {
                break;
            };
            point.line = next;
            point.offset = 0;
            continue;
        }
        let c = line[point.offset] as char;
        if !is_word_char(c, "") {
            point.offset += 1;
            chars_done += 1;
            continue;
        }
        let start = point.offset;
        let mut end = start;
        while end < line.len() && is_word_char(line[end] as char, "") {
            end += 1;
            if let Some(limit) = char_limit {
                if chars_done + (end - start) >= limit {
                    break;
                }
            }
        }
        let word = std::str::from_utf8(&line[start..end]).unwrap_or("");
        let mut title_start = true;
        let replaced = apply_case(word, op, &mut title_start);
        buf.lines.delete_range(point.line, start, end);
        buf.lines
            .insert_bytes(point.line, start, replaced.as_bytes());
        point.offset = start + replaced.len();
        chars_done += end - start;
        words_done += 1;
    }
}

/// Transform every byte of `line` in place.
pub fn case_line(buf: &mut Buffer, line: LineId, op: CaseOp) {
    let text = buf.lines.text(line).to_vec();
    let s = String::from_utf8_lossy(&text);
    let mut title_start = true;
    let replaced = apply_case(&s, op, &mut title_start);
    let len = buf.lines.used(line);
    buf.lines.delete_range(line, 0, len);
    buf.lines.insert_bytes(line, 0, replaced.as_bytes());
}

/// Transform the bytes covered by `region` in place (spec §4.2 "Case
/// transforms... region").
pub fn case_region(buf: &mut Buffer, region: &Region, op: CaseOp) {
    let bytes = region::region_to_string(buf, region);
    let s = String::from_utf8_lossy(&bytes);
    let mut title_start = true;
    let replaced = apply_case(&s, op, &mut title_start);

    let size = region.size.unsigned_abs() as usize;
    let mut remaining = size;
    let mut line = region.point.line;
    let mut offset = region.point.offset;
    let mut replaced_bytes = replaced.into_bytes();
    let mut cursor = 0;
    while remaining > 0 {
        let used = buf.lines.used(line);
        let avail = used - offset;
        let take = avail.min(remaining);
        buf.lines.delete_range(line, offset, offset + take);
        buf.lines
            .insert_bytes(line, offset, &replaced_bytes[cursor..cursor + take]);
        cursor += take;
        remaining -= take;
        if remaining == 0 {
            break;
        }
        remaining -= 1; // the delimiter, already correct in `replaced`
        cursor += 1;
        line = buf.lines.next(line).expect("region must not exceed buffer");
        offset = 0;
    }
    replaced_bytes.clear();
}
