//! Plain and regex search over a buffer's line list (spec §4.3), grounded on
//! `examples/original_source/src/search.c`'s Boyer-Moore plain search and
//! its `checkOpts`/`saveMatch` option-suffix and group-capture machinery.
//! This crate has no teacher-repo counterpart (`freddiehaddad-oxidized`
//! never had a search crate) — see DESIGN.md.

pub mod cursor;
mod flatten;
pub mod fuzzy;
pub mod plain;
pub mod regexp;

use core_text::{Buffer, Point};

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MatchFlags: u8 {
        /// Case-sensitive comparison.
        const EXACT  = 0b0000_0001;
        /// Case-insensitive comparison.
        const IGNORE = 0b0000_0010;
        const PLAIN  = 0b0000_0100;
        const REGEXP = 0b0000_1000;
        /// Regex `.` also matches `\n`.
        const MULTI  = 0b0001_0000;
        /// Approximate (bounded edit-distance) matching; see `fuzzy.rs`.
        const FUZZY  = 0b0010_0000;
    }
}

/// A located match (spec §4.3 "Match record"). `groups[0]` is always the
/// whole match (same span as `start`/`end`); `groups[1..]` are capture
/// groups 1..n, present only for regex search — plain-text search never
/// populates them, per `search.c`'s `saveMatch` ("for a plain-text search
/// we need only save group 0; there are no other groups").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: Point,
    pub end: Point,
    pub groups: Vec<Option<(Point, Point)>>,
}

impl MatchSpan {
    fn whole(start: Point, end: Point) -> MatchSpan {
        MatchSpan {
            start,
            end,
            groups: vec![Some((start, end))],
        }
    }

    pub fn group(&self, n: usize) -> Option<(Point, Point)> {
        self.groups.get(n).copied().flatten()
    }
}

/// Resolve the effective exactness for a pattern that set neither `EXACT`
/// nor `IGNORE`: follow the buffer's mode (spec §4.3 "The default exactness
/// follows the buffer's mode when neither Exact nor Ignore is set").
pub fn effective_flags(requested: MatchFlags, buffer_exact_default: bool) -> MatchFlags {
    if requested.intersects(MatchFlags::EXACT | MatchFlags::IGNORE) {
        requested
    } else if buffer_exact_default {
        requested | MatchFlags::EXACT
    } else {
        requested | MatchFlags::IGNORE
    }
}

/// Strip a trailing `:xyz` option suffix from `pattern` and fold the
/// options into `flags`, grounded on `search.c`'s `checkOpts`: the last
/// `:` in the string (not the first character) must be followed by one or
/// more option letters and nothing else, or no options are recognized at
/// all and the original string — colon included — is the literal pattern.
/// A duplicate or conflicting letter (e.g. both `i` and `e`) is likewise
/// treated as "no options": the whole suffix reverts to pattern text.
///
/// The option letters themselves (`i`/`e`/`f`/`m`/`p`/`r`) are this
/// transformation's own reconstruction: `search.h`, which defines the
/// source's `OptCh_*` character constants, was not part of the retrieved
/// `original_source/` pack (see DESIGN.md).
pub fn parse_pattern_options(pattern: &str, base: MatchFlags) -> (String, MatchFlags) {
    let Some(colon) = pattern.rfind(':') else {
        return (pattern.to_string(), base);
    };
    if colon == 0 {
        return (pattern.to_string(), base);
    }
    let suffix = &pattern[colon + 1..];
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_lowercase()) {
        return (pattern.to_string(), base);
    }

    let mut flags = MatchFlags::empty();
    for ch in suffix.chars() {
        let (bit, conflict) = match ch {
            'i' => (MatchFlags::IGNORE, MatchFlags::IGNORE | MatchFlags::EXACT),
            'e' => (MatchFlags::EXACT, MatchFlags::EXACT | MatchFlags::IGNORE),
            'f' => (
                MatchFlags::FUZZY,
                MatchFlags::FUZZY | MatchFlags::PLAIN,
            ),
            'm' => (
                MatchFlags::MULTI,
                MatchFlags::MULTI | MatchFlags::PLAIN,
            ),
            'p' => (
                MatchFlags::PLAIN,
                MatchFlags::PLAIN | MatchFlags::FUZZY | MatchFlags::MULTI | MatchFlags::REGEXP,
            ),
            'r' => (MatchFlags::REGEXP, MatchFlags::REGEXP | MatchFlags::PLAIN),
            _ => return (pattern.to_string(), base),
        };
        if flags.intersects(conflict) {
            return (pattern.to_string(), base);
        }
        flags |= bit;
    }
    if flags.intersects(MatchFlags::FUZZY | MatchFlags::MULTI) {
        flags |= MatchFlags::REGEXP;
    }
    (pattern[..colon].to_string(), base | flags)
}

/// Search forward from `from` (exclusive of lines before it) for `pattern`,
/// dispatching to the plain, fuzzy, or regex engine per `flags`.
pub fn search_forward(
    buf: &Buffer,
    from: Point,
    pattern: &str,
    flags: MatchFlags,
) -> Option<MatchSpan> {
    let (pattern, flags) = parse_pattern_options(pattern, flags);
    if flags.contains(MatchFlags::FUZZY) {
        fuzzy::search_forward(buf, from, &pattern, flags.contains(MatchFlags::IGNORE))
    } else if flags.contains(MatchFlags::REGEXP) {
        regexp::search_forward(buf, from, &pattern, flags)
    } else {
        plain::search_forward(buf, from, &pattern, flags)
    }
}

/// Search backward from `from` for `pattern`.
pub fn search_backward(
    buf: &Buffer,
    from: Point,
    pattern: &str,
    flags: MatchFlags,
) -> Option<MatchSpan> {
    let (pattern, flags) = parse_pattern_options(pattern, flags);
    if flags.contains(MatchFlags::FUZZY) {
        fuzzy::search_backward(buf, from, &pattern, flags.contains(MatchFlags::IGNORE))
    } else if flags.contains(MatchFlags::REGEXP) {
        regexp::search_backward(buf, from, &pattern, flags)
    } else {
        plain::search_backward(buf, from, &pattern, flags)
    }
}
