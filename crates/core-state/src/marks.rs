//! `findMark`/`swapMark` services (spec §4.6), grounded on `memacs/edit.c`'s
//! `findbp`/mark-lookup helpers. `core_text::Buffer` already stores marks and
//! implements the raw `find_mark`/`create_mark`/`swap_mark` primitives; this
//! module adds the four lookup flavors the spec names on top of them.

use crate::error::{EditorError, Result};
use core_text::{Buffer, Mark, Point, REG_MARK, WRK_MARK};

/// The four `findMark` flavors (spec: "auto (return reserved mark per `n`
/// arg), query (return nil if missing), hard (prompt required), create
/// (create if absent)").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindMarkMode {
    /// Resolve one of the two reserved marks from a numeric argument: `n <
    /// 0` selects the work mark, otherwise the region mark.
    Auto,
    /// Return `Ok(None)` rather than an error when the name is unbound.
    Query,
    /// The caller already prompted the user for an explicit name; a miss is
    /// a real (reportable) failure, not a quiet `None`.
    Hard,
    /// Create the mark at `point` if it doesn't already exist.
    Create,
}

/// Resolve `name` against `buf` per `mode` (spec §4.6 `findMark`).
///
/// `point` supplies the position a `Create` lookup uses for a fresh mark,
/// and `n` is the numeric argument an `Auto` lookup uses to pick between the
/// reserved region/work marks.
pub fn find_mark(
    buf: &mut Buffer,
    mode: FindMarkMode,
    name: Option<char>,
    n: i64,
    point: Point,
) -> Result<Option<Mark>> {
    match mode {
        FindMarkMode::Auto => {
            let reserved = if n < 0 { WRK_MARK } else { REG_MARK };
            Ok(buf.find_mark(reserved).copied())
        }
        FindMarkMode::Query => {
            let name = name.ok_or_else(|| EditorError::ScriptError("mark name required".into()))?;
            Ok(buf.find_mark(name).copied())
        }
        FindMarkMode::Hard => {
            let name = name.ok_or_else(|| EditorError::ScriptError("mark name required".into()))?;
            buf.find_mark(name)
                .copied()
                .map(Some)
                .ok_or_else(|| EditorError::NotFound(format!("mark '{name}'")))
        }
        FindMarkMode::Create => {
            let name = name.ok_or_else(|| EditorError::ScriptError("mark name required".into()))?;
            if buf.find_mark(name).is_none() {
                buf.create_mark(name, point);
            }
            Ok(buf.find_mark(name).copied())
        }
    }
}

/// Atomically exchange `point` with mark `name`'s position, preserving the
/// mark's reframe row (spec §4.6 `swapMark`; `Buffer::swap_mark` already
/// implements the exchange — this wraps it with the spec's `NotFound` status
/// for a missing mark instead of a bare bool).
pub fn swap_mark(buf: &mut Buffer, name: char, point: &mut Point) -> Result<()> {
    if buf.swap_mark(name, point) {
        Ok(())
    } else {
        Err(EditorError::NotFound(format!("mark '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_selects_reserved_mark_by_sign_of_n() {
        let mut buf = Buffer::from_bytes("t", b"hello");
        let first = buf.lines.first();
        buf.create_mark(WRK_MARK, Point::new(first, 3));
        let m = find_mark(&mut buf, FindMarkMode::Auto, None, -1, Point::new(first, 0))
            .unwrap()
            .unwrap();
        assert_eq!(m.name, WRK_MARK);
        assert_eq!(m.point.offset, 3);
    }

    #[test]
    fn query_returns_none_for_missing_mark() {
        let mut buf = Buffer::from_bytes("t", b"hello");
        let first = buf.lines.first();
        let found = find_mark(&mut buf, FindMarkMode::Query, Some('z'), 0, Point::new(first, 0)).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn hard_errors_on_missing_mark() {
        let mut buf = Buffer::from_bytes("t", b"hello");
        let first = buf.lines.first();
        let err = find_mark(&mut buf, FindMarkMode::Hard, Some('z'), 0, Point::new(first, 0)).unwrap_err();
        assert!(matches!(err, EditorError::NotFound(_)));
    }

    #[test]
    fn create_mode_creates_then_finds() {
        let mut buf = Buffer::from_bytes("t", b"hello");
        let first = buf.lines.first();
        let p = Point::new(first, 2);
        let m = find_mark(&mut buf, FindMarkMode::Create, Some('a'), 0, p)
            .unwrap()
            .unwrap();
        assert_eq!(m.point.offset, 2);
        let again = find_mark(&mut buf, FindMarkMode::Create, Some('a'), 0, Point::new(first, 4))
            .unwrap()
            .unwrap();
        assert_eq!(again.point.offset, 2, "existing mark is not overwritten");
    }

    #[test]
    fn swap_mark_exchanges_point_and_preserves_reframe_row() {
        let mut buf = Buffer::from_bytes("t", b"hello world");
        let first = buf.lines.first();
        buf.create_mark('a', Point::new(first, 5));
        buf.marks.get_mut(&'a').unwrap().reframe_row = 7;
        let mut point = Point::new(first, 0);
        swap_mark(&mut buf, 'a', &mut point).unwrap();
        assert_eq!(point.offset, 5);
        let mark = buf.find_mark('a').unwrap();
        assert_eq!(mark.point.offset, 0);
        assert_eq!(mark.reframe_row, 7);
    }

    #[test]
    fn swap_mark_missing_name_is_not_found() {
        let mut buf = Buffer::from_bytes("t", b"hi");
        let mut point = Point::new(buf.lines.first(), 0);
        let err = swap_mark(&mut buf, 'z', &mut point).unwrap_err();
        assert!(matches!(err, EditorError::NotFound(_)));
    }
}
