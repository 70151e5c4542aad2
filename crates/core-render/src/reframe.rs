//! Window reframing (spec §4.4 "Reframing"): pick a new `topLine` so the
//! point line lands at a target display row, either forced (centered) or
//! computed from a vertical-jump percentage and the direction of motion.

use core_text::{Buffer, Window, WindowFlags};

/// Which way the point moved to trigger an off-screen reframe. `Forced`
/// models an explicit reframe request with no associated motion (centers
/// the window).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionDirection {
    Up,
    Down,
    Forced,
}

/// Does `window` need reframing: the `Reframe` hint is set, or the point
/// line is not currently within the visible row range.
pub fn needs_reframe(buf: &Buffer, window: &Window) -> bool {
    window.flags.contains(WindowFlags::WF_REFRAME) || point_row(buf, window).is_none()
}

/// The point's current display row within the window, if visible.
fn point_row(buf: &Buffer, window: &Window) -> Option<usize> {
    let mut cur = window.top_line;
    for row in 0..window.rows as usize {
        if cur == window.point.line {
            return Some(row);
        }
        cur = buf.lines.next(cur)?;
    }
    None
}

/// Reframe `window` in place: pick a new `topLine` so the point lands at
/// the row implied by `direction` and `vjump_pct` (percent from the edge
/// reached), falling back to a centered window if the jump would overshoot
/// past the start of the buffer.
pub fn reframe(window: &mut Window, buf: &Buffer, vjump_pct: u8, direction: MotionDirection) {
    let rows = window.rows.max(1) as usize;
    let pct = vjump_pct.min(100) as usize;
    let last_row = rows.saturating_sub(1);

    let mut target_row = match direction {
        MotionDirection::Down => (last_row * pct) / 100,
        MotionDirection::Up => last_row - (last_row * pct) / 100,
        MotionDirection::Forced => rows / 2,
    };

    let available_above = lines_above(buf, window.point.line, target_row);
    if available_above < target_row {
        // Jump would overshoot past the start of the buffer; center instead.
        target_row = (rows / 2).min(available_above);
    }

    let mut top = window.point.line;
    for _ in 0..target_row {
        match buf.lines.prev(top) {
            Some(p) => top = p,
            None => break,
        }
    }
    window.top_line = top;
    window.flags.remove(WindowFlags::WF_REFRAME);
}

/// Count lines available above `from`, capped at `limit` (no need to walk
/// further once we know the jump target is reachable).
fn lines_above(buf: &Buffer, from: core_text::LineId, limit: usize) -> usize {
    let mut count = 0;
    let mut cur = from;
    while count < limit {
        match buf.lines.prev(cur) {
            Some(p) => {
                cur = p;
                count += 1;
            }
            None => break,
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Point;

    fn window_at(_buf: &Buffer, top: core_text::LineId, point: core_text::LineId, rows: u16) -> Window {
        Window {
            top_line: top,
            point: Point::new(point, 0),
            first_col: 0,
            rows,
            top_row: 0,
            flags: WindowFlags::empty(),
        }
    }

    fn nth_line(buf: &Buffer, n: usize) -> core_text::LineId {
        let mut id = buf.lines.first();
        for _ in 0..n {
            id = buf.lines.next(id).unwrap();
        }
        id
    }

    #[test]
    fn point_within_range_is_not_off_screen() {
        let buf = Buffer::from_bytes("t", b"a\nb\nc");
        let w = window_at(&buf, buf.lines.first(), nth_line(&buf, 1), 3);
        assert!(!needs_reframe(&buf, &w));
    }

    #[test]
    fn point_below_window_is_off_screen() {
        let buf = Buffer::from_bytes("t", b"a\nb\nc\nd\ne");
        let w = window_at(&buf, buf.lines.first(), nth_line(&buf, 4), 2);
        assert!(needs_reframe(&buf, &w));
    }

    #[test]
    fn forced_reframe_centers_the_window() {
        let buf = Buffer::from_bytes("t", b"0\n1\n2\n3\n4\n5\n6\n7\n8\n9");
        let point = nth_line(&buf, 5);
        let mut w = window_at(&buf, buf.lines.first(), point, 5);
        w.flags |= WindowFlags::WF_REFRAME;
        reframe(&mut w, &buf, 50, MotionDirection::Forced);
        // centered: 2 lines above point should now be the top.
        assert_eq!(w.top_line, nth_line(&buf, 3));
        assert!(!w.flags.contains(WindowFlags::WF_REFRAME));
    }

    #[test]
    fn downward_motion_reframes_using_vjump_percentage() {
        let buf = Buffer::from_bytes("t", b"0\n1\n2\n3\n4\n5\n6\n7\n8\n9");
        let point = nth_line(&buf, 9);
        let mut w = window_at(&buf, nth_line(&buf, 5), point, 5);
        reframe(&mut w, &buf, 25, MotionDirection::Down);
        // last_row=4, pct=25 -> target_row=1: point one row down from top.
        assert_eq!(w.top_line, nth_line(&buf, 8));
    }

    #[test]
    fn overshoot_near_buffer_start_falls_back_to_centering() {
        let buf = Buffer::from_bytes("t", b"0\n1\n2");
        let point = buf.lines.first();
        let mut w = window_at(&buf, buf.lines.first(), point, 9);
        reframe(&mut w, &buf, 90, MotionDirection::Up);
        assert_eq!(w.top_line, buf.lines.first());
    }
}
