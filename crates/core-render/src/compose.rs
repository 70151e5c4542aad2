//! Window and mode-line composition (spec §4.4 "Composition"), grounded on
//! `vterm.c`'s `vupd_modeline` for mode-line field order: flags, screen
//! number, recording indicator, line/column indicators, mode list, buffer
//! name, filename, working directory, program identification.

use crate::attrs::{self, AttrEvent};
use crate::{LineFlags, VideoLine};
use core_text::{Buffer, BufferModes, LineId, Window, tabs::DEFAULT_TAB_SIZE};

/// Compose a window's body rows (spec §4.4 steps 1-5): walk `window.rows`
/// lines from `topLine`, expanding tabs/control/high-bit bytes, applying
/// horizontal scroll (`firstCol`) and the `$`-overflow marker, and flagging
/// the point row `Dot`.
pub fn compose_window(buf: &Buffer, window: &Window, term_cols: u16) -> Vec<VideoLine> {
    let term_attr = buf.modes.contains(BufferModes::TERM_ATTR);
    let mut rows = Vec::with_capacity(window.rows as usize);
    let mut cur: Option<LineId> = Some(window.top_line);
    for _ in 0..window.rows {
        match cur {
            Some(id) => {
                let is_point = id == window.point.line;
                let raw = buf.lines.text(id);
                let (decoded, events) = attrs::decode(raw, term_attr, is_point);
                let (expanded, _events) = expand_line(&decoded, DEFAULT_TAB_SIZE, &events);
                rows.push(make_row(&expanded, window.first_col, term_cols, is_point));
                cur = buf.lines.next(id);
            }
            None => rows.push(VideoLine::blank(term_cols as usize, b' ')),
        }
    }
    rows
}

/// Expand a decoded source line into display bytes: `\t` to the next hard
/// tab stop, bytes `< 0x20` and `0x7F` as `^X`, high-bit bytes as `<HH>`
/// (spec §4.4 step 2). Attribute event positions are remapped from source
/// byte offsets to output column offsets alongside the expansion.
fn expand_line(
    bytes: &[u8],
    tab_size: usize,
    events_in: &[(usize, AttrEvent)],
) -> (Vec<u8>, Vec<(usize, AttrEvent)>) {
    let mut out = Vec::with_capacity(bytes.len());
    let mut out_events = Vec::new();
    let mut ev = events_in.iter().peekable();
    for (i, &b) in bytes.iter().enumerate() {
        while let Some(&&(pos, kind)) = ev.peek() {
            if pos != i {
                break;
            }
            out_events.push((out.len(), kind));
            ev.next();
        }
        match b {
            b'\t' => {
                let pad = tab_size - (out.len() % tab_size);
                out.extend(std::iter::repeat_n(b' ', pad));
            }
            0x7f => out.extend_from_slice(b"^?"),
            b if b < 0x20 => {
                out.push(b'^');
                out.push(b ^ 0x40);
            }
            b if b >= 0x80 => out.extend(format!("<{b:02X}>").into_bytes()),
            b => out.push(b),
        }
    }
    while let Some(&&(pos, kind)) = ev.peek() {
        if pos != bytes.len() {
            break;
        }
        out_events.push((out.len(), kind));
        ev.next();
    }
    (out, out_events)
}

/// Apply horizontal scroll and width clamping to one expanded line (spec
/// §4.4 steps 3-5).
fn make_row(expanded: &[u8], first_col: usize, term_cols: u16, is_point: bool) -> VideoLine {
    let width = term_cols as usize;
    let visible: &[u8] = if first_col < expanded.len() {
        &expanded[first_col..]
    } else {
        &[]
    };
    let mut flags = LineFlags::empty();
    let mut bytes = if visible.len() > width {
        let mut v = visible[..width.saturating_sub(1)].to_vec();
        v.push(b'$');
        flags |= LineFlags::EXTENDED;
        v
    } else {
        visible.to_vec()
    };
    bytes.resize(width, b' ');
    if is_point {
        flags |= LineFlags::DOT;
    }
    VideoLine { bytes, flags }
}

/// Fields the mode-line routine draws (spec §4.4 step 6).
pub struct ModeLineInfo<'a> {
    pub screen_num: usize,
    pub recording: bool,
    pub show_line_col: bool,
    pub line_num: usize,
    pub col_num: usize,
    pub modes: &'a [&'a str],
    pub working_dir: &'a str,
    pub program_id: &'a str,
    pub fill_char: u8,
}

/// Compose a window's mode line: `(narrowed, changed)` flags, screen
/// number, macro-recording indicator, line/column indicators, mode list,
/// buffer name, filename, working directory, program id — padded with
/// `fill_char` to the full width (spec §4.4 step 6).
pub fn compose_mode_line(buf: &Buffer, info: &ModeLineInfo, term_cols: u16) -> VideoLine {
    let mut s = String::new();
    s.push(if buf.narrowed.is_some() { '<' } else { '-' });
    s.push(if buf.change_count > 0 { '*' } else { '-' });
    s.push(' ');

    if info.screen_num > 1 {
        s.push_str(&format!("S{} ", info.screen_num));
    }
    if info.recording {
        s.push_str("*R* ");
    }
    if info.show_line_col {
        s.push_str(&format!("L:{} C:{} ", info.line_num, info.col_num));
    }
    if !info.modes.is_empty() {
        s.push('(');
        s.push_str(&info.modes.join(" "));
        s.push_str(") ");
    }
    s.push_str(&buf.name);
    s.push(' ');
    if let Some(f) = &buf.filename {
        s.push_str("File: ");
        s.push_str(f);
        s.push(' ');
    }
    s.push_str(info.working_dir);
    s.push(' ');
    s.push_str(info.program_id);

    let mut bytes = s.into_bytes();
    bytes.truncate(term_cols as usize);
    bytes.resize(term_cols as usize, info.fill_char);
    VideoLine {
        bytes,
        flags: LineFlags::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::{BufferModes, Point, WindowFlags};

    fn window(buf: &Buffer, rows: u16) -> Window {
        Window {
            top_line: buf.lines.first(),
            point: Point::new(buf.lines.first(), 0),
            first_col: 0,
            rows,
            top_row: 0,
            flags: WindowFlags::empty(),
        }
    }

    #[test]
    fn tabs_expand_to_hard_stops() {
        let buf = Buffer::from_bytes("t", b"a\tb");
        let w = window(&buf, 1);
        let rows = compose_window(&buf, &w, 20);
        assert_eq!(&rows[0].bytes[..9], b"a       b");
    }

    #[test]
    fn control_and_high_bit_bytes_render_escaped() {
        let buf = Buffer::from_bytes("t", &[0x01, 0x80]);
        let w = window(&buf, 1);
        let rows = compose_window(&buf, &w, 20);
        assert_eq!(&rows[0].bytes[..6], b"^A<80>");
    }

    #[test]
    fn overflow_marks_extended_and_writes_dollar() {
        let buf = Buffer::from_bytes("t", b"0123456789");
        let w = window(&buf, 1);
        let rows = compose_window(&buf, &w, 5);
        assert!(rows[0].flags.contains(LineFlags::EXTENDED));
        assert_eq!(rows[0].bytes, b"0123$");
    }

    #[test]
    fn first_col_scrolls_content_left() {
        let buf = Buffer::from_bytes("t", b"0123456789");
        let mut w = window(&buf, 1);
        w.first_col = 5;
        let rows = compose_window(&buf, &w, 5);
        assert_eq!(rows[0].bytes, b"56789");
    }

    #[test]
    fn point_line_is_flagged_dot() {
        let buf = Buffer::from_bytes("t", b"a\nb");
        let w = window(&buf, 2);
        let rows = compose_window(&buf, &w, 10);
        assert!(rows[0].flags.contains(LineFlags::DOT));
        assert!(!rows[1].flags.contains(LineFlags::DOT));
    }

    #[test]
    fn beyond_buffer_end_rows_are_blank() {
        let buf = Buffer::from_bytes("t", b"a");
        let w = window(&buf, 3);
        let rows = compose_window(&buf, &w, 4);
        assert_eq!(rows[1].bytes, b"    ");
        assert_eq!(rows[2].bytes, b"    ");
    }

    #[test]
    fn point_line_skips_attr_decoding_even_when_enabled() {
        let mut buf = Buffer::from_bytes("t", b"~bhi");
        buf.modes |= BufferModes::TERM_ATTR;
        let w = window(&buf, 1);
        let rows = compose_window(&buf, &w, 10);
        assert_eq!(&rows[0].bytes[..4], b"~bhi");
    }

    #[test]
    fn mode_line_shows_buffer_name_and_pads_with_fill() {
        let buf = Buffer::new("scratch");
        let info = ModeLineInfo {
            screen_num: 1,
            recording: false,
            show_line_col: false,
            line_num: 1,
            col_num: 1,
            modes: &[],
            working_dir: "/tmp",
            program_id: "ox 0.1",
            fill_char: b'-',
        };
        let line = compose_mode_line(&buf, &info, 40);
        let text = String::from_utf8(line.bytes.clone()).unwrap();
        assert!(text.starts_with("-- scratch"));
        assert!(text.trim_end_matches('-').contains("scratch"));
        assert_eq!(line.bytes.len(), 40);
    }

    #[test]
    fn mode_line_marks_narrowed_and_changed_flags() {
        let mut buf = Buffer::new("t");
        buf.narrowed = Some(core_text::Narrowing {
            head: vec![],
            tail: vec![],
        });
        buf.change_count = 1;
        let info = ModeLineInfo {
            screen_num: 1,
            recording: false,
            show_line_col: false,
            line_num: 1,
            col_num: 1,
            modes: &[],
            working_dir: "",
            program_id: "",
            fill_char: b' ',
        };
        let line = compose_mode_line(&buf, &info, 20);
        assert_eq!(&line.bytes[..2], b"<*");
    }
}
