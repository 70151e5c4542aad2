//! The `bpop` modal pager (spec §4.4 "Pop-up windows"): a read-only viewer
//! with its own key loop, rendering directly into the virtual screen with
//! a temporarily rewritten bottom mode line.

use core_events::{ExtendedKey, KeyMods, base};
use core_text::{Buffer, LineId};

/// What the caller should do after handling one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupAction {
    Continue,
    Quit,
    Help,
}

/// Pager state: which buffer is being shown and where its viewport starts.
pub struct Popup {
    pub buf_name: String,
    pub top_line: LineId,
    pub rows: u16,
}

impl Popup {
    pub fn new(buf: &Buffer, rows: u16) -> Self {
        Self {
            buf_name: buf.name.clone(),
            top_line: buf.lines.first(),
            rows,
        }
    }

    /// Handle one keystroke, scrolling `top_line` as needed (spec:
    /// "space/f page down, b page up, d/u half-page, line-nav bound to the
    /// same keys as forwLine/backLine, g top, G bottom, ESC/q quit, ? help").
    pub fn handle_key(&mut self, buf: &Buffer, key: ExtendedKey) -> PopupAction {
        let full_page = self.rows.max(1) as usize;
        let half_page = (full_page / 2).max(1);
        match key.base() {
            base::ESC => return PopupAction::Quit,
            b'q' => return PopupAction::Quit,
            b'?' => return PopupAction::Help,
            base::SPC | b'f' => self.scroll_forward(buf, full_page),
            b'b' if !key.is_ctrl() => self.scroll_backward(buf, full_page),
            b'd' => self.scroll_forward(buf, half_page),
            b'u' => self.scroll_backward(buf, half_page),
            b'j' if key.mods() == KeyMods::empty() => self.scroll_forward(buf, 1),
            b'k' if key.mods() == KeyMods::empty() => self.scroll_backward(buf, 1),
            b'g' => self.top_line = buf.lines.first(),
            b'G' => self.scroll_to_bottom(buf),
            _ => {}
        }
        PopupAction::Continue
    }

    fn scroll_forward(&mut self, buf: &Buffer, n: usize) {
        for _ in 0..n {
            match buf.lines.next(self.top_line) {
                Some(next) => self.top_line = next,
                None => break,
            }
        }
    }

    fn scroll_backward(&mut self, buf: &Buffer, n: usize) {
        for _ in 0..n {
            match buf.lines.prev(self.top_line) {
                Some(prev) => self.top_line = prev,
                None => break,
            }
        }
    }

    fn scroll_to_bottom(&mut self, buf: &Buffer) {
        let page = self.rows.max(1) as usize;
        let mut stack = Vec::with_capacity(page);
        let mut cur = buf.lines.last();
        stack.push(cur);
        while stack.len() < page {
            match buf.lines.prev(cur) {
                Some(prev) => {
                    cur = prev;
                    stack.push(cur);
                }
                None => break,
            }
        }
        self.top_line = *stack.last().unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(b: u8) -> ExtendedKey {
        ExtendedKey::new(b, KeyMods::empty())
    }

    fn nth(buf: &Buffer, n: usize) -> LineId {
        let mut id = buf.lines.first();
        for _ in 0..n {
            id = buf.lines.next(id).unwrap();
        }
        id
    }

    #[test]
    fn escape_and_q_quit() {
        let buf = Buffer::from_bytes("t", b"a\nb");
        let mut p = Popup::new(&buf, 2);
        assert_eq!(p.handle_key(&buf, key(base::ESC)), PopupAction::Quit);
        assert_eq!(p.handle_key(&buf, key(b'q')), PopupAction::Quit);
    }

    #[test]
    fn question_mark_requests_help() {
        let buf = Buffer::from_bytes("t", b"a");
        let mut p = Popup::new(&buf, 1);
        assert_eq!(p.handle_key(&buf, key(b'?')), PopupAction::Help);
    }

    #[test]
    fn space_pages_forward_by_window_height() {
        let buf = Buffer::from_bytes("t", b"0\n1\n2\n3\n4\n5");
        let mut p = Popup::new(&buf, 3);
        p.handle_key(&buf, key(base::SPC));
        assert_eq!(p.top_line, nth(&buf, 3));
    }

    #[test]
    fn b_pages_backward() {
        let buf = Buffer::from_bytes("t", b"0\n1\n2\n3\n4\n5");
        let mut p = Popup {
            buf_name: "t".into(),
            top_line: nth(&buf, 4),
            rows: 3,
        };
        p.handle_key(&buf, key(b'b'));
        assert_eq!(p.top_line, nth(&buf, 1));
    }

    #[test]
    fn g_jumps_to_top_and_shift_g_to_bottom() {
        let buf = Buffer::from_bytes("t", b"0\n1\n2\n3\n4\n5");
        let mut p = Popup {
            buf_name: "t".into(),
            top_line: nth(&buf, 3),
            rows: 2,
        };
        p.handle_key(&buf, key(b'g'));
        assert_eq!(p.top_line, buf.lines.first());
        p.handle_key(&buf, key(b'G'));
        assert_eq!(p.top_line, nth(&buf, 4));
    }

    #[test]
    fn half_page_scroll_moves_half_the_window_height() {
        let buf = Buffer::from_bytes("t", b"0\n1\n2\n3\n4\n5\n6\n7");
        let mut p = Popup::new(&buf, 4);
        p.handle_key(&buf, key(b'd'));
        assert_eq!(p.top_line, nth(&buf, 2));
    }
}
