//! Inline terminal-attribute sentinel decoding (spec §4.4 "Terminal
//! attributes"): `~b`/`~r`/`~u` on, `~0` all-off, `~~` literal `~`,
//! `~B`/`~R`/`~U` off-variants.

use core_terminal::TextAttr;

/// An attribute transition to apply at a given output byte position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrEvent {
    On(TextAttr),
    Off(TextAttr),
    AllOff,
}

/// Decode a source line's `~`-sentinel sequences into plain display bytes
/// plus the attribute events that occur at each output position.
///
/// Decoding only happens when `enabled` (the buffer's `termAttr` mode) and
/// the line is not the point line — "the current line renders raw, so the
/// user can edit the sequences" (spec §4.4).
pub fn decode(line: &[u8], enabled: bool, is_point_line: bool) -> (Vec<u8>, Vec<(usize, AttrEvent)>) {
    if !enabled || is_point_line {
        return (line.to_vec(), Vec::new());
    }
    let mut out = Vec::with_capacity(line.len());
    let mut events = Vec::new();
    let mut i = 0;
    while i < line.len() {
        if line[i] == b'~' && i + 1 < line.len() {
            let event = match line[i + 1] {
                b'b' => Some(AttrEvent::On(TextAttr::Bold)),
                b'r' => Some(AttrEvent::On(TextAttr::Reverse)),
                b'u' => Some(AttrEvent::On(TextAttr::Underline)),
                b'B' => Some(AttrEvent::Off(TextAttr::Bold)),
                b'R' => Some(AttrEvent::Off(TextAttr::Reverse)),
                b'U' => Some(AttrEvent::Off(TextAttr::Underline)),
                b'0' => Some(AttrEvent::AllOff),
                b'~' => {
                    out.push(b'~');
                    i += 2;
                    continue;
                }
                _ => None,
            };
            if let Some(event) = event {
                events.push((out.len(), event));
                i += 2;
                continue;
            }
        }
        out.push(line[i]);
        i += 1;
    }
    (out, events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_mode_passes_bytes_through_raw() {
        let (out, events) = decode(b"~bhello~0", false, false);
        assert_eq!(out, b"~bhello~0");
        assert!(events.is_empty());
    }

    #[test]
    fn point_line_is_never_decoded() {
        let (out, events) = decode(b"~bhello~0", true, true);
        assert_eq!(out, b"~bhello~0");
        assert!(events.is_empty());
    }

    #[test]
    fn decodes_on_off_sequences_and_strips_them() {
        let (out, events) = decode(b"~bhi~0 there", true, false);
        assert_eq!(out, b"hi there");
        assert_eq!(events, vec![(0, AttrEvent::On(TextAttr::Bold)), (2, AttrEvent::AllOff)]);
    }

    #[test]
    fn literal_tilde_escapes_without_emitting_an_event() {
        let (out, events) = decode(b"a~~b", true, false);
        assert_eq!(out, b"a~b");
        assert!(events.is_empty());
    }

    #[test]
    fn unrecognized_sequence_is_copied_through() {
        let (out, events) = decode(b"a~zb", true, false);
        assert_eq!(out, b"a~zb");
        assert!(events.is_empty());
    }
}
