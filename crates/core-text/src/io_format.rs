//! On-disk line-delimiter detection (spec §6.3).
//!
//! File reading/writing itself is an external collaborator's job (spec §1);
//! this module only defines the representation the buffer's line list needs:
//! which delimiter was detected, and whether the final line was left
//! unterminated so a round-trip write can reproduce it exactly.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDelim {
    Lf,
    Cr,
    CrLf,
}

impl LineDelim {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineDelim::Lf => b"\n",
            LineDelim::Cr => b"\r",
            LineDelim::CrLf => b"\r\n",
        }
    }
}

/// Detect the delimiter used by the first line break found, and whether the
/// stream ends without a trailing delimiter. Defaults to `Lf` if no
/// delimiter appears at all (spec: "auto-detected on first line and
/// enforced for the remainder of the file").
pub fn detect_delim(bytes: &[u8]) -> (LineDelim, bool) {
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => return (LineDelim::CrLf, ends_unterminated(bytes)),
            b'\r' => return (LineDelim::Cr, ends_unterminated(bytes)),
            b'\n' => return (LineDelim::Lf, ends_unterminated(bytes)),
            _ => i += 1,
        }
    }
    (LineDelim::Lf, true)
}

fn ends_unterminated(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes.last() != Some(&b'\n') && bytes.last() != Some(&b'\r')
}

/// Split a byte stream into line contents (delimiters stripped) using the
/// detected delimiter for the whole file.
pub fn split_lines(bytes: &[u8], delim: LineDelim) -> Vec<Vec<u8>> {
    let delim_bytes = delim.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(delim_bytes) {
            out.push(bytes[start..i].to_vec());
            i += delim_bytes.len();
            start = i;
        } else {
            i += 1;
        }
    }
    // A stream ending exactly on a delimiter has no trailing partial line;
    // don't manufacture one, or join_lines would double the final delimiter
    // on a round trip. An empty stream still yields one (empty) line.
    if start < bytes.len() || out.is_empty() {
        out.push(bytes[start..].to_vec());
    }
    out
}

/// Join line contents back into a byte stream using `delim`, honoring
/// `final_unterminated` for the round-trip flag recorded on the buffer.
pub fn join_lines(lines: &[Vec<u8>], delim: LineDelim, final_unterminated: bool) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        out.extend_from_slice(line);
        if i + 1 < lines.len() || !final_unterminated {
            out.extend_from_slice(delim.as_bytes());
        }
    }
    out
}
