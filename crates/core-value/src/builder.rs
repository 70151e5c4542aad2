//! Write-only string-builder cursor (spec §4.1).
//!
//! Batches allocations in fixed-size blocks, doubling on overflow, and
//! supports both append (the common case) and prepend (used by the
//! search/replace kill-ring path) modes against an existing base value.

const INITIAL_BLOCK: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Append,
    Prepend,
}

#[derive(Debug)]
pub struct StringBuilder {
    base: String,
    mode: Mode,
    buf: Vec<u8>,
}

impl StringBuilder {
    /// Open a fresh builder with nothing to append to.
    pub fn new() -> Self {
        Self {
            base: String::new(),
            mode: Mode::Append,
            buf: Vec::with_capacity(INITIAL_BLOCK),
        }
    }

    /// Open appending to `base`: the final value is `base` followed by
    /// whatever is written.
    pub fn open_append(base: String) -> Self {
        Self {
            base,
            mode: Mode::Append,
            buf: Vec::with_capacity(INITIAL_BLOCK),
        }
    }

    /// Open prepending to `base`: the final value is whatever is written
    /// followed by `base`.
    pub fn open_prepend(base: String) -> Self {
        Self {
            base,
            mode: Mode::Prepend,
            buf: Vec::with_capacity(INITIAL_BLOCK),
        }
    }

    fn ensure_capacity(&mut self, additional: usize) {
        let needed = self.buf.len() + additional;
        if needed > self.buf.capacity() {
            let mut cap = self.buf.capacity().max(INITIAL_BLOCK);
            while cap < needed {
                cap *= 2;
            }
            self.buf.reserve(cap - self.buf.len());
        }
    }

    pub fn put_byte(&mut self, b: u8) {
        self.ensure_capacity(1);
        self.buf.push(b);
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.ensure_capacity(bytes.len());
        self.buf.extend_from_slice(bytes);
    }

    pub fn put_str(&mut self, s: &str) {
        self.put_bytes(s.as_bytes());
    }

    /// `%d %s %c %u` with optional width/precision, printf-style (spec §4.1).
    pub fn put_formatted(&mut self, fmt: &str, args: &[FormatArg<'_>]) {
        let mut chars = fmt.chars().peekable();
        let mut arg_idx = 0;
        while let Some(c) = chars.next() {
            if c != '%' {
                let mut tmp = [0u8; 4];
                self.put_bytes(c.encode_utf8(&mut tmp).as_bytes());
                continue;
            }
            // parse optional width/precision: %[-][width][.precision]spec
            let mut left_align = false;
            let mut width = String::new();
            let mut precision: Option<String> = None;
            if chars.peek() == Some(&'-') {
                left_align = true;
                chars.next();
            }
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() {
                    width.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            if chars.peek() == Some(&'.') {
                chars.next();
                let mut p = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        p.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                precision = Some(p);
            }
            let Some(spec) = chars.next() else {
                self.put_byte(b'%');
                break;
            };
            if spec == '%' {
                self.put_byte(b'%');
                continue;
            }
            let arg = args.get(arg_idx).copied();
            arg_idx += 1;
            let rendered = match (spec, arg) {
                ('d', Some(FormatArg::Int(n))) => n.to_string(),
                ('u', Some(FormatArg::Int(n))) => (n.max(0) as u64).to_string(),
                ('s', Some(FormatArg::Str(s))) => {
                    if let Some(p) = &precision {
                        let p: usize = p.parse().unwrap_or(s.len());
                        s.chars().take(p).collect()
                    } else {
                        s.to_string()
                    }
                }
                ('c', Some(FormatArg::Int(n))) => {
                    char::from_u32(n as u32).map(|c| c.to_string()).unwrap_or_default()
                }
                _ => String::new(),
            };
            let w: usize = width.parse().unwrap_or(0);
            if rendered.len() >= w {
                self.put_str(&rendered);
            } else if left_align {
                self.put_str(&rendered);
                for _ in 0..(w - rendered.len()) {
                    self.put_byte(b' ');
                }
            } else {
                for _ in 0..(w - rendered.len()) {
                    self.put_byte(b' ');
                }
                self.put_str(&rendered);
            }
        }
    }

    /// Seal the builder, producing the final `String`.
    pub fn close(self) -> String {
        let written = String::from_utf8_lossy(&self.buf).into_owned();
        match self.mode {
            Mode::Append => self.base + &written,
            Mode::Prepend => written + &self.base,
        }
    }
}

impl Default for StringBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FormatArg<'a> {
    Int(i64),
    Str(&'a str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_builds_in_order() {
        let mut b = StringBuilder::new();
        b.put_str("hello, ");
        b.put_str("world");
        assert_eq!(b.close(), "hello, world");
    }

    #[test]
    fn prepend_mode_goes_before_base() {
        let b = StringBuilder::open_prepend("world".to_string());
        let mut b = b;
        b.put_str("hello ");
        assert_eq!(b.close(), "hello world");
    }

    #[test]
    fn append_to_existing_base() {
        let mut b = StringBuilder::open_append("hello ".to_string());
        b.put_str("world");
        assert_eq!(b.close(), "hello world");
    }

    #[test]
    fn formatted_directives() {
        let mut b = StringBuilder::new();
        b.put_formatted(
            "%-5d|%5s|%c",
            &[
                FormatArg::Int(3),
                FormatArg::Str("ab"),
                FormatArg::Int('Z' as i64),
            ],
        );
        assert_eq!(b.close(), "3    |   ab|Z");
    }

    #[test]
    fn grows_past_initial_block() {
        let mut b = StringBuilder::new();
        for _ in 0..100 {
            b.put_str("0123456789");
        }
        let s = b.close();
        assert_eq!(s.len(), 1000);
    }
}
