//! Global session state: buffer registry, current-window position, and the
//! cooperative-scheduling abort flag (spec §5), grounded on `memacs/edef.h`'s
//! global `bheadp`/`curbp`/`curwp` and the `chkabort`/`CK_Abort` paths it
//! wires into the command dispatcher.
//!
//! Single-threaded per spec §5 ("no locking... single execution thread"), so
//! the abort flag is a plain `bool`, not an atomic.

use crate::error::{EditorError, Result};
use core_text::Buffer;

/// Process exit status (spec §6.4): `0` clean, `1` user-confirmed exit with
/// dirty buffers, `2`-`9` progressive severity for fatal/OS/panic paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Clean,
    DirtyConfirmed,
    FatalError,
    OSError,
    Panic,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Clean => 0,
            ExitCode::DirtyConfirmed => 1,
            ExitCode::FatalError => 2,
            ExitCode::OSError => 3,
            ExitCode::Panic => 4,
        }
    }

    /// Fatal errors restore the terminal before exiting (spec §6.4); this is
    /// the general hook that a higher layer's shutdown path queries.
    pub fn requires_terminal_restore(self) -> bool {
        !matches!(self, ExitCode::Clean)
    }
}

/// The global buffer registry plus cooperative-scheduling state threaded
/// through the core (spec §5 design note "Global mutable state").
pub struct Session {
    buffers: Vec<Buffer>,
    current: usize,
    pub term_cols: u16,
    pub term_rows: u16,
    /// Set by the input path on `CK_Abort`; long operations poll it between
    /// iterations and unwind with `EditorError::UserAbort` (spec §5
    /// "Cancellation").
    abort: bool,
    pub last_match: String,
    pub return_msg: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            buffers: vec![Buffer::new("scratch")],
            current: 0,
            term_cols: 80,
            term_rows: 24,
            abort: false,
            last_match: String::new(),
            return_msg: String::new(),
        }
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn current_buffer(&self) -> &Buffer {
        &self.buffers[self.current]
    }

    pub fn current_buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffers[self.current]
    }

    pub fn current_buffer_name(&self) -> String {
        self.current_buffer().name.clone()
    }

    pub fn current_buffer_file(&self) -> Option<String> {
        self.current_buffer().filename.clone()
    }

    pub fn set_current_buffer_file(&mut self, path: String) {
        self.current_buffer_mut().filename = Some(path);
    }

    fn current_point_line(&self) -> core_text::LineId {
        let buf = self.current_buffer();
        buf.windows
            .first()
            .map(|w| w.point.line)
            .unwrap_or_else(|| buf.lines.first())
    }

    pub fn current_line_len(&self) -> usize {
        let line = self.current_point_line();
        self.current_buffer().lines.used(line)
    }

    pub fn current_line_number(&self) -> usize {
        let target = self.current_point_line();
        self.current_buffer()
            .lines
            .iter()
            .take_while(|&id| id != target)
            .count()
            + 1
    }

    pub fn window_count(&self) -> usize {
        self.buffers.iter().map(Buffer::nwind).sum()
    }

    pub fn current_window_num(&self) -> usize {
        if self.current_buffer().nwind() > 0 {
            1
        } else {
            0
        }
    }

    /// Add a new buffer to the registry, making it current (spec: "Each
    /// Buffer is owned by the global buffer registry").
    pub fn add_buffer(&mut self, buf: Buffer) {
        self.buffers.push(buf);
        self.current = self.buffers.len() - 1;
    }

    /// Switch the current buffer by name (spec §4.6 navigation needs a
    /// target buffer to operate on).
    pub fn select_buffer(&mut self, name: &str) -> Result<()> {
        let idx = self
            .buffers
            .iter()
            .position(|b| b.name == name)
            .ok_or_else(|| EditorError::NotFound(format!("buffer '{name}'")))?;
        self.current = idx;
        Ok(())
    }

    pub fn request_abort(&mut self) {
        self.abort = true;
    }

    pub fn abort_pending(&self) -> bool {
        self.abort
    }

    pub fn clear_abort(&mut self) {
        self.abort = false;
    }

    /// Check-and-unwind helper a long-running loop calls between iterations
    /// (spec §5 "Long operations check a global abort flag... and return an
    /// abort status").
    pub fn check_abort(&mut self) -> Result<()> {
        if self.abort {
            self.abort = false;
            Err(EditorError::UserAbort)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_one_scratch_buffer() {
        let s = Session::new();
        assert_eq!(s.buffer_count(), 1);
        assert_eq!(s.current_buffer_name(), "scratch");
    }

    #[test]
    fn adding_a_buffer_makes_it_current() {
        let mut s = Session::new();
        s.add_buffer(Buffer::new("second"));
        assert_eq!(s.buffer_count(), 2);
        assert_eq!(s.current_buffer_name(), "second");
    }

    #[test]
    fn select_buffer_switches_current() {
        let mut s = Session::new();
        s.add_buffer(Buffer::new("second"));
        s.select_buffer("scratch").unwrap();
        assert_eq!(s.current_buffer_name(), "scratch");
        assert!(s.select_buffer("missing").is_err());
    }

    #[test]
    fn abort_flag_round_trips_and_clears_on_check() {
        let mut s = Session::new();
        assert!(!s.abort_pending());
        s.request_abort();
        assert!(s.abort_pending());
        assert!(s.check_abort().is_err());
        assert!(!s.abort_pending());
        assert!(s.check_abort().is_ok());
    }

    #[test]
    fn exit_codes_match_spec_ordering() {
        assert_eq!(ExitCode::Clean.code(), 0);
        assert_eq!(ExitCode::DirtyConfirmed.code(), 1);
        assert!(!ExitCode::Clean.requires_terminal_restore());
        assert!(ExitCode::FatalError.requires_terminal_restore());
    }
}
