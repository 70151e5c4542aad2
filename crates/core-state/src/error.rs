//! Error kinds for the editor core (spec §7), grounded on `memacs/edef.h`'s
//! status codes (`SUCCESS`/`NOTFOUND`/`CANCELLED`/`USERABORT`/`FAILURE`/
//! `SCRIPTERR`/`FATALERR`/`PANIC`) and the OS-error wrapping `var.c` does
//! around libc calls via `strerror`.
//!
//! `Success` itself isn't a variant here — it's the `Ok` side of
//! `Result<T, EditorError>` everywhere in the core (spec "explicit status
//! returns", no panics/exceptions on recoverable paths).

use thiserror::Error;

/// Typed failure returned by any core operation (spec §7).
#[derive(Debug, Error)]
pub enum EditorError {
    /// A lookup (buffer, mark, variable, window) found nothing, but the
    /// caller can treat that as a normal outcome rather than an abort.
    #[error("not found: {0}")]
    NotFound(String),

    /// A prompt or search was cancelled by the user (e.g. `Ctrl-G` during an
    /// interactive read); callers unwind to the command loop without a
    /// message.
    #[error("cancelled")]
    Cancelled,

    /// The user explicitly aborted (spec's `CK_Abort` key) — unwinds through
    /// macro/command nesting back to the top level, unlike `Cancelled` which
    /// only unwinds the current prompt.
    #[error("user abort")]
    UserAbort,

    /// An ordinary, recoverable failure with a message for the status line.
    #[error("{0}")]
    Failure(String),

    /// A script-level error (bad argument, undefined variable, type
    /// mismatch in an expression) — recoverable by the calling macro via its
    /// own error handling, but not silently ignorable like `NotFound`.
    #[error("script error: {0}")]
    ScriptError(String),

    /// Unrecoverable: the editor cannot continue (e.g. terminal state
    /// corrupted). Propagates all the way out of the command loop.
    #[error("fatal error: {0}")]
    FatalError(String),

    /// A wrapped OS-level failure (file I/O, terminal ioctl), carrying the
    /// underlying message the way `var.c` renders `strerror(errno)`.
    #[error("os error: {0}")]
    OSError(String),

    /// Converted from a caught panic at a command-loop boundary so the
    /// editor can report and continue rather than aborting the process.
    #[error("panic: {0}")]
    Panic(String),
}

impl EditorError {
    /// Whether this error should unwind past the current macro/command
    /// invocation back to the top-level read-dispatch loop (spec §5, §7).
    pub fn unwinds_to_top(&self) -> bool {
        matches!(
            self,
            EditorError::UserAbort | EditorError::FatalError(_) | EditorError::Panic(_)
        )
    }
}

impl From<std::io::Error> for EditorError {
    fn from(e: std::io::Error) -> Self {
        EditorError::OSError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_abort_and_fatal_unwind_to_top() {
        assert!(EditorError::UserAbort.unwinds_to_top());
        assert!(EditorError::FatalError("x".into()).unwinds_to_top());
        assert!(EditorError::Panic("x".into()).unwinds_to_top());
    }

    #[test]
    fn recoverable_kinds_do_not_unwind_to_top() {
        assert!(!EditorError::NotFound("x".into()).unwinds_to_top());
        assert!(!EditorError::Cancelled.unwinds_to_top());
        assert!(!EditorError::Failure("x".into()).unwinds_to_top());
        assert!(!EditorError::ScriptError("x".into()).unwinds_to_top());
    }

    #[test]
    fn io_error_wraps_as_os_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let e: EditorError = io.into();
        assert!(matches!(e, EditorError::OSError(_)));
    }
}
