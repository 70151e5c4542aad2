//! Variable/mark/session services and undo (spec §4.6, §5, §7), grounded on
//! the teacher's `core-state` crate — its `undo.rs` snapshot model survives
//! largely intact; the rest of this crate is rebuilt against the new
//! arena-based `core-text::Buffer` and the non-modal services this spec
//! describes (there is no vi-style mode here, so the teacher's
//! `SelectionSpan`/`Mode` machinery for a modal editor does not apply).

pub mod error;
pub mod marks;
pub mod session;
pub mod undo;
pub mod vars;

pub use error::{EditorError, Result};
pub use marks::FindMarkMode;
pub use session::{ExitCode, Session};
pub use undo::{EditRun, UndoEngine, UNDO_HISTORY_MAX};
pub use vars::{SystemVar, VarTable};
