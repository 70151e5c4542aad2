//! Terminal collaborator (spec §6.1): `open`/`close`, `getKey`, `putChar`,
//! `flush`, `move(row,col)`, `eraseToEOL`/`eraseToEOP`, `beep`,
//! `attrOn`/`attrOff`, `typahead`. Grounded on the teacher's
//! `CrosstermBackend` (raw-mode enter/leave via an RAII guard so every error
//! path restores the terminal, spec §5 "Resource ownership").

use anyhow::Result;
use core_events::{ExtendedKey, KeyMods};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event as CtEvent, KeyCode as CtKeyCode, KeyEventKind, KeyModifiers as CtMods},
    execute, queue,
    style::{Attribute, SetAttribute},
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode,
        enable_raw_mode,
    },
};
use std::io::{Write, stdout};
use std::time::Duration;

pub mod capabilities;
pub use capabilities::TerminalCapabilities;

/// Text attributes a display engine can toggle (spec §6.1: "bold, reverse,
/// underline; on/off may be combined on curses-style drivers, or a single
/// all-off on termcap-style drivers").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextAttr {
    Bold,
    Reverse,
    Underline,
}

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn set_title(&mut self, title: &str) -> Result<()>;

    /// Block for the next keystroke and return it as an [`ExtendedKey`].
    fn get_key(&mut self) -> Result<ExtendedKey>;
    fn put_char(&mut self, c: char) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn move_to(&mut self, row: u16, col: u16) -> Result<()>;
    fn erase_to_eol(&mut self) -> Result<()>;
    fn erase_to_eop(&mut self) -> Result<()>;
    fn beep(&mut self) -> Result<()>;
    fn attr_on(&mut self, attr: TextAttr) -> Result<()>;
    fn attr_off(&mut self, attr: TextAttr) -> Result<()>;
    /// Number of keystrokes currently buffered, without consuming any (spec
    /// §6.1 `typahead`; used by §5's display-composition abort suspension
    /// point).
    fn typahead(&mut self) -> Result<usize>;
}

pub struct CrosstermBackend {
    entered: bool,
}

/// RAII guard ensuring terminal state restoration even if caller early-returns or panics.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
    active: bool,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    /// Enter and return a guard that will leave on drop.
    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard {
            backend: self,
            active: true,
        })
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
            self.entered = true;
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(stdout(), LeaveAlternateScreen, Show)?;
            disable_raw_mode()?;
            self.entered = false;
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }

    fn get_key(&mut self) -> Result<ExtendedKey> {
        loop {
            if let CtEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                return Ok(encode_crossterm_key(key.code, key.modifiers));
            }
        }
    }

    fn put_char(&mut self, c: char) -> Result<()> {
        let mut out = stdout();
        write!(out, "{c}")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        stdout().flush()?;
        Ok(())
    }

    fn move_to(&mut self, row: u16, col: u16) -> Result<()> {
        execute!(stdout(), MoveTo(col, row))?;
        Ok(())
    }

    fn erase_to_eol(&mut self) -> Result<()> {
        queue!(stdout(), Clear(ClearType::UntilNewLine))?;
        Ok(())
    }

    fn erase_to_eop(&mut self) -> Result<()> {
        queue!(stdout(), Clear(ClearType::FromCursorDown))?;
        Ok(())
    }

    fn beep(&mut self) -> Result<()> {
        let mut out = stdout();
        write!(out, "\x07")?;
        out.flush()?;
        Ok(())
    }

    fn attr_on(&mut self, attr: TextAttr) -> Result<()> {
        let a = match attr {
            TextAttr::Bold => Attribute::Bold,
            TextAttr::Reverse => Attribute::Reverse,
            TextAttr::Underline => Attribute::Underlined,
        };
        queue!(stdout(), SetAttribute(a))?;
        Ok(())
    }

    fn attr_off(&mut self, attr: TextAttr) -> Result<()> {
        let a = match attr {
            TextAttr::Bold => Attribute::NormalIntensity,
            TextAttr::Reverse => Attribute::NoReverse,
            TextAttr::Underline => Attribute::NoUnderline,
        };
        queue!(stdout(), SetAttribute(a))?;
        Ok(())
    }

    fn typahead(&mut self) -> Result<usize> {
        Ok(usize::from(event::poll(Duration::from_millis(0))?))
    }
}

/// Translate a crossterm key event into the spec's bit-packed [`ExtendedKey`]
/// (spec §6.2).
fn encode_crossterm_key(code: CtKeyCode, mods: CtMods) -> ExtendedKey {
    let mut bits = KeyMods::empty();
    if mods.contains(CtMods::CONTROL) {
        bits |= KeyMods::CTRL;
    }
    if mods.contains(CtMods::ALT) {
        bits |= KeyMods::META;
    }
    if mods.contains(CtMods::SHIFT) {
        bits |= KeyMods::SHIFT;
    }
    match code {
        CtKeyCode::Char(c) => ExtendedKey::new(c as u8, bits),
        CtKeyCode::Enter => ExtendedKey::new(core_events::base::RTN, bits),
        CtKeyCode::Tab => ExtendedKey::new(core_events::base::TAB, bits),
        CtKeyCode::Esc => ExtendedKey::new(core_events::base::ESC, bits),
        CtKeyCode::Backspace => ExtendedKey::new(core_events::base::DEL, bits),
        CtKeyCode::F(n) => ExtendedKey::new(n, bits | KeyMods::FKEY),
        _ => ExtendedKey::new(0, bits | KeyMods::FKEY),
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl<'a> Drop for TerminalGuard<'a> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_plain_char_with_no_mods() {
        let k = encode_crossterm_key(CtKeyCode::Char('a'), CtMods::empty());
        assert_eq!(k.base(), b'a');
        assert!(!k.is_ctrl());
    }

    #[test]
    fn encodes_ctrl_alt_combo() {
        let k = encode_crossterm_key(CtKeyCode::Char('x'), CtMods::CONTROL | CtMods::ALT);
        assert!(k.is_ctrl());
        assert!(k.is_meta());
    }

    #[test]
    fn encodes_function_key_with_fkey_flag() {
        let k = encode_crossterm_key(CtKeyCode::F(5), CtMods::empty());
        assert!(k.is_function());
        assert_eq!(k.function_number(), Some(5));
    }

    #[test]
    fn encodes_reserved_literals() {
        let enter = encode_crossterm_key(CtKeyCode::Enter, CtMods::empty());
        assert_eq!(enter.base(), core_events::base::RTN);
        let esc = encode_crossterm_key(CtKeyCode::Esc, CtMods::empty());
        assert_eq!(esc.base(), core_events::base::ESC);
    }
}
