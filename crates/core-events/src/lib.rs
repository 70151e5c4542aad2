//! Extended-key encoding (spec §6.2), grounded on `memacs/edef.h`'s bit
//! layout (`CTRL 0x0100`, `META 0x0200`, `SHFT 0x2000`, `FKEY 0x4000`, a
//! 3-bit prefix-class field) and `memacs/bind.c`'s display-string rendering
//! (`M-C-A`, `^X f`, `FN5`).
//!
//! The teacher's original `core-events` carried a tokio-based async event
//! bus (input/paste/tick streams, a bounded mpsc channel, telemetry
//! counters) for its multithreaded NGI input pipeline. This spec's
//! scheduling model is single-threaded cooperative (§5: "no preemption, no
//! background threads"), so none of that survives — only the key-encoding
//! piece the spec actually names.

use bitflags::bitflags;

bitflags! {
    /// Modifier/class bits occupying the high byte of an extended key (spec
    /// §6.2: "Bit 8: Ctrl. Bit 9: Meta. Bits 10-12: prefix class. Bit 13:
    /// Shift. Bit 14: function-key.").
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyMods: u16 {
        const CTRL   = 0x0100;
        const META   = 0x0200;
        const PREF1  = 0x0400;
        const PREF2  = 0x0800;
        const PREF3  = 0x1000;
        const SHIFT  = 0x2000;
        const FKEY   = 0x4000;
    }
}

impl KeyMods {
    const PREFIX_MASK: KeyMods = KeyMods::PREF1.union(KeyMods::PREF2).union(KeyMods::PREF3);

    pub fn prefix_class(self) -> Option<PrefixClass> {
        match self & Self::PREFIX_MASK {
            KeyMods::PREF1 => Some(PrefixClass::Pref1),
            KeyMods::PREF2 => Some(PrefixClass::Pref2),
            KeyMods::PREF3 => Some(PrefixClass::Pref3),
            _ => None,
        }
    }
}

/// One of the three named prefix-key classes (spec's `Pref1`/`Pref2`/`Pref3`;
/// MightEMacs binds these to `^C`/`^X`/a third custom prefix).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixClass {
    Pref1,
    Pref2,
    Pref3,
}

/// Reserved base-character literals (spec §6.2).
pub mod base {
    pub const SPC: u8 = b' ';
    pub const TAB: u8 = 0x09;
    pub const ESC: u8 = 0x1b;
    pub const RTN: u8 = 0x0d;
    pub const DEL: u8 = 0x7f;
}

/// A bit-packed keystroke identifier: base character in the low 8 bits, the
/// modifier/class bits from [`KeyMods`] in the high bits (spec §6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtendedKey(u16);

impl ExtendedKey {
    pub fn new(base: u8, mods: KeyMods) -> Self {
        Self((base as u16) | mods.bits())
    }

    pub fn base(self) -> u8 {
        (self.0 & 0x00ff) as u8
    }

    pub fn mods(self) -> KeyMods {
        KeyMods::from_bits_truncate(self.0 & 0xff00)
    }

    pub fn is_ctrl(self) -> bool {
        self.mods().contains(KeyMods::CTRL)
    }
    pub fn is_meta(self) -> bool {
        self.mods().contains(KeyMods::META)
    }
    pub fn is_shift(self) -> bool {
        self.mods().contains(KeyMods::SHIFT)
    }
    pub fn is_function(self) -> bool {
        self.mods().contains(KeyMods::FKEY)
    }
    pub fn prefix_class(self) -> Option<PrefixClass> {
        self.mods().prefix_class()
    }

    /// For a function key, the numeric function-key index carried in the
    /// base byte (e.g. `FN5`).
    pub fn function_number(self) -> Option<u8> {
        self.is_function().then_some(self.base())
    }

    /// Render as a display string: prefix tokens joined by spaces, then the
    /// base token (spec: "`M-C-A`, `^X f`, `FN5`").
    pub fn display(self) -> String {
        let mods = self.mods();
        let mut prefix_tokens = Vec::new();
        if let Some(class) = mods.prefix_class() {
            let literal = match class {
                PrefixClass::Pref1 => "^C",
                PrefixClass::Pref2 => "^X",
                PrefixClass::Pref3 => "^H",
            };
            prefix_tokens.push(literal.to_string());
        }

        let mut base_token = String::new();
        if mods.contains(KeyMods::FKEY) {
            base_token.push_str(&format!("FN{}", self.base()));
        } else {
            if mods.contains(KeyMods::META) {
                base_token.push_str("M-");
            }
            if mods.contains(KeyMods::CTRL) {
                base_token.push_str("C-");
            }
            let upper = mods.contains(KeyMods::SHIFT) || mods.contains(KeyMods::CTRL);
            base_token.push_str(&base_display(self.base(), upper));
        }

        if prefix_tokens.is_empty() {
            base_token
        } else {
            format!("{} {}", prefix_tokens.join(" "), base_token)
        }
    }
}

fn base_display(b: u8, shift: bool) -> String {
    match b {
        base::SPC => "SPC".to_string(),
        base::TAB => "TAB".to_string(),
        base::ESC => "ESC".to_string(),
        base::RTN => "RTN".to_string(),
        base::DEL => "DEL".to_string(),
        c if c.is_ascii_graphic() || c == b' ' => {
            let ch = c as char;
            if shift {
                ch.to_ascii_uppercase().to_string()
            } else {
                ch.to_string()
            }
        }
        other => format!("\\x{other:02x}"),
    }
}
