//! Variable scopes (spec §4.6), grounded on `memacs/var.c`'s three-tier
//! lookup (`sysvars[]` table, global hash, per-macro-frame local list) and
//! its `getsvar`/`putsvar` switch statements, which this module re-expresses
//! as a Rust enum match instead of the original's per-variable function
//! pointers (design note §9, "dynamic dispatch" re-architecture).

use crate::error::{EditorError, Result};
use crate::session::Session;
use core_value::Value;
use std::collections::HashMap;

/// A predefined, typed editor variable (spec "system variables... each with
/// a typed getter/setter"). Named after `var.c`'s `sv_*` enumerators; this
/// is a representative subset, not the full ~60-entry original table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemVar {
    ArgCount,
    BufCount,
    BufName,
    BufFile,
    BufLineNum,
    LineLen,
    WindCount,
    WindNum,
    TermCols,
    TermRows,
    HardTabSize,
    SoftTabSize,
    VertJump,
    HorzJump,
    WordChars,
    WrapCol,
    SearchPat,
    ReplacePat,
    Match,
    MaxLoop,
    MaxRecursion,
    ReturnMsg,
    WorkDir,
}

impl SystemVar {
    /// Parse a bare variable name (without the `$` sigil) into a system
    /// variable, or `None` if it names an ordinary user variable.
    pub fn parse(name: &str) -> Option<Self> {
        use SystemVar::*;
        Some(match name {
            "argCount" => ArgCount,
            "bufCount" => BufCount,
            "bufName" => BufName,
            "bufFile" => BufFile,
            "bufLineNum" => BufLineNum,
            "lineLen" => LineLen,
            "windCount" => WindCount,
            "windNum" => WindNum,
            "termCols" => TermCols,
            "termRows" => TermRows,
            "hardTabSize" => HardTabSize,
            "softTabSize" => SoftTabSize,
            "vertJump" => VertJump,
            "horzJump" => HorzJump,
            "wordChars" => WordChars,
            "wrapCol" => WrapCol,
            "searchPat" => SearchPat,
            "replacePat" => ReplacePat,
            "match" => Match,
            "maxLoop" => MaxLoop,
            "maxRecursion" => MaxRecursion,
            "returnMsg" => ReturnMsg,
            "workDir" => WorkDir,
            _ => return None,
        })
    }

    /// Whether `putsvar` accepts an assignment to this variable, or whether
    /// (like `$bufCount`) it's read-only and an assignment attempt is a
    /// script error.
    pub fn writable(self) -> bool {
        use SystemVar::*;
        !matches!(
            self,
            ArgCount | BufCount | BufLineNum | LineLen | WindCount | WindNum | TermCols
                | TermRows | Match | ReturnMsg
        )
    }
}

/// Config-like system variables that don't derive from `Session` state and
/// so need their own backing store (spec's "handful writable" subset).
#[derive(Debug, Clone)]
struct Writables {
    hard_tab_size: i64,
    soft_tab_size: i64,
    vert_jump: i64,
    horz_jump: i64,
    word_chars: String,
    wrap_col: i64,
    search_pat: String,
    replace_pat: String,
    max_loop: i64,
    max_recursion: i64,
    work_dir: String,
}

impl Default for Writables {
    fn default() -> Self {
        Self {
            hard_tab_size: 8,
            soft_tab_size: 8,
            vert_jump: 0,
            horz_jump: 0,
            word_chars: String::new(),
            wrap_col: 0,
            search_pat: String::new(),
            replace_pat: String::new(),
            max_loop: 0,
            max_recursion: 10,
            work_dir: String::new(),
        }
    }
}

/// A single macro invocation's local-variable frame (spec: "local... scoped
/// to the currently running macro invocation via a stack pointer into the
/// local list").
#[derive(Debug, Default, Clone)]
pub struct LocalFrame {
    vars: HashMap<String, Value>,
    /// Positional macro arguments, looked up as `$0`, `$1`, ...
    pub args: Vec<Value>,
}

/// The three-scope variable table (spec §4.6).
#[derive(Debug, Default, Clone)]
pub struct VarTable {
    globals: HashMap<String, Value>,
    frames: Vec<LocalFrame>,
    writables: Writables,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new macro-invocation frame (called on macro entry).
    pub fn push_frame(&mut self, args: Vec<Value>) {
        self.frames.push(LocalFrame {
            vars: HashMap::new(),
            args,
        });
    }

    /// Pop the current macro-invocation frame (called on macro return).
    pub fn pop_frame(&mut self) -> Option<LocalFrame> {
        self.frames.pop()
    }

    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Resolve a `$`-prefixed reference: digit → macro argument of the
    /// current frame, name → system variable (if it names one) else global.
    pub fn get_dollar(&self, name: &str, session: &Session) -> Result<Value> {
        if let Ok(index) = name.parse::<usize>() {
            let frame = self
                .frames
                .last()
                .ok_or_else(|| EditorError::ScriptError("no running macro for $N arg".into()))?;
            return frame
                .args
                .get(index)
                .cloned()
                .ok_or_else(|| EditorError::NotFound(format!("${index}")));
        }
        if let Some(sv) = SystemVar::parse(name) {
            return Ok(self.get_system(sv, session));
        }
        self.globals
            .get(name)
            .cloned()
            .ok_or_else(|| EditorError::NotFound(format!("${name}")))
    }

    /// Assign through a `$`-prefixed lvalue (system variable or global;
    /// `$N` macro arguments are not assignable).
    pub fn set_dollar(&mut self, name: &str, value: Value, session: &mut Session) -> Result<()> {
        if name.parse::<usize>().is_ok() {
            return Err(EditorError::ScriptError(
                "macro arguments are not assignable".into(),
            ));
        }
        if let Some(sv) = SystemVar::parse(name) {
            return self.set_system(sv, value, session);
        }
        self.globals.insert(name.to_string(), value);
        Ok(())
    }

    /// Resolve a bare (un-sigiled) reference: the nearest local frame above
    /// (and including) the current one. Per spec, a bare name never reads or
    /// creates a global.
    pub fn get_local(&self, name: &str) -> Result<Value> {
        for frame in self.frames.iter().rev() {
            if let Some(v) = frame.vars.get(name) {
                return Ok(v.clone());
            }
        }
        Err(EditorError::NotFound(name.to_string()))
    }

    /// Assign a bare name: updates it in whichever frame already holds it,
    /// else creates it in the current (innermost) frame. Outside any macro,
    /// there is no local scope to create in — this is a script error.
    pub fn set_local(&mut self, name: &str, value: Value) -> Result<()> {
        for frame in self.frames.iter_mut().rev() {
            if frame.vars.contains_key(name) {
                frame.vars.insert(name.to_string(), value);
                return Ok(());
            }
        }
        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| EditorError::ScriptError("no running macro for local var".into()))?;
        frame.vars.insert(name.to_string(), value);
        Ok(())
    }

    fn get_system(&self, sv: SystemVar, session: &Session) -> Value {
        use SystemVar::*;
        match sv {
            ArgCount => Value::Int(self.frames.last().map_or(0, |f| f.args.len() as i64)),
            BufCount => Value::Int(session.buffer_count() as i64),
            BufName => Value::str(session.current_buffer_name()),
            BufFile => session
                .current_buffer_file()
                .map(Value::str)
                .unwrap_or(Value::Nil),
            BufLineNum => Value::Int(session.current_line_number() as i64),
            LineLen => Value::Int(session.current_line_len() as i64),
            WindCount => Value::Int(session.window_count() as i64),
            WindNum => Value::Int(session.current_window_num() as i64),
            TermCols => Value::Int(session.term_cols as i64),
            TermRows => Value::Int(session.term_rows as i64),
            HardTabSize => Value::Int(self.writables.hard_tab_size),
            SoftTabSize => Value::Int(self.writables.soft_tab_size),
            VertJump => Value::Int(self.writables.vert_jump),
            HorzJump => Value::Int(self.writables.horz_jump),
            WordChars => Value::str(self.writables.word_chars.clone()),
            WrapCol => Value::Int(self.writables.wrap_col),
            SearchPat => Value::str(self.writables.search_pat.clone()),
            ReplacePat => Value::str(self.writables.replace_pat.clone()),
            Match => Value::str(session.last_match.clone()),
            MaxLoop => Value::Int(self.writables.max_loop),
            MaxRecursion => Value::Int(self.writables.max_recursion),
            ReturnMsg => Value::str(session.return_msg.clone()),
            WorkDir => Value::str(self.writables.work_dir.clone()),
        }
    }

    fn set_system(&mut self, sv: SystemVar, value: Value, session: &mut Session) -> Result<()> {
        if !sv.writable() {
            return Err(EditorError::ScriptError(format!(
                "{sv:?} is read-only"
            )));
        }
        let heap_text = |v: &Value| v.to_text(&core_value::ArrayHeap::new());
        use SystemVar::*;
        match sv {
            HardTabSize => self.writables.hard_tab_size = value.to_int().unwrap_or(8),
            SoftTabSize => self.writables.soft_tab_size = value.to_int().unwrap_or(8),
            VertJump => self.writables.vert_jump = value.to_int().unwrap_or(0),
            HorzJump => self.writables.horz_jump = value.to_int().unwrap_or(0),
            WordChars => self.writables.word_chars = heap_text(&value),
            WrapCol => self.writables.wrap_col = value.to_int().unwrap_or(0),
            SearchPat => self.writables.search_pat = heap_text(&value),
            ReplacePat => self.writables.replace_pat = heap_text(&value),
            MaxLoop => self.writables.max_loop = value.to_int().unwrap_or(0),
            MaxRecursion => self.writables.max_recursion = value.to_int().unwrap_or(10),
            WorkDir => self.writables.work_dir = heap_text(&value),
            BufFile => session.set_current_buffer_file(heap_text(&value)),
            _ => unreachable!("writable() guarantees one of the above"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_known_names_only() {
        assert_eq!(SystemVar::parse("bufCount"), Some(SystemVar::BufCount));
        assert_eq!(SystemVar::parse("notARealVar"), None);
    }

    #[test]
    fn read_only_system_var_rejects_assignment() {
        let mut vars = VarTable::new();
        let mut session = Session::new();
        let err = vars
            .set_dollar("bufCount", Value::Int(5), &mut session)
            .unwrap_err();
        assert!(matches!(err, EditorError::ScriptError(_)));
    }

    #[test]
    fn writable_system_var_roundtrips() {
        let mut vars = VarTable::new();
        let mut session = Session::new();
        vars.set_dollar("wrapCol", Value::Int(80), &mut session)
            .unwrap();
        assert_eq!(
            vars.get_dollar("wrapCol", &session).unwrap().to_int(),
            Some(80)
        );
    }

    #[test]
    fn global_variable_created_on_first_assignment() {
        let mut vars = VarTable::new();
        let mut session = Session::new();
        assert!(vars.get_dollar("count", &session).is_err());
        vars.set_dollar("count", Value::Int(1), &mut session)
            .unwrap();
        assert_eq!(vars.get_dollar("count", &session).unwrap().to_int(), Some(1));
    }

    #[test]
    fn local_lookup_walks_up_but_never_touches_globals() {
        let mut vars = VarTable::new();
        vars.push_frame(vec![Value::Int(7)]);
        vars.set_local("x", Value::Int(1)).unwrap();
        assert_eq!(vars.get_local("x").unwrap().to_int(), Some(1));
        assert!(vars.get_local("undefined").is_err());
    }

    #[test]
    fn macro_arg_lookup_by_dollar_digit() {
        let mut vars = VarTable::new();
        let session = Session::new();
        vars.push_frame(vec![Value::Int(42)]);
        assert_eq!(vars.get_dollar("0", &session).unwrap().to_int(), Some(42));
        assert!(vars.get_dollar("1", &session).is_err());
    }

    #[test]
    fn popping_a_frame_drops_its_locals() {
        let mut vars = VarTable::new();
        vars.push_frame(vec![]);
        vars.set_local("x", Value::Int(1)).unwrap();
        vars.pop_frame();
        assert!(vars.get_local("x").is_err());
    }
}
