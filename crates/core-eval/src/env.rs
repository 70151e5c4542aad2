//! Variable scopes (spec §4.6): global user variables (`$name`) and local
//! macro variables (bare `name`).
//!
//! `$name` lookup must try a system variable before falling back to a
//! plain global (spec §4.6 lookup order); `core-state::vars::VarTable`
//! already implements exactly that three-tier lookup (`$N` macro arg →
//! system variable → global), so a [`Scope`] with a session attached just
//! delegates to it instead of duplicating the table. A bare `Scope::new()`
//! with no session keeps its own flat global map for standalone use (unit
//! tests, or any caller with no running editor session to resolve system
//! variables against).

use core_state::{Session, VarTable};
use core_value::{ArrayHeap, Value};
use std::collections::HashMap;

struct SystemBacking<'v> {
    vars: &'v mut VarTable,
    session: &'v mut Session,
}

/// Holds the global/local variable tables and the array heap an evaluated
/// expression's array literals and GC roots live in.
pub struct Scope<'v> {
    globals: HashMap<String, Value>,
    locals: HashMap<String, Value>,
    heap: ArrayHeap,
    system: Option<SystemBacking<'v>>,
}

impl<'v> Scope<'v> {
    pub fn new() -> Self {
        Self {
            globals: HashMap::new(),
            locals: HashMap::new(),
            heap: ArrayHeap::new(),
            system: None,
        }
    }

    /// Attach a running session's variable table so `$name` resolves
    /// system variables (`$bufCount`, `$termCols`, ...) before falling
    /// back to a user global, per spec §4.6.
    pub fn with_session(vars: &'v mut VarTable, session: &'v mut Session) -> Self {
        Self {
            globals: HashMap::new(),
            locals: HashMap::new(),
            heap: ArrayHeap::new(),
            system: Some(SystemBacking { vars, session }),
        }
    }

    pub fn get_global(&self, name: &str) -> Option<Value> {
        if let Some(sys) = &self.system {
            return sys.vars.get_dollar(name, sys.session).ok();
        }
        self.globals.get(name).cloned()
    }

    pub fn set_global(&mut self, name: &str, v: Value) {
        if let Some(sys) = &mut self.system {
            // A read-only system variable (e.g. `$bufCount`) rejects the
            // assignment; the caller already checked `SystemVar::writable`
            // indirectly by reaching here via `$name =`, so there is no
            // richer error to surface through this infallible setter.
            let _ = sys.vars.set_dollar(name, v, sys.session);
            return;
        }
        self.globals.insert(name.to_string(), v);
    }

    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.locals.get(name).cloned()
    }
    pub fn set_local(&mut self, name: &str, v: Value) {
        self.locals.insert(name.to_string(), v);
    }
    pub fn heap(&mut self) -> &mut ArrayHeap {
        &mut self.heap
    }
    pub fn heap_ref(&self) -> &ArrayHeap {
        &self.heap
    }

    /// Run a mark-sweep collection rooted at every global and local
    /// variable (spec §4.1 "Array GC"). Callers invoke this between
    /// evaluations, never mid-expression.
    pub fn collect_garbage(&mut self) {
        let roots: Vec<Value> = self
            .globals
            .values()
            .chain(self.locals.values())
            .cloned()
            .collect();
        self.heap.collect(&roots);
    }
}

impl<'v> Default for Scope<'v> {
    fn default() -> Self {
        Self::new()
    }
}
