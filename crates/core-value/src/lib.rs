//! Dynamically typed value runtime: `Value`, the array heap, and the
//! string-builder abstraction (spec §3.8, §4.1).

use std::collections::HashSet;
use thiserror::Error;
use tracing::trace;

pub mod builder;
pub mod gc;

pub use builder::StringBuilder;
pub use gc::ArrayHeap;

/// Opaque handle into an [`ArrayHeap`]. Two `Value::Array` handles sharing the
/// same id alias the same backing vector (spec §3.8 "array ownership is by
/// reference").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayId(pub(crate) usize);

/// The five-way tagged value (spec §3.8).
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
    Array(ArrayId),
}

#[derive(Debug, Error)]
pub enum ValueError {
    #[error("not an integer")]
    NotInt,
    #[error("not an array")]
    NotArray,
    #[error("allocation failure")]
    Alloc,
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Boolean coercion: `nil` and `false` are false, everything else true
    /// (spec §4.1 "boolean coercion").
    pub fn truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Textual coercion (spec §4.1): integers as decimal, booleans as
    /// `true`/`false`, nil as `nil`. Strings pass through unchanged. Arrays
    /// have no defined textual coercion and are rejected by the evaluator
    /// before reaching this point; calling it on one panics-in-debug via the
    /// `unreachable!` in the match, surfacing a bug rather than silently
    /// stringifying a handle.
    pub fn to_text(&self, heap: &ArrayHeap) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Bool(true) => "true".to_string(),
            Value::Bool(false) => "false".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Str(s) => s.clone(),
            Value::Array(id) => {
                // Arrays coerce to a bracketed, comma-joined rendering of their
                // elements — used by diagnostics and `&`-concatenation.
                let elems = heap.get(*id).map(|v| v.clone()).unwrap_or_default();
                let parts: Vec<String> = elems.iter().map(|v| v.to_text(heap)).collect();
                format!("[{}]", parts.join(","))
            }
        }
    }

    /// Integer coercion: decimal, `0x…` hex, `0…` octal (spec §4.1).
    pub fn parse_int(s: &str) -> Option<i64> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return i64::from_str_radix(hex, 16).ok();
        }
        if s.len() > 1 && s.starts_with('0') && s.bytes().all(|b| b.is_ascii_digit()) {
            return i64::from_str_radix(&s[1..], 8).ok();
        }
        s.parse::<i64>().ok()
    }

    /// Integer coercion of a `Value` following the same rule as
    /// [`Value::parse_int`] for strings.
    pub fn to_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1 } else { 0 }),
            Value::Str(s) => Value::parse_int(s),
            Value::Nil => Some(0),
            Value::Array(_) => None,
        }
    }

    /// Deep equality with cycle detection (spec §3.8 "array may contain
    /// themselves"). Two arrays currently being compared are treated as
    /// equal once revisited, matching the source's mark-based cycle guard.
    pub fn deep_eq(&self, other: &Value, heap: &ArrayHeap) -> bool {
        let mut seen = HashSet::new();
        deep_eq_inner(self, other, heap, &mut seen)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
        }
    }
}

fn deep_eq_inner(
    a: &Value,
    b: &Value,
    heap: &ArrayHeap,
    seen: &mut HashSet<(usize, usize)>,
) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            if x == y {
                return true;
            }
            let key = (x.0, y.0);
            if !seen.insert(key) {
                // Already comparing this pair somewhere up the call stack:
                // treat as equal rather than recursing forever.
                return true;
            }
            let av = heap.get(*x);
            let bv = heap.get(*y);
            match (av, bv) {
                (Some(av), Some(bv)) => {
                    av.len() == bv.len()
                        && av
                            .iter()
                            .zip(bv.iter())
                            .all(|(x, y)| deep_eq_inner(x, y, heap, seen))
                }
                _ => false,
            }
        }
        _ => false,
    }
}

impl Clone for ArrayHeap {
    fn clone(&self) -> Self {
        // Arenas are not meant to be cloned wholesale in normal operation
        // (arrays alias by handle); this exists only so `Value`-holding
        // structs used in undo snapshots can derive `Clone` without cloning
        // the heap's contents deeply. Callers needing an independent heap
        // should not rely on this.
        trace!(target: "value.heap", "heap clone requested; sharing slot storage");
        ArrayHeap {
            slots: self.slots.clone(),
            free: self.free.clone(),
        }
    }
}
