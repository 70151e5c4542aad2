//! Recursive-descent parser/evaluator (spec §4.5). Each `parse_*` method
//! implements one precedence level and calls the next-tighter level for its
//! operands; levels whose own operator doesn't match pass the operand (and
//! its lvalue-ness, if any) straight through unchanged.
//!
//! Two operators reappear at two precedence levels with type-dependent
//! meaning (`&` as bitwise-and vs. concatenation, `%` as modulo vs.
//! string-format). Rather than a static lookahead, the tighter level only
//! consumes the token when the already-evaluated lhs has the matching
//! type; otherwise it leaves the token for the looser level to claim. This
//! is an Open Question decision recorded in DESIGN.md.

use crate::lexer::{LexError, Token};
use crate::Scope;
use core_value::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("unexpected token: {0:?}")]
    UnexpectedToken(Token),
    #[error("expected end of expression, found {0:?}")]
    TrailingTokens(Token),
    #[error("left-hand side is not assignable")]
    NotLvalue,
    #[error("undefined variable {0:?}")]
    Undefined(String),
    #[error("type error: {0}")]
    Type(String),
    #[error("index out of bounds")]
    IndexOutOfBounds,
    #[error("invalid regex pattern: {0}")]
    BadPattern(String),
}

#[derive(Debug, Clone)]
enum Lvalue {
    Global(String),
    Local(String),
    ArrayElem(core_value::ArrayId, usize),
}

pub struct Parser<'s, 'v> {
    tokens: Vec<Token>,
    pos: usize,
    scope: &'s mut Scope<'v>,
}

type R = Result<(Value, Option<Lvalue>), EvalError>;

impl<'s, 'v> Parser<'s, 'v> {
    pub fn new(tokens: Vec<Token>, scope: &'s mut Scope<'v>) -> Self {
        Self {
            tokens,
            pos: 0,
            scope,
        }
    }

    /// Top level only (spec §4.5 level 16): `a,b,c = [1,2,3]` assigns the
    /// right-hand array's elements across the comma-separated targets
    /// (missing elements become `nil`; extra ones are discarded), instead
    /// of the ordinary comma operator's "evaluate and discard but the
    /// last" behavior. Anything else falls through to the normal
    /// precedence chain.
    pub fn parse_top_level(&mut self) -> Result<Value, EvalError> {
        if let Some(targets) = self.try_parse_parallel_targets() {
            self.advance(); // the '=' the lookahead confirmed is next
            let (rhs, _) = self.parse_kw_or(true)?;
            return self.apply_parallel_assign(&targets, rhs);
        }
        Ok(self.parse_comma(true)?.0)
    }

    /// Lookahead for a `name, name, ... =` prefix, restoring position and
    /// returning `None` if it doesn't match (a single target, or anything
    /// other than a bare identifier/global list, is left for the normal
    /// assignment path at level 16).
    fn try_parse_parallel_targets(&mut self) -> Option<Vec<Lvalue>> {
        let saved = self.pos;
        let mut targets = Vec::new();
        loop {
            let lv = match self.peek().clone() {
                Token::Global(name) => {
                    self.advance();
                    Lvalue::Global(name)
                }
                Token::Ident(name) => {
                    self.advance();
                    Lvalue::Local(name)
                }
                _ => {
                    self.pos = saved;
                    return None;
                }
            };
            targets.push(lv);
            if self.eat_sym(",") {
                continue;
            }
            break;
        }
        if targets.len() < 2 || !matches!(self.peek(), Token::Sym("=")) {
            self.pos = saved;
            return None;
        }
        Some(targets)
    }

    fn apply_parallel_assign(&mut self, targets: &[Lvalue], rhs: Value) -> Result<Value, EvalError> {
        let items: Vec<Value> = match &rhs {
            Value::Array(id) => self.scope.heap_ref().get(*id).cloned().unwrap_or_default(),
            other => vec![other.clone()],
        };
        for (i, lv) in targets.iter().enumerate() {
            let v = items.get(i).cloned().unwrap_or(Value::Nil);
            self.lvalue_set(lv, v);
        }
        Ok(rhs)
    }

    pub fn expect_eof(&mut self) -> Result<(), EvalError> {
        match self.peek() {
            Token::Eof => Ok(()),
            other => Err(EvalError::TrailingTokens(other.clone())),
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn eat_sym(&mut self, sym: &str) -> bool {
        if matches!(self.peek(), Token::Sym(s) if *s == sym) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn lvalue_get(&self, lv: &Lvalue) -> Option<Value> {
        match lv {
            Lvalue::Global(name) => self.scope.get_global(name),
            Lvalue::Local(name) => self.scope.get_local(name),
            Lvalue::ArrayElem(id, idx) => self.scope.heap_ref().get(*id)?.get(*idx).cloned(),
        }
    }

    fn lvalue_set(&mut self, lv: &Lvalue, v: Value) {
        match lv {
            Lvalue::Global(name) => self.scope.set_global(name, v),
            Lvalue::Local(name) => self.scope.set_local(name, v),
            Lvalue::ArrayElem(id, idx) => {
                if let Some(slot) = self.scope.heap().get_mut(*id) {
                    if *idx < slot.len() {
                        slot[*idx] = v;
                    }
                }
            }
        }
    }

    // ---- level 19: comma (top-level argument separator) ----
    fn parse_comma(&mut self, ef: bool) -> R {
        let mut result = self.parse_kw_or(ef)?;
        while self.eat_sym(",") {
            result = self.parse_kw_or(ef)?;
        }
        Ok(result)
    }

    // ---- level 18: low-precedence and/or ----
    fn parse_kw_or(&mut self, ef: bool) -> R {
        let (mut lhs, lv) = self.parse_kw_and(ef)?;
        let mut lv = lv;
        while matches!(self.peek(), Token::Or) {
            self.advance();
            let lhs_true = ef && lhs.truthy();
            let (rhs, _) = self.parse_kw_and(ef && !lhs_true)?;
            lhs = if !ef {
                Value::Nil
            } else if lhs_true {
                lhs
            } else {
                rhs
            };
            lv = None;
        }
        Ok((lhs, lv))
    }

    fn parse_kw_and(&mut self, ef: bool) -> R {
        let (mut lhs, lv) = self.parse_kw_not(ef)?;
        let mut lv = lv;
        while matches!(self.peek(), Token::And) {
            self.advance();
            let lhs_false = ef && !lhs.truthy();
            let (rhs, _) = self.parse_kw_not(ef && !lhs_false)?;
            lhs = if !ef {
                Value::Nil
            } else if lhs_false {
                lhs
            } else {
                rhs
            };
            lv = None;
        }
        Ok((lhs, lv))
    }

    // ---- level 17: low-precedence not ----
    fn parse_kw_not(&mut self, ef: bool) -> R {
        if matches!(self.peek(), Token::Not) {
            self.advance();
            let (v, _) = self.parse_kw_not(ef)?;
            return Ok((bool_val(ef && !v.truthy()), None));
        }
        self.parse_assign(ef)
    }

    // ---- level 16: assignment (right-associative) ----
    fn parse_assign(&mut self, ef: bool) -> R {
        let (lhs, lv) = self.parse_ternary(ef)?;
        let op = match self.peek() {
            Token::Sym(s @ ("=" | "+=" | "-=" | "*=" | "/=" | "%=" | "<<=" | ">>=" | "&=" | "|=" | "^=")) => *s,
            _ => return Ok((lhs, lv)),
        };
        self.advance();
        let (rhs, _) = self.parse_assign(ef)?;
        if !ef {
            return Ok((Value::Nil, None));
        }
        let Some(lv) = lv else {
            return Err(EvalError::NotLvalue);
        };
        let new_val = if op == "=" {
            rhs
        } else {
            let cur = self.lvalue_get(&lv).unwrap_or(Value::Nil);
            let base_op = &op[..op.len() - 1];
            self.apply_binary(base_op, &cur, &rhs)?
        };
        self.lvalue_set(&lv, new_val.clone());
        Ok((new_val, Some(lv)))
    }

    // ---- level 15: ternary (right-associative, short-circuit) ----
    fn parse_ternary(&mut self, ef: bool) -> R {
        let (cond, lv) = self.parse_logor(ef)?;
        if !self.eat_sym("?") {
            return Ok((cond, lv));
        }
        let take_then = ef && cond.truthy();
        let (then_v, _) = self.parse_ternary(ef && take_then)?;
        if !self.eat_sym(":") {
            return Err(EvalError::UnexpectedToken(self.peek().clone()));
        }
        let (else_v, _) = self.parse_ternary(ef && !take_then)?;
        let result = if !ef {
            Value::Nil
        } else if take_then {
            then_v
        } else {
            else_v
        };
        Ok((result, None))
    }

    // ---- level 14: logical or ----
    fn parse_logor(&mut self, ef: bool) -> R {
        let (mut lhs, lv) = self.parse_logand(ef)?;
        let mut lv = lv;
        while self.eat_sym("||") {
            let lhs_true = ef && lhs.truthy();
            let (rhs, _) = self.parse_logand(ef && !lhs_true)?;
            lhs = if !ef {
                Value::Nil
            } else if lhs_true {
                lhs
            } else {
                rhs
            };
            lv = None;
        }
        Ok((lhs, lv))
    }

    // ---- level 13: logical and ----
    fn parse_logand(&mut self, ef: bool) -> R {
        let (mut lhs, lv) = self.parse_equality(ef)?;
        let mut lv = lv;
        while self.eat_sym("&&") {
            let lhs_false = ef && !lhs.truthy();
            let (rhs, _) = self.parse_equality(ef && !lhs_false)?;
            lhs = if !ef {
                Value::Nil
            } else if lhs_false {
                lhs
            } else {
                rhs
            };
            lv = None;
        }
        Ok((lhs, lv))
    }

    // ---- level 12: equality / regex match ----
    fn parse_equality(&mut self, ef: bool) -> R {
        let (mut lhs, lv) = self.parse_relational(ef)?;
        let mut lv = lv;
        loop {
            let op = match self.peek() {
                Token::Sym(s @ ("==" | "!=" | "=~" | "!~")) => *s,
                _ => break,
            };
            self.advance();
            let (rhs, _) = self.parse_relational(ef)?;
            if ef {
                lhs = match op {
                    "==" => bool_val(lhs.deep_eq(&rhs, self.scope.heap_ref())),
                    "!=" => bool_val(!lhs.deep_eq(&rhs, self.scope.heap_ref())),
                    "=~" => bool_val(regex_match(&lhs, &rhs)?),
                    "!~" => bool_val(!regex_match(&lhs, &rhs)?),
                    _ => unreachable!(),
                };
            } else {
                lhs = Value::Nil;
            }
            lv = None;
        }
        Ok((lhs, lv))
    }

    // ---- level 11: relational ----
    fn parse_relational(&mut self, ef: bool) -> R {
        let (mut lhs, lv) = self.parse_concat(ef)?;
        let mut lv = lv;
        loop {
            let op = match self.peek() {
                Token::Sym(s @ ("<" | "<=" | ">" | ">=")) => *s,
                _ => break,
            };
            self.advance();
            let (rhs, _) = self.parse_concat(ef)?;
            if ef {
                lhs = bool_val(compare(&lhs, &rhs, op)?);
            } else {
                lhs = Value::Nil;
            }
            lv = None;
        }
        Ok((lhs, lv))
    }

    // ---- level 10: concatenation (& when lhs is string/array) ----
    fn parse_concat(&mut self, ef: bool) -> R {
        let (mut lhs, lv) = self.parse_strformat(ef)?;
        let mut lv = lv;
        loop {
            if !matches!(self.peek(), Token::Sym("&")) {
                break;
            }
            if ef && matches!(lhs, Value::Int(_) | Value::Bool(_) | Value::Nil) {
                break; // not a concat context; level 7 (bitand) will claim it
            }
            self.advance();
            let (rhs, _) = self.parse_strformat(ef)?;
            if ef {
                lhs = concat(&lhs, &rhs, self.scope.heap())?;
            } else {
                lhs = Value::Nil;
            }
            lv = None;
        }
        Ok((lhs, lv))
    }

    // ---- level 9: string format (% when lhs is string) ----
    fn parse_strformat(&mut self, ef: bool) -> R {
        let (mut lhs, lv) = self.parse_bitor(ef)?;
        let mut lv = lv;
        loop {
            if !matches!(self.peek(), Token::Sym("%")) {
                break;
            }
            if ef && !matches!(lhs, Value::Str(_)) {
                break; // level 3 (multiplicative) already claimed integer '%'
            }
            self.advance();
            let (rhs, _) = self.parse_bitor(ef)?;
            if ef {
                lhs = string_format(&lhs, &rhs, self.scope.heap_ref())?;
            } else {
                lhs = Value::Nil;
            }
            lv = None;
        }
        Ok((lhs, lv))
    }

    // ---- level 8: bitwise or / xor ----
    fn parse_bitor(&mut self, ef: bool) -> R {
        let (mut lhs, lv) = self.parse_bitand(ef)?;
        let mut lv = lv;
        loop {
            let op = match self.peek() {
                Token::Sym(s @ ("|" | "^")) => *s,
                _ => break,
            };
            self.advance();
            let (rhs, _) = self.parse_bitand(ef)?;
            if ef {
                let a = int_of(&lhs)?;
                let b = int_of(&rhs)?;
                lhs = Value::Int(if op == "|" { a | b } else { a ^ b });
            } else {
                lhs = Value::Nil;
            }
            lv = None;
        }
        Ok((lhs, lv))
    }

    // ---- level 7: bitwise and (only when lhs is integer) ----
    fn parse_bitand(&mut self, ef: bool) -> R {
        let (mut lhs, lv) = self.parse_shift(ef)?;
        let mut lv = lv;
        loop {
            if !matches!(self.peek(), Token::Sym("&")) {
                break;
            }
            if ef && !matches!(lhs, Value::Int(_)) {
                break; // not an integer lhs; level 10 (concat) will claim it
            }
            self.advance();
            let (rhs, _) = self.parse_shift(ef)?;
            if ef {
                lhs = Value::Int(int_of(&lhs)? & int_of(&rhs)?);
            } else {
                lhs = Value::Nil;
            }
            lv = None;
        }
        Ok((lhs, lv))
    }

    // ---- level 6: shifts ----
    fn parse_shift(&mut self, ef: bool) -> R {
        let (mut lhs, lv) = self.parse_numprefix(ef)?;
        let mut lv = lv;
        loop {
            let op = match self.peek() {
                Token::Sym(s @ ("<<" | ">>")) => *s,
                _ => break,
            };
            self.advance();
            let (rhs, _) = self.parse_numprefix(ef)?;
            if ef {
                let a = int_of(&lhs)?;
                let b = int_of(&rhs)?;
                lhs = Value::Int(if op == "<<" { a << b } else { a >> b });
            } else {
                lhs = Value::Nil;
            }
            lv = None;
        }
        Ok((lhs, lv))
    }

    // ---- level 5: numeric-prefix "n => expr" ----
    // Function-call argument dispatch is out of scope (see root DESIGN.md);
    // this evaluates the right-hand side and discards the prefix count.
    fn parse_numprefix(&mut self, ef: bool) -> R {
        let (lhs, lv) = self.parse_additive(ef)?;
        if !self.eat_sym("=>") {
            return Ok((lhs, lv));
        }
        let (rhs, rhs_lv) = self.parse_numprefix(ef)?;
        Ok((rhs, rhs_lv))
    }

    // ---- level 4: additive ----
    fn parse_additive(&mut self, ef: bool) -> R {
        let (mut lhs, lv) = self.parse_multiplicative(ef)?;
        let mut lv = lv;
        loop {
            let op = match self.peek() {
                Token::Sym(s @ ("+" | "-")) => *s,
                _ => break,
            };
            self.advance();
            let (rhs, _) = self.parse_multiplicative(ef)?;
            if ef {
                let a = int_of(&lhs)?;
                let b = int_of(&rhs)?;
                lhs = Value::Int(if op == "+" { a + b } else { a - b });
            } else {
                lhs = Value::Nil;
            }
            lv = None;
        }
        Ok((lhs, lv))
    }

    // ---- level 3: multiplicative (% is modulo only when lhs is integer) ----
    fn parse_multiplicative(&mut self, ef: bool) -> R {
        let (mut lhs, lv) = self.parse_unary(ef)?;
        let mut lv = lv;
        loop {
            let op = match self.peek() {
                Token::Sym(s @ ("*" | "/")) => *s,
                Token::Sym("%") if ef && matches!(lhs, Value::Int(_)) => "%",
                Token::Sym("%") if !ef => "%",
                _ => break,
            };
            self.advance();
            let (rhs, _) = self.parse_unary(ef)?;
            if ef {
                let a = int_of(&lhs)?;
                let b = int_of(&rhs)?;
                lhs = Value::Int(match op {
                    "*" => a.wrapping_mul(b),
                    "/" => {
                        if b == 0 {
                            return Err(EvalError::Type("division by zero".into()));
                        }
                        a / b
                    }
                    "%" => {
                        if b == 0 {
                            return Err(EvalError::Type("division by zero".into()));
                        }
                        a % b
                    }
                    _ => unreachable!(),
                });
            } else {
                lhs = Value::Nil;
            }
            lv = None;
        }
        Ok((lhs, lv))
    }

    // ---- level 2: unary prefix ----
    fn parse_unary(&mut self, ef: bool) -> R {
        match self.peek() {
            Token::Sym("+") => {
                self.advance();
                let (v, _) = self.parse_unary(ef)?;
                Ok((if ef { Value::Int(int_of(&v)?) } else { Value::Nil }, None))
            }
            Token::Sym("-") => {
                self.advance();
                let (v, _) = self.parse_unary(ef)?;
                Ok((if ef { Value::Int(-int_of(&v)?) } else { Value::Nil }, None))
            }
            Token::Sym("!") => {
                self.advance();
                let (v, _) = self.parse_unary(ef)?;
                Ok((bool_val(ef && !v.truthy()), None))
            }
            Token::Sym("~") => {
                self.advance();
                let (v, _) = self.parse_unary(ef)?;
                Ok((if ef { Value::Int(!int_of(&v)?) } else { Value::Nil }, None))
            }
            Token::Sym("++") | Token::Sym("--") => {
                let incr = matches!(self.peek(), Token::Sym("++"));
                self.advance();
                let (v, lv) = self.parse_unary(ef)?;
                if !ef {
                    return Ok((Value::Nil, None));
                }
                let Some(lv) = lv else {
                    return Err(EvalError::NotLvalue);
                };
                let n = int_of(&v)? + if incr { 1 } else { -1 };
                self.lvalue_set(&lv, Value::Int(n));
                Ok((Value::Int(n), Some(lv)))
            }
            _ => self.parse_postfix(ef),
        }
    }

    // ---- level 1: postfix ----
    fn parse_postfix(&mut self, ef: bool) -> R {
        let (mut v, mut lv) = self.parse_primary(ef)?;
        loop {
            match self.peek() {
                Token::Sym("++") | Token::Sym("--") => {
                    let incr = matches!(self.peek(), Token::Sym("++"));
                    self.advance();
                    if ef {
                        let Some(l) = lv.clone() else {
                            return Err(EvalError::NotLvalue);
                        };
                        let n = int_of(&v)?;
                        self.lvalue_set(&l, Value::Int(n + if incr { 1 } else { -1 }));
                        // postfix yields the *old* value
                    }
                }
                Token::Sym("[") => {
                    self.advance();
                    let (idx, _) = self.parse_ternary(ef)?;
                    if self.eat_sym(",") {
                        let (idx2, _) = self.parse_ternary(ef)?;
                        if !self.eat_sym("]") {
                            return Err(EvalError::UnexpectedToken(self.peek().clone()));
                        }
                        if ef {
                            v = slice(&v, &idx, &idx2, self.scope.heap())?;
                        } else {
                            v = Value::Nil;
                        }
                        lv = None;
                    } else {
                        if !self.eat_sym("]") {
                            return Err(EvalError::UnexpectedToken(self.peek().clone()));
                        }
                        if ef {
                            let Value::Array(id) = v else {
                                return Err(EvalError::Type("indexing a non-array".into()));
                            };
                            let i = int_of(&idx)?;
                            let len = self.scope.heap_ref().len(id);
                            let idx_usize = normalize_index(i, len)?;
                            v = self
                                .scope
                                .heap_ref()
                                .get(id)
                                .and_then(|a| a.get(idx_usize))
                                .cloned()
                                .unwrap_or(Value::Nil);
                            lv = Some(Lvalue::ArrayElem(id, idx_usize));
                        } else {
                            v = Value::Nil;
                            lv = None;
                        }
                    }
                }
                _ => break,
            }
        }
        Ok((v, lv))
    }

    // ---- primary ----
    fn parse_primary(&mut self, ef: bool) -> R {
        match self.advance() {
            Token::Int(n) => Ok((Value::Int(n), None)),
            Token::Str(s) => Ok((Value::str(s), None)),
            Token::True => Ok((Value::Bool(true), None)),
            Token::False => Ok((Value::Bool(false), None)),
            Token::Nil => Ok((Value::Nil, None)),
            Token::Global(name) => {
                let v = self.scope.get_global(&name).unwrap_or(Value::Nil);
                Ok((v, Some(Lvalue::Global(name))))
            }
            Token::Ident(name) => {
                if !ef {
                    return Ok((Value::Nil, Some(Lvalue::Local(name))));
                }
                match self.scope.get_local(&name) {
                    Some(v) => Ok((v, Some(Lvalue::Local(name)))),
                    None => Ok((Value::Nil, Some(Lvalue::Local(name)))),
                }
            }
            Token::Sym("(") => {
                let (v, lv) = self.parse_assign(ef)?;
                if !self.eat_sym(")") {
                    return Err(EvalError::UnexpectedToken(self.peek().clone()));
                }
                Ok((v, lv))
            }
            Token::Sym("[") => {
                let mut items = Vec::new();
                if !matches!(self.peek(), Token::Sym("]")) {
                    loop {
                        let (v, _) = self.parse_ternary(ef)?;
                        items.push(v);
                        if !self.eat_sym(",") {
                            break;
                        }
                    }
                }
                if !self.eat_sym("]") {
                    return Err(EvalError::UnexpectedToken(self.peek().clone()));
                }
                if ef {
                    let id = self.scope.heap().alloc(items);
                    Ok((Value::Array(id), None))
                } else {
                    Ok((Value::Nil, None))
                }
            }
            other => Err(EvalError::UnexpectedToken(other)),
        }
    }

    fn apply_binary(&mut self, op: &str, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
        Ok(match op {
            "+" => Value::Int(int_of(lhs)? + int_of(rhs)?),
            "-" => Value::Int(int_of(lhs)? - int_of(rhs)?),
            "*" => Value::Int(int_of(lhs)?.wrapping_mul(int_of(rhs)?)),
            "/" => {
                let b = int_of(rhs)?;
                if b == 0 {
                    return Err(EvalError::Type("division by zero".into()));
                }
                Value::Int(int_of(lhs)? / b)
            }
            "%" => {
                let b = int_of(rhs)?;
                if b == 0 {
                    return Err(EvalError::Type("division by zero".into()));
                }
                Value::Int(int_of(lhs)? % b)
            }
            "<<" => Value::Int(int_of(lhs)? << int_of(rhs)?),
            ">>" => Value::Int(int_of(lhs)? >> int_of(rhs)?),
            "&" => Value::Int(int_of(lhs)? & int_of(rhs)?),
            "|" => Value::Int(int_of(lhs)? | int_of(rhs)?),
            "^" => Value::Int(int_of(lhs)? ^ int_of(rhs)?),
            _ => return Err(EvalError::UnexpectedToken(Token::Sym("?"))),
        })
    }
}

fn bool_val(b: bool) -> Value {
    Value::Bool(b)
}

fn int_of(v: &Value) -> Result<i64, EvalError> {
    v.to_int()
        .ok_or_else(|| EvalError::Type(format!("expected integer, found {}", v.kind_name())))
}

fn compare(lhs: &Value, rhs: &Value, op: &str) -> Result<bool, EvalError> {
    use std::cmp::Ordering;
    let ord = match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        _ => int_of(lhs)?.cmp(&int_of(rhs)?),
    };
    Ok(match op {
        "<" => ord == Ordering::Less,
        "<=" => ord != Ordering::Greater,
        ">" => ord == Ordering::Greater,
        ">=" => ord != Ordering::Less,
        _ => unreachable!(),
    })
}

fn concat(lhs: &Value, rhs: &Value, heap: &mut core_value::ArrayHeap) -> Result<Value, EvalError> {
    match lhs {
        Value::Str(s) => {
            let mut out = s.clone();
            out.push_str(&rhs.to_text(heap));
            Ok(Value::str(out))
        }
        Value::Array(id) => {
            let mut items = heap.get(*id).cloned().unwrap_or_default();
            items.push(rhs.clone());
            Ok(Value::Array(heap.alloc(items)))
        }
        other => Err(EvalError::Type(format!(
            "cannot concatenate onto a {}",
            other.kind_name()
        ))),
    }
}

fn string_format(lhs: &Value, rhs: &Value, heap: &core_value::ArrayHeap) -> Result<Value, EvalError> {
    use core_value::builder::{FormatArg, StringBuilder};
    let Value::Str(fmt) = lhs else {
        return Err(EvalError::Type("format lhs must be a string".into()));
    };
    let owned_args: Vec<Value> = match rhs {
        Value::Array(id) => heap.get(*id).cloned().unwrap_or_default(),
        other => vec![other.clone()],
    };
    // %s args need an owned rendering to borrow from; precompute text for
    // every non-int arg before building the FormatArg slice.
    let texts: Vec<String> = owned_args
        .iter()
        .map(|v| match v {
            Value::Int(_) => String::new(),
            other => other.to_text(heap),
        })
        .collect();
    let args: Vec<FormatArg> = owned_args
        .iter()
        .zip(texts.iter())
        .map(|(v, text)| match v {
            Value::Int(n) => FormatArg::Int(*n),
            _ => FormatArg::Str(text.as_str()),
        })
        .collect();
    let mut builder = StringBuilder::open_append(String::new());
    builder.put_formatted(fmt, &args);
    Ok(Value::str(builder.close()))
}

fn regex_match(lhs: &Value, rhs: &Value) -> Result<bool, EvalError> {
    let Value::Str(text) = lhs else {
        return Err(EvalError::Type("=~ lhs must be a string".into()));
    };
    let Value::Str(pattern) = rhs else {
        return Err(EvalError::Type("=~ pattern must be a string".into()));
    };
    let re = regex::Regex::new(pattern).map_err(|e| EvalError::BadPattern(e.to_string()))?;
    Ok(re.is_match(text))
}

fn normalize_index(i: i64, len: usize) -> Result<usize, EvalError> {
    let idx = if i < 0 { i + len as i64 } else { i };
    if idx < 0 || idx as usize >= len {
        return Err(EvalError::IndexOutOfBounds);
    }
    Ok(idx as usize)
}

fn slice(v: &Value, lo: &Value, hi: &Value, heap: &mut core_value::ArrayHeap) -> Result<Value, EvalError> {
    let Value::Array(id) = v else {
        return Err(EvalError::Type("slicing a non-array".into()));
    };
    let data = heap.get(*id).cloned().unwrap_or_default();
    let len = data.len();
    let lo = normalize_index(int_of(lo)?, len)?;
    let hi_i = int_of(hi)?;
    let hi = if hi_i < 0 {
        (hi_i + len as i64).max(0) as usize
    } else {
        (hi_i as usize).min(len)
    };
    if lo > hi {
        return Err(EvalError::IndexOutOfBounds);
    }
    Ok(Value::Array(heap.alloc(data[lo..hi].to_vec())))
}
