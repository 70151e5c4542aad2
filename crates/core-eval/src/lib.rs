//! Recursive-descent expression evaluator (spec §4.5), each precedence
//! level calling the next-tighter level for its operands, with short-circuit
//! evaluation for `&&`/`||`/`and`/`or`/`?:` carried via an `evaluating` flag
//! that is cleared while walking a dead branch and restored afterward.
//!
//! Command/macro/alias resolution (spec §4.5 "Function calls") is an
//! external collaborator left out of this crate (see root DESIGN.md);
//! everything else in the precedence chain is implemented.

mod env;
mod lexer;
mod parser;

pub use env::Scope;
pub use lexer::{LexError, Token};
pub use parser::{EvalError, Parser};

use core_value::Value;

/// Evaluate a single expression string against `scope`, returning its
/// [`Value`] result.
pub fn eval(src: &str, scope: &mut Scope<'_>) -> Result<Value, EvalError> {
    let tokens = lexer::tokenize(src)?;
    let mut parser = Parser::new(tokens, scope);
    let v = parser.parse_top_level()?;
    parser.expect_eof()?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> Value {
        let mut scope = Scope::new();
        eval(src, &mut scope).unwrap()
    }

    fn run_in(src: &str, scope: &mut Scope) -> Value {
        eval(src, scope).unwrap()
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(run("2 + 3 * 4").to_int(), Some(14));
        assert_eq!(run("(2 + 3) * 4").to_int(), Some(20));
        assert_eq!(run("-5 + 2").to_int(), Some(-3));
        assert_eq!(run("7 % 3").to_int(), Some(1));
    }

    #[test]
    fn relational_and_equality() {
        assert_eq!(run("3 < 5").truthy(), true);
        assert_eq!(run("3 == 3").truthy(), true);
        assert_eq!(run("3 != 3").truthy(), false);
    }

    #[test]
    fn logical_short_circuit_skips_side_effects() {
        let mut scope = Scope::new();
        run_in("$x = 0", &mut scope);
        run_in("false && ($x = 1)", &mut scope);
        assert_eq!(scope.get_global("x").unwrap().to_int(), Some(0));
        run_in("true || ($x = 2)", &mut scope);
        assert_eq!(scope.get_global("x").unwrap().to_int(), Some(0));
    }

    #[test]
    fn ternary_is_right_associative_and_lazy() {
        let mut scope = Scope::new();
        let v = run_in("1 ? 10 : 20", &mut scope);
        assert_eq!(v.to_int(), Some(10));
        // nil, not 0, is falsy (spec boolean coercion: only nil/false are false).
        let v = run_in("nil ? 10 : 20", &mut scope);
        assert_eq!(v.to_int(), Some(20));
    }

    #[test]
    fn assignment_creates_globals_and_returns_value() {
        let mut scope = Scope::new();
        let v = run_in("$count = 5", &mut scope);
        assert_eq!(v.to_int(), Some(5));
        assert_eq!(scope.get_global("count").unwrap().to_int(), Some(5));
        run_in("$count += 3", &mut scope);
        assert_eq!(scope.get_global("count").unwrap().to_int(), Some(8));
    }

    #[test]
    fn string_concat_with_int_coercion() {
        let v = run(r#""count: " & 5"#);
        match v {
            Value::Str(s) => assert_eq!(s, "count: 5"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn bitwise_and_on_integers() {
        assert_eq!(run("6 & 3").to_int(), Some(2));
    }

    #[test]
    fn array_literal_and_index() {
        let mut scope = Scope::new();
        let v = run_in("[1, 2, 3][1]", &mut scope);
        assert_eq!(v.to_int(), Some(2));
    }

    #[test]
    fn unary_not_and_bitnot() {
        assert_eq!(run("!false").truthy(), true);
        assert_eq!(run("!nil").truthy(), true);
        assert_eq!(run("~0").to_int(), Some(-1));
    }

    #[test]
    fn division_and_modulo_by_zero_are_errors_not_clamped() {
        assert!(matches!(
            eval("5 / 0", &mut Scope::new()),
            Err(EvalError::Type(_))
        ));
        assert!(matches!(
            eval("5 % 0", &mut Scope::new()),
            Err(EvalError::Type(_))
        ));
        let mut scope = Scope::new();
        run_in("$x = 5", &mut scope);
        assert!(eval("$x /= 0", &mut scope).is_err());
    }

    #[test]
    fn parallel_assignment_destructures_array_elements() {
        let mut scope = Scope::new();
        let v = run_in("a,b,c = [1,2,3]", &mut scope);
        match v {
            Value::Array(_) => {}
            other => panic!("expected the rhs array back, got {other:?}"),
        }
        assert_eq!(scope.get_local("a").unwrap().to_int(), Some(1));
        assert_eq!(scope.get_local("b").unwrap().to_int(), Some(2));
        assert_eq!(scope.get_local("c").unwrap().to_int(), Some(3));
    }

    #[test]
    fn parallel_assignment_pads_missing_elements_with_nil() {
        let mut scope = Scope::new();
        run_in("a,b,c = [1]", &mut scope);
        assert_eq!(scope.get_local("a").unwrap().to_int(), Some(1));
        assert!(matches!(scope.get_local("b").unwrap(), Value::Nil));
        assert!(matches!(scope.get_local("c").unwrap(), Value::Nil));
    }

    #[test]
    fn single_target_assignment_is_not_treated_as_parallel() {
        // A lone target still goes through the ordinary assignment path,
        // not the parallel-assignment destructuring.
        let mut scope = Scope::new();
        let v = run_in("a = 5", &mut scope);
        assert_eq!(v.to_int(), Some(5));
    }

    #[test]
    fn dollar_name_resolves_system_variables_through_the_session() {
        let mut vars = core_state::VarTable::new();
        let mut session = core_state::Session::new();
        session.term_cols = 132;
        let mut scope = Scope::with_session(&mut vars, &mut session);
        let v = eval("$termCols", &mut scope).unwrap();
        assert_eq!(v.to_int(), Some(132));
    }

    #[test]
    fn dollar_name_still_falls_back_to_a_user_global_through_the_session() {
        let mut vars = core_state::VarTable::new();
        let mut session = core_state::Session::new();
        let mut scope = Scope::with_session(&mut vars, &mut session);
        eval("$count = 9", &mut scope).unwrap();
        assert_eq!(eval("$count", &mut scope).unwrap().to_int(), Some(9));
    }
}
