//! This module defines the expression tree shared by the parser and the
//! evaluator. The main enum, [`Expr`], covers every value a program can
//! denote: nil, the two numeric kinds, symbols, lists, and the two callable
//! kinds (registry builtins and `lambda` closures). Ergonomic helper
//! functions such as `val`, `sym`, and `nil` are provided for convenient
//! tree construction in tests. Display is the canonical printer
//! used by `message` and by error reporting; printed data values read back
//! as the same expression kind, including the numeric kind of floats.

use std::rc::Rc;

use crate::builtinops::BuiltinOp;
use crate::evaluator::EnvRef;

/// A user-defined function: parameter names, one unevaluated body
/// expression, and the environment captured at the `lambda` site.
///
/// Closures are handled through `Rc` so that the same function object can
/// sit in several bindings; equality and the printed identity token both
/// follow the allocation, not the structure.
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Expr,
    pub env: EnvRef,
}

/// Core expression type in the interpreter
///
/// Note: integers and floats are distinct kinds and never equality-compare
/// across kinds; promotion happens inside numeric operations, not in
/// comparison of results.
///
/// To build an expression tree, use the ergonomic helper functions:
/// - `val(42)` for numbers, `sym("name")` for symbols, `nil()` for nil
/// - `val([1, 2, 3])` for homogeneous lists
/// - `val(vec![sym("op"), val(42)])` for mixed lists
#[derive(Clone)]
pub enum Expr {
    /// The absent value; also what `define`, `set!` and `while` return
    Nil,
    /// Integer numbers (64-bit, wrapping arithmetic)
    Integer(i64),
    /// Float numbers (IEEE 754 double)
    Float(f64),
    /// Symbols (identifiers)
    Symbol(String),
    /// Lists, both program forms and quoted data
    List(Vec<Expr>),
    /// Built-in operations from the registry
    Builtin(&'static BuiltinOp),
    /// User-defined functions created by `lambda`
    Lambda(Rc<Lambda>),
}

impl std::fmt::Debug for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Nil => write!(f, "Nil"),
            Expr::Integer(n) => write!(f, "Integer({n})"),
            Expr::Float(x) => write!(f, "Float({x:?})"),
            Expr::Symbol(s) => write!(f, "Symbol({s})"),
            Expr::List(list) => {
                write!(f, "List(")?;
                for (i, v) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v:?}")?;
                }
                write!(f, ")")
            }
            Expr::Builtin(op) => write!(f, "Builtin({})", op.name),
            // The captured environment can reach back to the binding that
            // holds this closure, so it is left out of the output.
            Expr::Lambda(l) => write!(f, "Lambda(params={:?}, body={:?})", l.params, l.body),
        }
    }
}

// From trait implementations for Expr - enables .into() conversion

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Expr {
            fn from(n: $int_type) -> Self {
                Expr::Integer(i64::from(n))
            }
        }
    };
}

// Generate From implementations for all integer types that fit in i64
impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(i64);
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl From<f64> for Expr {
    fn from(x: f64) -> Self {
        Expr::Float(x)
    }
}

impl From<f32> for Expr {
    fn from(x: f32) -> Self {
        Expr::Float(f64::from(x))
    }
}

impl<T: Into<Expr>> From<Vec<T>> for Expr {
    fn from(v: Vec<T>) -> Self {
        Expr::List(v.into_iter().map(|x| x.into()).collect())
    }
}

impl<T: Into<Expr>, const N: usize> From<[T; N]> for Expr {
    fn from(arr: [T; N]) -> Self {
        Expr::List(arr.into_iter().map(|x| x.into()).collect())
    }
}

impl<T: Into<Expr> + Clone> From<&[T]> for Expr {
    fn from(slice: &[T]) -> Self {
        Expr::List(slice.iter().cloned().map(|x| x.into()).collect())
    }
}

/// Helper function for creating symbols - works great in mixed lists!
/// Accepts both &str and String via AsRef<str>
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn sym<S: AsRef<str>>(name: S) -> Expr {
    Expr::Symbol(name.as_ref().to_owned())
}

/// Helper function for creating expressions - works great in mixed lists!
/// Accepts any type that can be converted to Expr
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn val<T: Into<Expr>>(value: T) -> Expr {
    value.into()
}

/// Helper function for creating the nil value
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn nil() -> Expr {
    Expr::Nil
}

/// Render a float as plain decimal digits with the decimal point kept,
/// so the printed text re-reads as the same float. Debug formatting is
/// the shortest round-trip spelling for mid-range magnitudes but switches
/// to exponent notation outside them, and the token grammar has no
/// exponent syntax.
fn write_float(f: &mut std::fmt::Formatter<'_>, x: f64) -> std::fmt::Result {
    let shortest = format!("{x:?}");
    if !shortest.contains(['e', 'E']) {
        return f.write_str(&shortest);
    }
    // Expand the exponent away: the smallest fixed precision whose output
    // parses back to the same value keeps the spelling minimal. Precision
    // 1074 is the full fractional expansion of the smallest subnormal.
    for precision in 1..=1074 {
        let fixed = format!("{x:.precision$}");
        if fixed.parse::<f64>().is_ok_and(|parsed| parsed == x) {
            return f.write_str(&fixed);
        }
    }
    // Every finite float expands at some precision above
    f.write_str(&shortest)
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Nil => write!(f, "nil"),
            Expr::Integer(n) => write!(f, "{n}"),
            Expr::Float(x) => write_float(f, *x),
            Expr::Symbol(s) => write!(f, "{s}"),
            Expr::List(elements) => {
                write!(f, "(")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, ")")
            }
            Expr::Builtin(op) => write!(f, "#<builtin {}>", op.name),
            Expr::Lambda(l) => write!(f, "#<lambda {:p}>", Rc::as_ptr(l)),
        }
    }
}

impl Expr {
    /// Check whether this is the nil value
    pub(crate) fn is_nil(&self) -> bool {
        matches!(self, Expr::Nil)
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Nil, Expr::Nil) => true,
            (Expr::Integer(a), Expr::Integer(b)) => a == b,
            (Expr::Float(a), Expr::Float(b)) => a == b,
            (Expr::Symbol(a), Expr::Symbol(b)) => a == b,
            (Expr::List(a), Expr::List(b)) => a == b,
            // Compare builtins by registry name, not function pointer
            (Expr::Builtin(a), Expr::Builtin(b)) => a.name == b.name,
            // Compare closures by allocation identity, not structure
            (Expr::Lambda(a), Expr::Lambda(b)) => Rc::ptr_eq(a, b),
            _ => false, // Different variants are never equal
        }
    }
}

#[cfg(test)]
mod helper_function_tests {
    use super::*;
    use crate::evaluator::Environment;
    use std::cell::RefCell;

    #[test]
    fn test_helper_functions_data_driven() {
        // Test cases as (Expr, Expr) tuples: (helper_result, expected_value)
        let test_cases = vec![
            // Basic numbers
            (val(42), Expr::Integer(42)),
            (val(-17), Expr::Integer(-17)),
            (val(-0), Expr::Integer(0)),
            // Different integer types from macro
            (val(4294967295u32), Expr::Integer(4294967295)),
            (val(2147483647i32), Expr::Integer(2147483647)),
            (val(255u8), Expr::Integer(255)),
            (val(-128i8), Expr::Integer(-128)),
            (val(i64::MAX), Expr::Integer(i64::MAX)),
            (val(i64::MIN), Expr::Integer(i64::MIN)),
            // Floats keep their own kind
            (val(2.5), Expr::Float(2.5)),
            (val(-0.5f32), Expr::Float(-0.5)),
            (val(4.0), Expr::Float(4.0)),
            // Sym, from both &str and String
            (sym("counter"), Expr::Symbol("counter".to_owned())),
            (sym("-"), Expr::Symbol("-".to_owned())),
            (sym(String::from("set!")), Expr::Symbol("set!".to_owned())),
            // Nil
            (nil(), Expr::Nil),
            // Lists from arrays, slices and vecs of primitives
            (
                val([1, 2, 3]),
                Expr::List(vec![Expr::Integer(1), Expr::Integer(2), Expr::Integer(3)]),
            ),
            (
                val(&[10i64, 20][..]),
                Expr::List(vec![Expr::Integer(10), Expr::Integer(20)]),
            ),
            // Mixed type lists using helper functions
            (
                val(vec![sym("+"), val(1), val(2.5)]),
                Expr::List(vec![
                    Expr::Symbol("+".to_owned()),
                    Expr::Integer(1),
                    Expr::Float(2.5),
                ]),
            ),
        ];

        run_helper_function_tests(test_cases);
    }

    /// Helper function to run data-driven tests for helper functions
    fn run_helper_function_tests(test_cases: Vec<(Expr, Expr)>) {
        for (i, (actual, expected)) in test_cases.iter().enumerate() {
            assert!(
                actual == expected,
                "Test case {} failed:\n  Expected: {:?}\n  Got: {:?}",
                i + 1,
                expected,
                actual
            );
        }
    }

    #[test]
    fn test_display_formatting() {
        let test_cases = vec![
            (Expr::Nil, "nil"),
            (val(42), "42"),
            (val(-7), "-7"),
            (val(4.0), "4.0"),
            (val(-0.5), "-0.5"),
            (val(1.25), "1.25"),
            // Magnitudes where f64 Debug would switch to exponent
            // notation still print as plain decimal digits
            (val(1e16), "10000000000000000.0"),
            (val(-1e16), "-10000000000000000.0"),
            (val(1e-5), "0.00001"),
            (val(-2.5e-9), "-0.0000000025"),
            (sym("counter"), "counter"),
            (sym("+"), "+"),
            (val([1, 2, 3]), "(1 2 3)"),
            (Expr::List(vec![]), "()"),
            (
                val(vec![sym("+"), val(1), val(vec![sym("*"), val(2), val(3)])]),
                "(+ 1 (* 2 3))",
            ),
        ];

        for (i, (expr, expected)) in test_cases.iter().enumerate() {
            assert_eq!(
                expr.to_string(),
                *expected,
                "Display test case {} failed for {:?}",
                i + 1,
                expr
            );
        }
    }

    #[test]
    fn test_float_display_has_no_exponent() {
        // The token grammar has no exponent syntax, so every printed
        // float must be plain decimal digits with a decimal point and
        // read back as the same value
        let extremes = [
            1e16,
            -1e16,
            1.2345678901234567e20,
            1e100,
            f64::MAX,
            1e-5,
            -1e-5,
            2.5e-9,
            f64::MIN_POSITIVE,
            5e-324, // Smallest subnormal
        ];
        for x in extremes {
            let printed = val(x).to_string();
            assert!(
                !printed.contains(['e', 'E']),
                "exponent leaked into display of {x}: {printed}"
            );
            assert!(printed.contains('.'), "no decimal point for {x}: {printed}");
            assert_eq!(
                printed.parse::<f64>(),
                Ok(x),
                "printed text does not read back as {x}: {printed}"
            );
        }
    }

    #[test]
    fn test_numeric_kinds_never_compare_across() {
        assert_ne!(val(1), val(1.0));
        assert_ne!(val(0), Expr::Nil);
        assert_eq!(val(1.5), val(1.5));
        assert_eq!(val(10), val(10));
    }

    #[test]
    fn test_lambda_identity() {
        let env = Rc::new(RefCell::new(Environment::default()));
        let shared = Rc::new(Lambda {
            params: vec!["x".to_owned()],
            body: sym("x"),
            env: Rc::clone(&env),
        });
        let a = Expr::Lambda(Rc::clone(&shared));
        let b = Expr::Lambda(Rc::clone(&shared));
        assert_eq!(a, b, "the same closure equals itself through clones");

        let other = Expr::Lambda(Rc::new(Lambda {
            params: vec!["x".to_owned()],
            body: sym("x"),
            env,
        }));
        assert_ne!(a, other, "structurally identical closures stay distinct");

        let printed = a.to_string();
        assert!(printed.starts_with("#<lambda 0x"), "got {printed}");
        assert!(printed.ends_with('>'));
        assert_eq!(printed, b.to_string(), "identity token follows the allocation");
        assert_ne!(printed, other.to_string());
    }
}
