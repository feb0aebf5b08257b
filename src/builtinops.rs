//! Built-in operations registry with dual glyph/word naming.
//!
//! Every operation is defined once and registered under two spellings, a
//! glyph and a word, interchangeable in source programs:
//!
//! ```text
//! +   add        -   subtract            *   multiply
//! /   divide     ==  equal
//! >   greater    <   less
//! >=  greater-or-equal                    <=  less-or-equal
//! &&  logical-and                         ||  logical-or
//! ```
//!
//! `message`, `car` and `cdr` have a single spelling.
//!
//! ## Numeric coercion
//!
//! Two-argument numeric operations share one rule: integer with integer
//! stays in the integer domain, any float operand promotes both operands
//! to floats. Comparisons and logical operations report their result as a
//! number in the coerced domain (`1`/`0` for integers, `1.0`/`0.0` for
//! floats); there is no separate boolean kind.
//!
//! ## Error handling
//!
//! - Non-numeric arguments to numeric operations are a type error
//! - Integer division by zero is an evaluation error; float division
//!   follows IEEE 754 and produces infinities instead
//! - Argument counts are validated against each operation's arity before
//!   the implementation runs
//!
//! ## Adding new operations
//!
//! 1. Implement the function following the signature
//!    `fn(args: &[Expr]) -> Result<Expr, Error>`; arguments arrive
//!    already evaluated
//! 2. Add it to `BUILTIN_OPS` with both spellings and an arity
//! 3. Add test cases covering results and error conditions

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::Error;
use crate::ast::Expr;

/// Expected number of arguments for a callable
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arity {
    /// Exactly this many arguments
    Exact(usize),
    /// This many arguments or more
    AtLeast(usize),
    /// Any number of arguments, including none
    Any,
}

impl Arity {
    /// Check an argument count, reporting a violation under `form`
    pub(crate) fn validate(self, form: &str, got: usize) -> Result<(), Error> {
        let ok = match self {
            Arity::Exact(n) => got == n,
            Arity::AtLeast(n) => got >= n,
            Arity::Any => true,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::arity(form, self, got))
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Any => write!(f, "any number of"),
        }
    }
}

/// Definition of a built-in operation
#[derive(Debug)]
pub struct BuiltinOp {
    /// Primary identifier, also used when printing the builtin
    pub name: &'static str,
    /// Alternate spelling registered alongside the primary one
    pub alias: &'static str,
    /// The implementation; arguments arrive already evaluated
    pub func: fn(&[Expr]) -> Result<Expr, Error>,
    /// Expected number of arguments
    pub arity: Arity,
}

impl BuiltinOp {
    /// Check if the given number of arguments is valid for this operation
    pub(crate) fn validate_arity(&self, arg_count: usize) -> Result<(), Error> {
        self.arity.validate(self.name, arg_count)
    }
}

/// Validate arity, then invoke a builtin on already-evaluated arguments
pub(crate) fn call_builtin(op: &BuiltinOp, args: &[Expr]) -> Result<Expr, Error> {
    op.validate_arity(args.len())?;
    (op.func)(args)
}

//
// Builtin Function Implementations
//

/// A two-argument numeric call after applying the coercion rule
enum NumericPair {
    Integers(i64, i64),
    Floats(f64, f64),
}

/// Integer-to-float promotion used by the coercion rule
#[expect(clippy::cast_precision_loss)] // magnitudes beyond 2^53 round to the nearest double
fn int_to_float(n: i64) -> f64 {
    n as f64
}

/// Apply the coercion rule to a two-argument call: integer with integer
/// stays `Integers`, any float operand promotes both to `Floats`. Anything
/// non-numeric is a type error naming the operation.
fn coerce_pair(name: &str, args: &[Expr]) -> Result<NumericPair, Error> {
    let [a, b] = args else {
        return Err(Error::arity(name, Arity::Exact(2), args.len()));
    };
    match (a, b) {
        (Expr::Integer(a), Expr::Integer(b)) => Ok(NumericPair::Integers(*a, *b)),
        (Expr::Float(a), Expr::Float(b)) => Ok(NumericPair::Floats(*a, *b)),
        (Expr::Integer(a), Expr::Float(b)) => Ok(NumericPair::Floats(int_to_float(*a), *b)),
        (Expr::Float(a), Expr::Integer(b)) => Ok(NumericPair::Floats(*a, int_to_float(*b))),
        (a, b) => {
            let offender = if matches!(a, Expr::Integer(_) | Expr::Float(_)) {
                b
            } else {
                a
            };
            Err(Error::TypeError(format!(
                "'{name}' requires numeric arguments, got {offender}"
            )))
        }
    }
}

// Macro to generate arithmetic functions sharing the coercion rule.
// Integer arithmetic wraps on overflow; float arithmetic follows IEEE 754.
macro_rules! arithmetic_builtin {
    ($name:ident, $id:expr, $int_method:ident, $op:tt) => {
        fn $name(args: &[Expr]) -> Result<Expr, Error> {
            match coerce_pair($id, args)? {
                NumericPair::Integers(a, b) => Ok(Expr::Integer(a.$int_method(b))),
                NumericPair::Floats(a, b) => Ok(Expr::Float(a $op b)),
            }
        }
    };
}

arithmetic_builtin!(builtin_add, "+", wrapping_add, +);
arithmetic_builtin!(builtin_sub, "-", wrapping_sub, -);
arithmetic_builtin!(builtin_mul, "*", wrapping_mul, *);

// Division is written out by hand: integer division by zero is an error
// (and i64::MIN / -1 wraps), while float division yields infinities or NaN.
fn builtin_div(args: &[Expr]) -> Result<Expr, Error> {
    match coerce_pair("/", args)? {
        NumericPair::Integers(_, 0) => Err(Error::EvalError("Division by zero".into())),
        NumericPair::Integers(a, b) => Ok(Expr::Integer(a.wrapping_div(b))),
        NumericPair::Floats(a, b) => Ok(Expr::Float(a / b)),
    }
}

// Macro to generate numeric comparison functions. A comparison reports its
// result in the coerced domain: integer comparisons yield 1 or 0, float
// comparisons yield 1.0 or 0.0.
macro_rules! numeric_comparison {
    ($name:ident, $id:expr, $op:tt) => {
        fn $name(args: &[Expr]) -> Result<Expr, Error> {
            match coerce_pair($id, args)? {
                NumericPair::Integers(a, b) => Ok(Expr::Integer(i64::from(a $op b))),
                NumericPair::Floats(a, b) => {
                    Ok(Expr::Float(if a $op b { 1.0 } else { 0.0 }))
                }
            }
        }
    };
}

// Generate all comparison functions
numeric_comparison!(builtin_eq, "==", ==);
numeric_comparison!(builtin_gt, ">", >);
numeric_comparison!(builtin_lt, "<", <);
numeric_comparison!(builtin_ge, ">=", >=);
numeric_comparison!(builtin_le, "<=", <=);

// Macro to generate logical connectives. Both operands are already
// evaluated by the caller, so there is no short-circuiting; each coerced
// operand is tested against zero and the result lands in the same domain
// as the comparisons.
macro_rules! logical_builtin {
    ($name:ident, $id:expr, $op:tt) => {
        fn $name(args: &[Expr]) -> Result<Expr, Error> {
            match coerce_pair($id, args)? {
                NumericPair::Integers(a, b) => {
                    Ok(Expr::Integer(i64::from((a != 0) $op (b != 0))))
                }
                NumericPair::Floats(a, b) => {
                    Ok(Expr::Float(if (a != 0.0) $op (b != 0.0) { 1.0 } else { 0.0 }))
                }
            }
        }
    };
}

logical_builtin!(builtin_and, "&&", &&);
logical_builtin!(builtin_or, "||", ||);

/// Print each argument on its own line using the canonical printer
fn builtin_message(args: &[Expr]) -> Result<Expr, Error> {
    for arg in args {
        println!("{arg}");
    }
    Ok(Expr::Nil)
}

// car and cdr operate on the evaluated argument list itself: car returns
// the first argument unchanged, cdr returns a fresh list of the remaining
// ones. Neither inspects the kinds of its arguments.
fn builtin_car(args: &[Expr]) -> Result<Expr, Error> {
    match args.first() {
        Some(first) => Ok(first.clone()),
        None => Err(Error::EvalError("car of empty argument list".into())),
    }
}

fn builtin_cdr(args: &[Expr]) -> Result<Expr, Error> {
    let [_, rest @ ..] = args else {
        return Err(Error::EvalError("cdr of empty argument list".into()));
    };
    Ok(Expr::List(rest.to_vec()))
}

/// Global registry of all built-in operations.
///
/// Kept as a single contiguous collection of `BuiltinOp` values for ease
/// of auditing, initialized once via a `LazyLock`. The root environment
/// binds every entry under both of its spellings.
static BUILTIN_OPS: LazyLock<Vec<BuiltinOp>> = LazyLock::new(|| {
    vec![
        // Arithmetic operations
        BuiltinOp {
            name: "+",
            alias: "add",
            func: builtin_add,
            arity: Arity::Exact(2),
        },
        BuiltinOp {
            name: "-",
            alias: "subtract",
            func: builtin_sub,
            arity: Arity::Exact(2),
        },
        BuiltinOp {
            name: "*",
            alias: "multiply",
            func: builtin_mul,
            arity: Arity::Exact(2),
        },
        BuiltinOp {
            name: "/",
            alias: "divide",
            func: builtin_div,
            arity: Arity::Exact(2),
        },
        // Comparison operations
        BuiltinOp {
            name: "==",
            alias: "equal",
            func: builtin_eq,
            arity: Arity::Exact(2),
        },
        BuiltinOp {
            name: ">",
            alias: "greater",
            func: builtin_gt,
            arity: Arity::Exact(2),
        },
        BuiltinOp {
            name: "<",
            alias: "less",
            func: builtin_lt,
            arity: Arity::Exact(2),
        },
        BuiltinOp {
            name: ">=",
            alias: "greater-or-equal",
            func: builtin_ge,
            arity: Arity::Exact(2),
        },
        BuiltinOp {
            name: "<=",
            alias: "less-or-equal",
            func: builtin_le,
            arity: Arity::Exact(2),
        },
        // Logical connectives
        BuiltinOp {
            name: "&&",
            alias: "logical-and",
            func: builtin_and,
            arity: Arity::Exact(2),
        },
        BuiltinOp {
            name: "||",
            alias: "logical-or",
            func: builtin_or,
            arity: Arity::Exact(2),
        },
        // Output
        BuiltinOp {
            name: "message",
            alias: "message",
            func: builtin_message,
            arity: Arity::Any,
        },
        // Argument-list selectors
        BuiltinOp {
            name: "car",
            alias: "car",
            func: builtin_car,
            arity: Arity::AtLeast(1),
        },
        BuiltinOp {
            name: "cdr",
            alias: "cdr",
            func: builtin_cdr,
            arity: Arity::AtLeast(1),
        },
    ]
});

/// Lazy static map from either spelling to its operation
static BUILTIN_INDEX: LazyLock<HashMap<&'static str, &'static BuiltinOp>> = LazyLock::new(|| {
    let ops: &'static [BuiltinOp] = BUILTIN_OPS.as_slice();
    let mut index = HashMap::new();
    for op in ops {
        index.insert(op.name, op);
        index.insert(op.alias, op);
    }
    index
});

/// Get all builtin operations (used to seed the root environment)
pub(crate) fn all_builtins() -> &'static [BuiltinOp] {
    BUILTIN_OPS.as_slice()
}

/// Find a builtin operation by either of its spellings
pub fn find_builtin(id: &str) -> Option<&'static BuiltinOp> {
    BUILTIN_INDEX.get(id).copied()
}
