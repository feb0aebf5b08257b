//! minilisp - A minimal S-expression language interpreter
//!
//! This crate implements a small Lisp dialect: a program is a sequence of
//! S-expressions read from one source file, parsed into an expression tree
//! and evaluated against a lexically-scoped environment chain. The language
//! has two numeric kinds (integer and float), symbols, lists, and closures;
//! its only observable output is what the `message` builtin prints.
//!
//! ## Language overview
//!
//! ```lisp
//! (define square (lambda (n) (* n n)))
//! (message (square 7))
//!
//! (define i 0)
//! (while (< i 3)
//!   (progn (message i)
//!          (set! i (+ i 1))))
//! ```
//!
//! The first two forms print `49`; the loop prints `0`, `1`, `2`. There is
//! no comment syntax and no string type; `message` printing numbers is the
//! whole I/O surface.
//!
//! Special forms: `quote`, `define`, `set!`, `progn`, `if`, `while`,
//! `lambda`. Numeric builtins are registered under both a glyph and a word
//! spelling (`+`/`add`, `<`/`less`, ...) and follow one coercion rule:
//! integer with integer stays integer, any float operand promotes the
//! computation to the float domain. `if` and `while` treat a nonzero number
//! as true; every other condition kind is a type error.
//!
//! ## Strictness
//!
//! All failures are fatal. There is no exception recovery and no partial
//! result: a parse or evaluation error terminates the run with a message on
//! stderr and a non-zero exit code. A few rules are stricter than a typical
//! Lisp:
//! - `define` rejects a name that already resolves to a non-nil value
//!   anywhere in the enclosing scope chain
//! - calling an unbound symbol is an error (`UnknownSymbol`), while merely
//!   *reading* an unbound symbol yields `nil`
//! - the head of a call must be a symbol; `((lambda (x) x) 5)` is rejected
//!
//! ## Modules
//!
//! - `lexer`: source text to token strings
//! - `parser`: tokens to expression trees
//! - `ast`: the expression model and the canonical printer
//! - `evaluator`: environments, special forms, and application
//! - `builtinops`: the numeric/printing builtin registry

use std::fmt;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Clone)]
pub enum ParseErrorKind {
    /// The token sequence ended before the expression was complete
    /// (an unclosed list, or no tokens where an expression was required)
    Incomplete,
    /// A token that cannot start an expression, i.e. a stray `)`
    UnexpectedToken,
    /// A numeric-classified token that is not a well-formed number
    /// (second decimal point, stray character, or out-of-range integer)
    InvalidNumber,
}

/// A structured error describing a parsing failure.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// The problematic token, if one was identified
    pub found: Option<String>,
}

impl ParseError {
    /// Create a ParseError with a kind and message but no offending token
    pub fn from_message(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            message: message.into(),
            found: None,
        }
    }

    /// Create a ParseError carrying the token that triggered it
    pub fn with_found(kind: ParseErrorKind, message: impl Into<String>, found: &str) -> Self {
        ParseError {
            kind,
            message: message.into(),
            found: Some(found.to_owned()),
        }
    }
}

/// Error types for the interpreter
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    ParseError(ParseError),
    EvalError(String),
    TypeError(String),
    UnknownSymbol(String),
    DuplicateDefinition(String),
    ArityError {
        form: String,
        expected: crate::builtinops::Arity,
        got: usize,
    },
}

impl Error {
    /// Create an ArityError for a named form or callable
    pub(crate) fn arity(
        form: impl Into<String>,
        expected: crate::builtinops::Arity,
        got: usize,
    ) -> Self {
        Error::ArityError {
            form: form.into(),
            expected,
            got,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParseError(e) => {
                write!(f, "ParseError: {}", e.message)?;
                if let Some(found) = &e.found {
                    write!(f, "\nFound: {found}")?;
                }
                Ok(())
            }
            Error::EvalError(msg) => write!(f, "EvaluationError: {msg}"),
            Error::TypeError(msg) => write!(f, "Type error: {msg}"),
            Error::UnknownSymbol(name) => write!(f, "Unknown symbol: {name}"),
            Error::DuplicateDefinition(name) => write!(f, "Duplicate definition: {name}"),
            Error::ArityError {
                form,
                expected,
                got,
            } => write!(
                f,
                "ArityError: '{form}' expects {expected} arguments, got {got}"
            ),
        }
    }
}

pub mod ast;
pub mod builtinops;
pub mod evaluator;
pub mod lexer;
pub mod parser;
