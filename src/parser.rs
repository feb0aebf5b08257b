//! Token-to-tree parsing
//!
//! A cursor-based recursive descent over the token list produced by
//! [`crate::lexer::tokenize`]. `(` opens a list that collects expressions
//! until the matching `)`. Atoms are classified by one rule: a token whose
//! first character is a digit, or a `-` followed directly by a digit, must
//! read as a number (a single decimal point makes it a float, anything else
//! non-digit is an error); every other atom is a symbol. Operator names
//! like `+` carry no special meaning at this stage.

use crate::ast::Expr;
use crate::lexer::tokenize;
use crate::{Error, ParseError, ParseErrorKind};

/// Parse one expression starting at `cursor`, advancing it past the
/// consumed tokens.
pub fn parse(tokens: &[&str], cursor: &mut usize) -> Result<Expr, Error> {
    let Some(&token) = tokens.get(*cursor) else {
        return Err(Error::ParseError(ParseError::from_message(
            ParseErrorKind::Incomplete,
            "Expected an expression, found end of input",
        )));
    };
    *cursor += 1;

    match token {
        "(" => {
            let mut elements = Vec::new();
            loop {
                match tokens.get(*cursor) {
                    Some(&")") => {
                        *cursor += 1;
                        return Ok(Expr::List(elements));
                    }
                    Some(_) => elements.push(parse(tokens, cursor)?),
                    None => {
                        return Err(Error::ParseError(ParseError::from_message(
                            ParseErrorKind::Incomplete,
                            "Unclosed list, expected ')' before end of input",
                        )));
                    }
                }
            }
        }
        ")" => Err(Error::ParseError(ParseError::with_found(
            ParseErrorKind::UnexpectedToken,
            "Unexpected ')' outside a list",
            token,
        ))),
        atom => parse_atom(atom),
    }
}

/// Parse a whole source file into its top-level forms.
///
/// An empty (or all-whitespace) source is a valid empty program.
pub fn parse_program(source: &str) -> Result<Vec<Expr>, Error> {
    let tokens = tokenize(source);
    let mut cursor = 0;
    let mut forms = Vec::new();
    while cursor < tokens.len() {
        forms.push(parse(&tokens, &mut cursor)?);
    }
    Ok(forms)
}

/// Numeric-classified tokens must parse as numbers; all other atoms are
/// symbols. `-` alone and `-abc` fall through to symbols, `-5` does not.
fn is_numeric_atom(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('-') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn parse_atom(token: &str) -> Result<Expr, Error> {
    if !is_numeric_atom(token) {
        return Ok(Expr::Symbol(token.to_owned()));
    }

    let digits = token.strip_prefix('-').unwrap_or(token);
    let mut seen_point = false;
    for c in digits.chars() {
        if c == '.' {
            if seen_point {
                return Err(Error::ParseError(ParseError::with_found(
                    ParseErrorKind::InvalidNumber,
                    "Second decimal point in numeric literal",
                    token,
                )));
            }
            seen_point = true;
        } else if !c.is_ascii_digit() {
            return Err(Error::ParseError(ParseError::with_found(
                ParseErrorKind::InvalidNumber,
                "Invalid character in numeric literal",
                token,
            )));
        }
    }

    if seen_point {
        match token.parse::<f64>() {
            Ok(x) => Ok(Expr::Float(x)),
            Err(_) => Err(Error::ParseError(ParseError::with_found(
                ParseErrorKind::InvalidNumber,
                "Malformed float literal",
                token,
            ))),
        }
    } else {
        match token.parse::<i64>() {
            Ok(n) => Ok(Expr::Integer(n)),
            Err(_) => Err(Error::ParseError(ParseError::with_found(
                ParseErrorKind::InvalidNumber,
                "Integer literal out of range",
                token,
            ))),
        }
    }
}
