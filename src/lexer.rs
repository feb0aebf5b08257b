//! Source-to-token scanning
//!
//! Tokenization is total. Whitespace separates tokens, each parenthesis is
//! its own token, and every maximal run of any other characters is one atom
//! token. Atoms are classified later, in the parser, so this stage never
//! fails; unreadable text surfaces as a parse error carrying the offending
//! token rather than as a scanner error.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::multispace0,
    sequence::preceded,
};

/// Characters that may appear inside an atom token
fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')'
}

/// Scan one token, skipping leading whitespace
fn token(input: &str) -> IResult<&str, &str> {
    preceded(
        multispace0,
        alt((tag("("), tag(")"), take_while1(is_atom_char))),
    )
    .parse(input)
}

/// Split source text into parenthesis and atom tokens.
///
/// Returns borrowed slices of the input. The loop stops when only
/// whitespace (or nothing) remains, so every input produces a token list.
pub fn tokenize(source: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = source;
    while let Ok((remaining, tok)) = token(rest) {
        tokens.push(tok);
        rest = remaining;
    }
    tokens
}
