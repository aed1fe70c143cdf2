//! PromQL expression parser.
//!
//! [`parse`] is the main entry point: it consumes a complete query string
//! and returns the [`Expr`](crate::ast::Expr) tree or an [`Error`] carrying
//! the byte offset of the failure.
//!
//! # Submodules
//!
//! - [`mod@expr`] - expression grammar and operator precedence
//! - [`grouping`] - `by` / `without` clauses
//! - [`selector`] - metric selectors, matchers, range and offset

pub mod expr;
pub mod grouping;
pub mod selector;

use crate::ast::Expr;
use crate::error::Error;
use crate::lexer::{string::string_literal, whitespace::ws_opt};

/// Parse a complete PromQL expression.
///
/// Trailing whitespace and comments are fine; any other unconsumed input
/// is an error.
///
/// # Examples
///
/// ```
/// use promql_builder::parse;
///
/// let tree = parse(r#"rate(http_requests_total{job="api"}[5m])"#).unwrap();
/// assert_eq!(tree.to_string(), r#"rate(http_requests_total{job="api"}[5m])"#);
///
/// assert!(parse("sum(up").is_err());
/// ```
pub fn parse(input: &str) -> Result<Expr, Error> {
    let (rest, tree) = expr::expr(input).map_err(|err| match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => syntax_error(input, e.input, "expression"),
        nom::Err::Incomplete(_) => syntax_error(input, "", "expression"),
    })?;

    // ws_opt cannot fail; default to "no progress" if it ever does
    let rest = ws_opt(rest).map(|(r, _)| r).unwrap_or(rest);
    if !rest.is_empty() {
        return Err(syntax_error(input, rest, "end of input"));
    }
    Ok(tree)
}

/// Build an [`Error`] for a failure at `at`, a suffix of `input`.
///
/// Character-level problems (unterminated strings, characters outside the
/// language) report as [`Error::Lex`]; everything else is a structural
/// [`Error::Parse`].
fn syntax_error(input: &str, at: &str, expected: &str) -> Error {
    let position = input.len() - at.len();
    match at.chars().next() {
        None => Error::Parse {
            position,
            expected: expected.to_string(),
            found: "end of input".to_string(),
        },
        Some('"' | '\'') if string_literal(at).is_err() => Error::Lex {
            position,
            reason: "unterminated string literal".to_string(),
        },
        Some(c) if !is_token_char(c) => Error::Lex {
            position,
            reason: format!("unexpected character {c:?}"),
        },
        Some(_) => Error::Parse {
            position,
            expected: expected.to_string(),
            found: found_snippet(at),
        },
    }
}

/// Characters that can begin or continue some token of the language.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '_' | ':'
                | '{' | '}' | '(' | ')' | '[' | ']'
                | '"' | '\'' | ','
                | '+' | '-' | '*' | '/' | '%' | '^'
                | '=' | '!' | '<' | '>' | '~'
                | '.' | '#'
        )
        || c.is_whitespace()
}

fn found_snippet(at: &str) -> String {
    at.chars().take_while(|c| !c.is_whitespace()).take(16).collect()
}
