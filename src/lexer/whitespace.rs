//! Whitespace and comment handling.
//!
//! PromQL allows spaces, tabs and newlines between any two tokens, and `#`
//! line comments that run to the end of the line.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, not_line_ending},
    combinator::value,
    multi::many0,
    sequence::preceded,
};

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Parse a `#` line comment, returning its content without the `#`.
pub fn line_comment(input: &str) -> IResult<&str, &str> {
    preceded(char('#'), not_line_ending).parse(input)
}

fn ws_element(input: &str) -> IResult<&str, ()> {
    alt((
        value((), take_while1(is_whitespace)),
        value((), line_comment),
    ))
    .parse(input)
}

/// Consume any run of whitespace and comments, possibly empty.
pub fn ws_opt(input: &str) -> IResult<&str, ()> {
    value((), many0(ws_element)).parse(input)
}

/// Consume whitespace/comments, requiring at least one element.
///
/// Used where the grammar demands separation, e.g. between `offset` and its
/// duration.
pub fn ws_req(input: &str) -> IResult<&str, ()> {
    let (input, _) = ws_element(input)?;
    ws_opt(input)
}
