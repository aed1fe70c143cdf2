//! Identifier parsing.
//!
//! Two identifier shapes exist in PromQL:
//! - label names: `[a-zA-Z_][a-zA-Z0-9_]*`
//! - metric names: same, but colons are also allowed (recording rules such
//!   as `job:request_rate:5m`)
//!
//! Keywords (`by`, `without`, `offset`, `and`, ...) are context-sensitive
//! and stay valid as metric or label names outside their keyword position,
//! so nothing here rejects them.

use nom::{
    IResult, Parser,
    bytes::complete::{tag_no_case, take_while, take_while1},
    combinator::recognize,
    sequence::pair,
};

#[inline]
fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

#[inline]
fn is_name_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

#[inline]
fn is_metric_start(c: char) -> bool {
    c == ':' || is_name_start(c)
}

#[inline]
fn is_metric_char(c: char) -> bool {
    c == ':' || is_name_char(c)
}

/// Parse a label name: `[a-zA-Z_][a-zA-Z0-9_]*`.
pub fn label_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_name_start), take_while(is_name_char))).parse(input)
}

/// Parse a metric name, colons allowed: `[a-zA-Z_:][a-zA-Z0-9_:]*`.
pub fn metric_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_metric_start), take_while(is_metric_char))).parse(input)
}

/// Match `word` case-insensitively as a complete word.
///
/// Fails when the match is followed by an identifier character, so `or`
/// does not fire inside `orange`.
pub fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        let (rest, matched) = tag_no_case(word)(input)?;
        if rest.chars().next().is_some_and(is_name_char) {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Tag,
            )));
        }
        Ok((rest, matched))
    }
}

/// Check whether a string is a syntactically valid label name.
pub fn is_valid_label_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(is_name_start) && chars.all(is_name_char)
}

/// Check whether a string is a syntactically valid metric name.
pub fn is_valid_metric_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(is_metric_start) && chars.all(is_metric_char)
}
