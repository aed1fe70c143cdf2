//! String literal parser.
//!
//! Label-matcher values and string arguments may be written with double or
//! single quotes. Both forms support backslash escapes for the quote
//! characters, backslash itself, and `\n`, `\t`, `\r`. Newlines must be
//! escaped; a raw newline inside a literal is an error.

use nom::{
    IResult, Parser,
    branch::alt,
    character::complete::{anychar, char},
    combinator::{map, verify},
    multi::many0,
    sequence::{delimited, preceded},
};

/// Parse a string literal, returning the unescaped value.
///
/// Failures report at the opening quote, wherever the literal went wrong.
pub fn string_literal(input: &str) -> IResult<&str, String> {
    alt((quoted_string('"'), quoted_string('\'')))
        .parse(input)
        .map_err(|_| {
            nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char))
        })
}

fn quoted_string<'a>(quote: char) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    move |input: &'a str| {
        delimited(
            char(quote),
            map(many0(string_char(quote)), |chars| {
                chars.into_iter().collect()
            }),
            char(quote),
        )
        .parse(input)
    }
}

fn string_char<'a>(quote: char) -> impl FnMut(&'a str) -> IResult<&'a str, char> {
    move |input: &'a str| {
        alt((
            preceded(char('\\'), escape_char),
            verify(anychar, move |&c| c != quote && c != '\\' && c != '\n'),
        ))
        .parse(input)
    }
}

/// Escape a value for rendering inside a double-quoted literal.
///
/// The inverse of [`string_literal`]'s escape handling: only the
/// backslash, the double quote and `\n`, `\t`, `\r` need escaping, and
/// escaping anything more would produce text the parser rejects. All
/// other characters, including non-ASCII, pass through unchanged.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_char(input: &str) -> IResult<&str, char> {
    let (rest, c) = anychar(input)?;
    let unescaped = match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '\\' => '\\',
        '"' => '"',
        '\'' => '\'',
        _ => {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Char,
            )));
        }
    };
    Ok((rest, unescaped))
}
