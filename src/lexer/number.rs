//! Numeric literal parser.
//!
//! Recognizes integers (`42`), floats (`3.14`, `.5`, `5.`), scientific
//! notation (`1e10`, `2.5E-3`) and the special values `Inf`/`NaN`
//! (case-insensitive). Signs are not consumed here; `-3` parses as a unary
//! minus applied to `3`.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit0, digit1, one_of},
    combinator::{map_res, opt, recognize, value},
    sequence::{pair, preceded},
};

/// Parse an unsigned numeric literal as `f64`.
pub fn number(input: &str) -> IResult<&str, f64> {
    alt((special_float, decimal)).parse(input)
}

fn is_name_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// `Inf` and `NaN`, rejected when they run into an identifier (`Infoo`).
fn special_float(input: &str) -> IResult<&str, f64> {
    let (rest, val) = alt((
        value(f64::INFINITY, tag_no_case("Inf")),
        value(f64::NAN, tag_no_case("NaN")),
    ))
    .parse(input)?;

    if rest.chars().next().is_some_and(is_name_char) {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }
    Ok((rest, val))
}

fn decimal(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(pair(mantissa, opt(exponent))),
        |text: &str| text.parse::<f64>(),
    )
    .parse(input)
}

/// `123`, `3.14`, `5.`, `.5`
fn mantissa(input: &str) -> IResult<&str, &str> {
    alt((
        recognize((digit1, char('.'), digit0)),
        recognize(preceded(char('.'), digit1)),
        digit1,
    ))
    .parse(input)
}

fn exponent(input: &str) -> IResult<&str, &str> {
    recognize((one_of("eE"), opt(one_of("+-")), digit1)).parse(input)
}
