//! Metric selector parsing.
//!
//! A selector names a set of time series:
//!
//! ```text
//! metric_name
//! metric_name{label_matchers}
//! {label_matchers}
//! ```
//!
//! optionally suffixed by a range window `[5m]` and an `offset 1h`
//! modifier, in that order. Matcher operators:
//! - `=`  : equality
//! - `!=` : inequality
//! - `=~` : regex match
//! - `!~` : regex not match

use std::fmt;
use std::str::FromStr;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{cut, map, opt},
    multi::separated_list0,
    sequence::{delimited, preceded, terminated},
};

use crate::error::Error;
use crate::lexer::{
    duration::{Duration, duration},
    identifier::{keyword, label_name, metric_name},
    string::{escape, string_literal},
    whitespace::{ws_opt, ws_req},
};

/// Label matching operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOp {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `=~`
    RegexMatch,
    /// `!~`
    RegexNotMatch,
}

impl MatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOp::Equal => "=",
            MatchOp::NotEqual => "!=",
            MatchOp::RegexMatch => "=~",
            MatchOp::RegexNotMatch => "!~",
        }
    }
}

impl FromStr for MatchOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "=" => Ok(MatchOp::Equal),
            "!=" => Ok(MatchOp::NotEqual),
            "=~" => Ok(MatchOp::RegexMatch),
            "!~" => Ok(MatchOp::RegexNotMatch),
            other => Err(Error::InvalidOperator(other.to_string())),
        }
    }
}

impl fmt::Display for MatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single `name <op> "value"` constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatcher {
    pub name: String,
    pub op: MatchOp,
    pub value: String,
}

impl LabelMatcher {
    pub fn new(name: impl Into<String>, op: MatchOp, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op,
            value: value.into(),
        }
    }
}

impl fmt::Display for LabelMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}\"{}\"", self.name, self.op, escape(&self.value))
    }
}

/// A metric selector with optional range window and offset.
///
/// Matcher names are unique within a selector: inserting a matcher whose
/// name already exists replaces the value in place, keeping its position.
/// A selector with no name and no matchers is the empty builder state and
/// renders as the empty string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VectorSelector {
    pub name: Option<String>,
    pub matchers: Vec<LabelMatcher>,
    pub range: Option<Duration>,
    pub offset: Option<Duration>,
}

impl VectorSelector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Empty selector: no name, no matchers.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.matchers.is_empty()
            && self.range.is_none()
            && self.offset.is_none()
    }

    /// Insert or replace the matcher with this name, preserving position on
    /// replacement.
    pub fn set_matcher(&mut self, matcher: LabelMatcher) {
        match self.matchers.iter_mut().find(|m| m.name == matcher.name) {
            Some(existing) => *existing = matcher,
            None => self.matchers.push(matcher),
        }
    }

    /// Remove the first matcher with this name. Returns whether one existed.
    pub fn remove_matcher(&mut self, name: &str) -> bool {
        match self.matchers.iter().position(|m| m.name == name) {
            Some(idx) => {
                self.matchers.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn matcher(&self, name: &str) -> Option<&LabelMatcher> {
        self.matchers.iter().find(|m| m.name == name)
    }
}

impl fmt::Display for VectorSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref name) = self.name {
            write!(f, "{}", name)?;
        }
        if !self.matchers.is_empty() {
            write!(f, "{{")?;
            for (i, m) in self.matchers.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", m)?;
            }
            write!(f, "}}")?;
        }
        if let Some(ref range) = self.range {
            write!(f, "[{}]", range)?;
        }
        if let Some(ref offset) = self.offset {
            write!(f, " offset {}", offset)?;
        }
        Ok(())
    }
}

fn match_op(input: &str) -> IResult<&str, MatchOp> {
    alt((
        map(tag("!="), |_| MatchOp::NotEqual),
        map(tag("!~"), |_| MatchOp::RegexNotMatch),
        map(tag("=~"), |_| MatchOp::RegexMatch),
        map(tag("="), |_| MatchOp::Equal),
    ))
    .parse(input)
}

fn label_matcher(input: &str) -> IResult<&str, LabelMatcher> {
    let (input, _) = ws_opt(input)?;
    let (input, name) = label_name(input)?;
    let (input, _) = ws_opt(input)?;
    let (input, op) = match_op(input)?;
    let (input, _) = ws_opt(input)?;
    // A matcher value is always a string; commit so an unterminated
    // literal reports at the quote rather than as selector backtracking
    let (input, value) = cut(string_literal).parse(input)?;
    Ok((input, LabelMatcher::new(name, op, value)))
}

/// Parse a matcher list in braces: `{job="api", status!="500"}`.
/// A trailing comma is allowed. The opening brace commits.
pub fn label_matchers(input: &str) -> IResult<&str, Vec<LabelMatcher>> {
    preceded(
        char('{'),
        cut(terminated(
            |i| {
                let (i, matchers) =
                    separated_list0(delimited(ws_opt, char(','), ws_opt), label_matcher).parse(i)?;
                let (i, _) = opt((ws_opt, char(','))).parse(i)?;
                Ok((i, matchers))
            },
            (ws_opt, char('}')),
        )),
    )
    .parse(input)
}

/// Parse a range window suffix: `[5m]`. The opening bracket commits.
pub fn range_suffix(input: &str) -> IResult<&str, Duration> {
    preceded(
        char('['),
        cut(delimited(ws_opt, duration, (ws_opt, char(']')))),
    )
    .parse(input)
}

/// Parse an offset modifier: `offset 5m`.
pub fn offset_modifier(input: &str) -> IResult<&str, Duration> {
    let (rest, _) = keyword("offset")(input)?;
    let (rest, _) = ws_req(rest)?;
    cut(duration).parse(rest)
}

/// Parse a full selector: name and/or matcher list, then optional `[range]`
/// and `offset`. The range must come before the offset.
pub fn vector_selector(input: &str) -> IResult<&str, VectorSelector> {
    let (rest, name) = opt(metric_name).parse(input)?;
    let (rest, matchers) = if name.is_some() {
        opt(label_matchers).parse(rest)?
    } else {
        // Without a metric name the braces are mandatory
        map(label_matchers, Some).parse(rest)?
    };

    let (rest, mut selector) = (
        rest,
        VectorSelector {
            name: name.map(String::from),
            matchers: matchers.unwrap_or_default(),
            range: None,
            offset: None,
        },
    );

    let (rest, range) = opt((ws_opt, range_suffix).map(|(_, r)| r)).parse(rest)?;
    selector.range = range;
    let (rest, offset) = opt((ws_opt, offset_modifier).map(|(_, o)| o)).parse(rest)?;
    selector.offset = offset;

    Ok((rest, selector))
}
