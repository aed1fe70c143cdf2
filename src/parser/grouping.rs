//! `by` / `without` grouping clauses.
//!
//! Aggregation functions accept a grouping clause that either keeps only
//! the listed labels (`by`) or drops them (`without`). The clause may be
//! written before or after the argument list; both parse to the same tree
//! and serialize after the closing parenthesis:
//!
//! ```text
//! sum by (job) (metric)      ->  sum(metric) by (job)
//! sum(metric) without (pod)  ->  sum(metric) without (pod)
//! ```

use std::fmt;

use nom::{
    IResult, Parser,
    branch::alt,
    character::complete::char,
    combinator::{cut, map, opt},
    multi::separated_list0,
    sequence::{delimited, preceded, terminated},
};

use crate::lexer::{
    identifier::{keyword, label_name},
    whitespace::ws_opt,
};

/// Whether the listed labels are kept or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingAction {
    By,
    Without,
}

impl GroupingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupingAction::By => "by",
            GroupingAction::Without => "without",
        }
    }
}

impl fmt::Display for GroupingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A grouping clause: `by (job, instance)` or `without (pod)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping {
    pub action: GroupingAction,
    pub labels: Vec<String>,
}

impl Grouping {
    pub fn by(labels: Vec<String>) -> Self {
        Self {
            action: GroupingAction::By,
            labels,
        }
    }

    pub fn without(labels: Vec<String>) -> Self {
        Self {
            action: GroupingAction::Without,
            labels,
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.action)?;
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", label)?;
        }
        write!(f, ")")
    }
}

/// Parse a grouping clause. An empty label list `by ()` is allowed.
pub fn grouping(input: &str) -> IResult<&str, Grouping> {
    let (input, action) = alt((
        map(keyword("by"), |_| GroupingAction::By),
        map(keyword("without"), |_| GroupingAction::Without),
    ))
    .parse(input)?;
    let (input, _) = ws_opt(input)?;
    let (input, labels) = preceded(
        char('('),
        cut(terminated(
            |i| {
                let (i, _) = ws_opt(i)?;
                let (i, labels) =
                    separated_list0(delimited(ws_opt, char(','), ws_opt), label_name).parse(i)?;
                let (i, _) = opt((ws_opt, char(','))).parse(i)?;
                Ok((i, labels))
            },
            (ws_opt, char(')')),
        )),
    )
    .parse(input)?;

    Ok((
        input,
        Grouping {
            action,
            labels: labels.into_iter().map(String::from).collect(),
        },
    ))
}
