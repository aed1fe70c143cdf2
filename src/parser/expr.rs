//! Expression grammar.
//!
//! Binary operators are handled with precedence climbing; everything else
//! is a straightforward recursive descent. Simplified grammar:
//!
//! ```text
//! expr         = binary_expr
//! binary_expr  = unary_expr (binary_op unary_expr)*
//! unary_expr   = ("-" | "+")? unary_expr | primary_expr
//! primary_expr = "(" expr ")" | number | string | call | selector
//! call         = name grouping? "(" args ")" grouping?
//! ```
//!
//! Parentheses only steer precedence while parsing; the tree keeps the
//! resulting shape, not the parentheses themselves. The serializer
//! parenthesizes every binary node, so nothing is lost by dropping them.

use nom::{
    IResult, Parser,
    branch::alt,
    character::complete::char,
    combinator::{cut, map, opt, value},
    multi::separated_list0,
    sequence::{delimited, preceded},
};

use nom::bytes::complete::tag;

use crate::ast::{BinaryExpr, BinaryOp, Expr, FunctionCall, UnaryExpr, UnaryOp};
use crate::lexer::{
    identifier::{keyword, metric_name},
    number::number,
    string::string_literal,
    whitespace::ws_opt,
};
use crate::parser::{
    grouping::grouping,
    selector::vector_selector,
};

/// Parse a PromQL expression, leaving any unconsumed input in the result.
///
/// # Examples
///
/// ```
/// use promql_builder::parser::expr::expr;
///
/// let (rest, tree) = expr(r#"sum(rate(http_requests_total[5m])) by (job)"#).unwrap();
/// assert!(rest.is_empty());
/// assert_eq!(tree.to_string(), "sum(rate(http_requests_total[5m])) by (job)");
/// ```
pub fn expr(input: &str) -> IResult<&str, Expr> {
    preceded(ws_opt, |i| binary_expr(i, 0)).parse(input)
}

/// Precedence climbing over binary operators.
///
/// Only operators at or above `min_precedence` are consumed at this level;
/// tighter-binding operators are picked up by the recursive call for the
/// right-hand side. `^` recurses at its own precedence so it nests to the
/// right.
fn binary_expr(input: &str, min_precedence: u8) -> IResult<&str, Expr> {
    let (mut input, mut lhs) = unary_expr(input)?;

    loop {
        let (remaining, _) = ws_opt(input)?;

        let (remaining, op) = match binary_op(remaining) {
            Ok((r, o)) => (r, o),
            Err(_) => break,
        };

        if op.precedence() < min_precedence {
            break;
        }
        let next_min = if op.is_right_associative() {
            op.precedence()
        } else {
            op.precedence() + 1
        };

        let (remaining, _) = ws_opt(remaining)?;
        let (remaining, rhs) = binary_expr(remaining, next_min)?;

        lhs = Expr::Binary(Box::new(BinaryExpr::new(op, lhs, rhs)));
        input = remaining;
    }

    Ok((input, lhs))
}

fn binary_op(input: &str) -> IResult<&str, BinaryOp> {
    alt((
        // Two-character operators first so `<` does not eat `<=`
        value(BinaryOp::Eq, tag("==")),
        value(BinaryOp::Ne, tag("!=")),
        value(BinaryOp::Le, tag("<=")),
        value(BinaryOp::Ge, tag(">=")),
        value(BinaryOp::Lt, char('<')),
        value(BinaryOp::Gt, char('>')),
        value(BinaryOp::Add, char('+')),
        value(BinaryOp::Sub, char('-')),
        value(BinaryOp::Mul, char('*')),
        value(BinaryOp::Div, char('/')),
        value(BinaryOp::Mod, char('%')),
        value(BinaryOp::Pow, char('^')),
        value(BinaryOp::And, keyword("and")),
        value(BinaryOp::Or, keyword("or")),
        value(BinaryOp::Unless, keyword("unless")),
    ))
    .parse(input)
}

fn unary_expr(input: &str) -> IResult<&str, Expr> {
    alt((
        (unary_op, ws_opt, unary_expr)
            .map(|(op, _, operand)| Expr::Unary(Box::new(UnaryExpr::new(op, operand)))),
        primary_expr,
    ))
    .parse(input)
}

fn unary_op(input: &str) -> IResult<&str, UnaryOp> {
    alt((
        value(UnaryOp::Minus, char('-')),
        value(UnaryOp::Plus, char('+')),
    ))
    .parse(input)
}

fn primary_expr(input: &str) -> IResult<&str, Expr> {
    alt((
        paren_expr,
        // Number before identifier so `Inf` and `NaN` become literals
        map(number, Expr::Number),
        map(string_literal, Expr::String),
        identifier_expr,
        // Selector written as bare label matchers: `{job="api"}`
        map(vector_selector, Expr::Selector),
    ))
    .parse(input)
}

fn paren_expr(input: &str) -> IResult<&str, Expr> {
    preceded(char('('), cut(delimited(ws_opt, expr, (ws_opt, char(')'))))).parse(input)
}

/// Calls and named selectors both start with an identifier; what follows
/// decides which one it is.
fn identifier_expr(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = metric_name(input)?;

    // Grouping written between the name and the argument list:
    // `sum by (job) (metric)`
    let (rest, grouping_before) = opt(preceded(ws_opt, grouping)).parse(rest)?;
    let (after_ws, _) = ws_opt(rest)?;

    if after_ws.starts_with('(') {
        let (rest, args) = argument_list(after_ws)?;
        let (rest, grouping_after) = if grouping_before.is_none() {
            opt(preceded(ws_opt, grouping)).parse(rest)?
        } else {
            (rest, None)
        };
        let call = FunctionCall {
            name: name.to_string(),
            args,
            grouping: grouping_before.or(grouping_after),
        };
        return Ok((rest, Expr::Call(Box::new(call))));
    }

    // Not a call; reparse from the start as a plain selector
    map(vector_selector, Expr::Selector).parse(input)
}

fn argument_list(input: &str) -> IResult<&str, Vec<Expr>> {
    preceded(
        char('('),
        cut(delimited(
            ws_opt,
            separated_list0((ws_opt, char(','), ws_opt), expr),
            (ws_opt, opt((char(','), ws_opt)), char(')')),
        )),
    )
    .parse(input)
}
