//! Abstract syntax tree for PromQL expressions.
//!
//! The tree is what the parser produces, what the query builder mutates,
//! and what serializes back to query text through the `Display` impls.
//! Serialization is canonical: matchers render without interior spaces,
//! every binary operation is parenthesized, and grouping clauses follow
//! the argument list. Parsing a rendered tree yields the identical tree.
//!
//! Explicit parentheses in the input carry no meaning of their own, so the
//! tree has no node for them; the structure records what they grouped.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::lexer::string::escape;
use crate::parser::grouping::Grouping;
use crate::parser::selector::VectorSelector;

/// A PromQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal: `42`, `0.95`, `1e10`
    Number(f64),

    /// String literal: `"api"`
    String(String),

    /// Metric selector: `http_requests_total{job="api"}[5m]`
    Selector(VectorSelector),

    /// Function or aggregation call: `rate(m[5m])`, `sum(m) by (job)`
    Call(Box<FunctionCall>),

    /// Binary operation: `m > 100`, `a / b`
    Binary(Box<BinaryExpr>),

    /// Unary operation: `-m`
    Unary(Box<UnaryExpr>),
}

impl Expr {
    /// The first metric selector in evaluation order, if any.
    ///
    /// Structural edits such as adding a matcher or a range window apply
    /// here. Descends into call arguments, binary operands (left first)
    /// and unary operands.
    pub fn selector(&self) -> Option<&VectorSelector> {
        match self {
            Expr::Selector(s) => Some(s),
            Expr::Call(c) => c.args.iter().find_map(Expr::selector),
            Expr::Binary(b) => b.lhs.selector().or_else(|| b.rhs.selector()),
            Expr::Unary(u) => u.expr.selector(),
            Expr::Number(_) | Expr::String(_) => None,
        }
    }

    /// Mutable access to the first metric selector, see [`Expr::selector`].
    pub fn selector_mut(&mut self) -> Option<&mut VectorSelector> {
        match self {
            Expr::Selector(s) => Some(s),
            Expr::Call(c) => c.args.iter_mut().find_map(Expr::selector_mut),
            Expr::Binary(b) => {
                if b.lhs.selector().is_some() {
                    b.lhs.selector_mut()
                } else {
                    b.rhs.selector_mut()
                }
            }
            Expr::Unary(u) => u.expr.selector_mut(),
            Expr::Number(_) | Expr::String(_) => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) if n.is_nan() => write!(f, "NaN"),
            Expr::Number(n) if n.is_infinite() => {
                write!(f, "{}Inf", if *n < 0.0 { "-" } else { "" })
            }
            Expr::Number(n) => write!(f, "{}", n),
            Expr::String(s) => write!(f, "\"{}\"", escape(s)),
            Expr::Selector(s) => write!(f, "{}", s),
            Expr::Call(c) => write!(f, "{}", c),
            Expr::Binary(b) => write!(f, "{}", b),
            Expr::Unary(u) => write!(f, "{}", u),
        }
    }
}

/// A function or aggregation call.
///
/// Aggregations are ordinary calls that may carry a grouping clause.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub grouping: Option<Grouping>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            args,
            grouping: None,
        }
    }

    pub fn with_grouping(name: impl Into<String>, args: Vec<Expr>, grouping: Grouping) -> Self {
        Self {
            name: name.into(),
            args,
            grouping: Some(grouping),
        }
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")?;
        if let Some(ref grouping) = self.grouping {
            write!(f, " {}", grouping)?;
        }
        Ok(())
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Set
    And,
    Or,
    Unless,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Unless => "unless",
        }
    }

    /// Binding strength, higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And | BinaryOp::Unless => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 5,
            BinaryOp::Pow => 6,
        }
    }

    pub fn is_right_associative(&self) -> bool {
        matches!(self, BinaryOp::Pow)
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Sub
                | BinaryOp::Mul
                | BinaryOp::Div
                | BinaryOp::Mod
                | BinaryOp::Pow
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_set_operator(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Unless)
    }
}

impl FromStr for BinaryOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let op = match s {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "^" => BinaryOp::Pow,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            "and" => BinaryOp::And,
            "or" => BinaryOp::Or,
            "unless" => BinaryOp::Unless,
            other => return Err(Error::InvalidOperator(other.to_string())),
        };
        Ok(op)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A binary operation. Always renders parenthesized, so operand order
/// survives re-parsing regardless of operator precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Expr,
    pub rhs: Expr,
}

impl BinaryExpr {
    pub fn new(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Self { op, lhs, rhs }
    }
}

impl fmt::Display for BinaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.lhs, self.op, self.rhs)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+` (no-op)
    Plus,
    /// `-`
    Minus,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A unary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub expr: Expr,
}

impl UnaryExpr {
    pub fn new(op: UnaryOp, expr: Expr) -> Self {
        Self { op, expr }
    }
}

impl fmt::Display for UnaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::duration::{Duration, DurationUnit};
    use crate::parser::selector::{LabelMatcher, MatchOp};

    fn selector(name: &str) -> Expr {
        Expr::Selector(VectorSelector::new(name))
    }

    #[test]
    fn test_binary_op_precedence_order() {
        // or < and/unless < comparison < +/- < */% < ^
        assert!(BinaryOp::Or.precedence() < BinaryOp::And.precedence());
        assert!(BinaryOp::Unless.precedence() < BinaryOp::Eq.precedence());
        assert!(BinaryOp::Ge.precedence() < BinaryOp::Add.precedence());
        assert!(BinaryOp::Sub.precedence() < BinaryOp::Mod.precedence());
        assert!(BinaryOp::Div.precedence() < BinaryOp::Pow.precedence());
    }

    #[test]
    fn test_binary_op_associativity() {
        assert!(BinaryOp::Pow.is_right_associative());
        assert!(!BinaryOp::Sub.is_right_associative());
        assert!(!BinaryOp::Div.is_right_associative());
    }

    #[test]
    fn test_binary_op_categories() {
        assert!(BinaryOp::Pow.is_arithmetic());
        assert!(!BinaryOp::Eq.is_arithmetic());
        assert!(BinaryOp::Ne.is_comparison());
        assert!(BinaryOp::Unless.is_set_operator());
        assert!(!BinaryOp::Add.is_set_operator());
    }

    #[test]
    fn test_binary_op_from_str() {
        assert_eq!("^".parse::<BinaryOp>().unwrap(), BinaryOp::Pow);
        assert_eq!("unless".parse::<BinaryOp>().unwrap(), BinaryOp::Unless);
        assert_eq!(
            "=".parse::<BinaryOp>(),
            Err(Error::InvalidOperator("=".to_string()))
        );
    }

    #[test]
    fn test_number_display() {
        assert_eq!(Expr::Number(42.0).to_string(), "42");
        assert_eq!(Expr::Number(0.95).to_string(), "0.95");
        assert_eq!(Expr::Number(f64::INFINITY).to_string(), "Inf");
        assert_eq!(Expr::Number(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn test_string_display_escapes() {
        assert_eq!(Expr::String("a\"b".to_string()).to_string(), r#""a\"b""#);
    }

    #[test]
    fn test_call_display() {
        let call = FunctionCall::new(
            "rate",
            vec![Expr::Selector(VectorSelector {
                name: Some("http_requests_total".into()),
                matchers: vec![],
                range: Some(Duration::new(5, DurationUnit::Minute)),
                offset: None,
            })],
        );
        assert_eq!(call.to_string(), "rate(http_requests_total[5m])");
    }

    #[test]
    fn test_call_display_multiple_args() {
        let call = FunctionCall::new(
            "histogram_quantile",
            vec![Expr::Number(0.95), selector("latency_bucket")],
        );
        assert_eq!(call.to_string(), "histogram_quantile(0.95, latency_bucket)");
    }

    #[test]
    fn test_call_display_grouping_after_args() {
        let call = FunctionCall::with_grouping(
            "sum",
            vec![selector("up")],
            Grouping::by(vec!["job".into()]),
        );
        assert_eq!(call.to_string(), "sum(up) by (job)");
    }

    #[test]
    fn test_binary_display_always_parenthesized() {
        let inner = BinaryExpr::new(BinaryOp::Add, selector("a"), selector("b"));
        let outer = BinaryExpr::new(BinaryOp::Gt, Expr::Binary(Box::new(inner)), Expr::Number(100.0));
        assert_eq!(outer.to_string(), "((a + b) > 100)");
    }

    #[test]
    fn test_unary_display() {
        let expr = UnaryExpr::new(UnaryOp::Minus, Expr::Number(42.0));
        assert_eq!(expr.to_string(), "-42");
    }

    #[test]
    fn test_selector_lookup_through_tree() {
        let mut expr = Expr::Binary(Box::new(BinaryExpr::new(
            BinaryOp::Gt,
            Expr::Call(Box::new(FunctionCall::new(
                "histogram_quantile",
                vec![Expr::Number(0.95), selector("latency_bucket")],
            ))),
            Expr::Number(0.5),
        )));

        assert_eq!(expr.selector().unwrap().name.as_deref(), Some("latency_bucket"));
        expr.selector_mut()
            .unwrap()
            .set_matcher(LabelMatcher::new("job", MatchOp::Equal, "api"));
        assert_eq!(
            expr.to_string(),
            r#"(histogram_quantile(0.95, latency_bucket{job="api"}) > 0.5)"#
        );
    }

    #[test]
    fn test_selector_lookup_prefers_lhs() {
        let expr = Expr::Binary(Box::new(BinaryExpr::new(
            BinaryOp::Add,
            selector("left"),
            selector("right"),
        )));
        assert_eq!(expr.selector().unwrap().name.as_deref(), Some("left"));
    }

    #[test]
    fn test_selector_lookup_falls_back_to_rhs() {
        let expr = Expr::Binary(Box::new(BinaryExpr::new(
            BinaryOp::Add,
            Expr::Number(1.0),
            selector("right"),
        )));
        assert_eq!(expr.selector().unwrap().name.as_deref(), Some("right"));
    }

    #[test]
    fn test_no_selector_in_literals() {
        assert!(Expr::Number(1.0).selector().is_none());
        assert!(Expr::String("x".into()).selector().is_none());
    }
}
