//! Programmatic construction and mutation of PromQL queries.
//!
//! [`QueryBuilder`] owns a single expression tree and offers chainable
//! operations that grow or shrink it: add label matchers, attach range
//! windows and offsets, wrap the tree in function calls, comparisons or
//! arithmetic. [`QueryBuilder::build`] renders the canonical query text.
//!
//! Every fallible operation validates its arguments before touching the
//! tree, so a call that returns an error leaves the builder exactly as it
//! was. Removals of things that are not present are no-ops, not errors.
//!
//! ```
//! use promql_builder::QueryBuilder;
//!
//! let mut builder = QueryBuilder::new();
//! let query = builder
//!     .with_metric("http_requests_total")?
//!     .with_label("status", "200")?
//!     .with_rate("5m")?
//!     .build();
//! assert_eq!(query, r#"rate(http_requests_total{status="200"}[5m])"#);
//! # Ok::<(), promql_builder::Error>(())
//! ```

use std::str::FromStr;

use crate::ast::{BinaryExpr, BinaryOp, Expr, FunctionCall};
use crate::error::Error;
use crate::lexer::duration::Duration;
use crate::lexer::identifier::is_valid_label_name;
use crate::parser::grouping::Grouping;
use crate::parser::selector::{LabelMatcher, MatchOp, VectorSelector};

/// An argument to a builder operation: a scalar, a string, a full
/// expression, or the builder's current tree.
///
/// [`Arg::Current`] marks where the tree being built goes inside a
/// [`QueryBuilder::with_function`] argument list:
///
/// ```
/// use promql_builder::{Arg, QueryBuilder};
///
/// let mut builder = QueryBuilder::parse("latency_bucket")?;
/// let query = builder
///     .with_function("histogram_quantile", vec![Arg::from(0.95), Arg::Current])?
///     .build();
/// assert_eq!(query, "histogram_quantile(0.95, latency_bucket)");
/// # Ok::<(), promql_builder::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Number(f64),
    Text(String),
    Expr(Expr),
    /// The builder's current root expression.
    Current,
}

impl From<f64> for Arg {
    fn from(n: f64) -> Self {
        Arg::Number(n)
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Number(n as f64)
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Text(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Text(s)
    }
}

impl From<Expr> for Arg {
    fn from(e: Expr) -> Self {
        Arg::Expr(e)
    }
}

/// A chainable builder over one PromQL expression tree.
///
/// Starts from an empty selector or from parsed query text. Operations
/// take `&mut self` and hand it back for chaining with `?`. Cloning the
/// builder deep-copies the tree, so variants can be forked cheaply.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    root: Expr,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    /// A builder holding the empty selector, which renders as `""`.
    pub fn new() -> Self {
        Self {
            root: Expr::Selector(VectorSelector::empty()),
        }
    }

    /// A builder over an existing query.
    pub fn parse(query: &str) -> Result<Self, Error> {
        Ok(Self {
            root: crate::parser::parse(query)?,
        })
    }

    /// The current expression tree.
    pub fn expr(&self) -> &Expr {
        &self.root
    }

    /// Set or replace the metric name on the innermost selector.
    ///
    /// When the tree contains no selector at all, which only happens for
    /// purely literal trees such as `parse("42")`, the tree is replaced by
    /// a fresh selector for `name`.
    pub fn with_metric(&mut self, name: impl Into<String>) -> Result<&mut Self, Error> {
        match self.root.selector_mut() {
            Some(selector) => selector.name = Some(name.into()),
            None => self.root = Expr::Selector(VectorSelector::new(name)),
        }
        Ok(self)
    }

    /// Add or replace an equality matcher on the innermost selector.
    ///
    /// A matcher with the same name is replaced in place, keeping its
    /// position in the matcher list.
    pub fn with_label(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, Error> {
        self.set_matcher(name.into(), value.into(), MatchOp::Equal)
    }

    /// Like [`QueryBuilder::with_label`] with an explicit operator, one of
    /// `=`, `!=`, `=~`, `!~`.
    pub fn with_label_op(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        operator: &str,
    ) -> Result<&mut Self, Error> {
        let op = MatchOp::from_str(operator)?;
        self.set_matcher(name.into(), value.into(), op)
    }

    fn set_matcher(&mut self, name: String, value: String, op: MatchOp) -> Result<&mut Self, Error> {
        match self.root.selector_mut() {
            Some(selector) => {
                selector.set_matcher(LabelMatcher::new(name, op, value));
                Ok(self)
            }
            None => Err(Error::NoSelector),
        }
    }

    /// Remove the named matcher from the innermost selector. No-op when
    /// absent or when there is no selector.
    pub fn remove_label(&mut self, name: &str) -> &mut Self {
        if let Some(selector) = self.root.selector_mut() {
            selector.remove_matcher(name);
        }
        self
    }

    /// Attach a range window (`[5m]`) to the innermost selector.
    pub fn with_range(&mut self, window: &str) -> Result<&mut Self, Error> {
        let range = Duration::from_str(window)?;
        match self.root.selector_mut() {
            Some(selector) => {
                selector.range = Some(range);
                Ok(self)
            }
            None => Err(Error::NoSelector),
        }
    }

    /// Drop the range window. No-op when absent.
    pub fn remove_range(&mut self) -> &mut Self {
        if let Some(selector) = self.root.selector_mut() {
            selector.range = None;
        }
        self
    }

    /// Attach an offset modifier (`offset 1h`) to the innermost selector.
    pub fn with_offset(&mut self, offset: &str) -> Result<&mut Self, Error> {
        let offset = Duration::from_str(offset)?;
        match self.root.selector_mut() {
            Some(selector) => {
                selector.offset = Some(offset);
                Ok(self)
            }
            None => Err(Error::NoSelector),
        }
    }

    /// Drop the offset modifier. No-op when absent.
    pub fn remove_offset(&mut self) -> &mut Self {
        if let Some(selector) = self.root.selector_mut() {
            selector.offset = None;
        }
        self
    }

    /// Wrap the current tree in a function call.
    ///
    /// The tree takes the [`Arg::Current`] slot in `args`; without one it
    /// becomes the first argument. `with_function("rate", vec![])` turns
    /// `m` into `rate(m)`.
    pub fn with_function(&mut self, name: impl Into<String>, args: Vec<Arg>) -> Result<&mut Self, Error> {
        self.wrap_in_call(name.into(), args, None);
        Ok(self)
    }

    /// Wrap in a function call carrying a `by`/`without` grouping clause.
    ///
    /// At most one of `by` and `without` may be given; both at once fail
    /// with [`Error::ConflictingGrouping`]. Each label must be a valid
    /// label identifier ([`Error::InvalidLabel`] otherwise), and repeated
    /// labels are kept once, at their first position.
    pub fn with_function_grouped(
        &mut self,
        name: impl Into<String>,
        args: Vec<Arg>,
        by: Option<Vec<String>>,
        without: Option<Vec<String>>,
    ) -> Result<&mut Self, Error> {
        let grouping = match (by, without) {
            (Some(_), Some(_)) => return Err(Error::ConflictingGrouping),
            (Some(labels), None) => Some(Grouping::by(grouping_labels(labels)?)),
            (None, Some(labels)) => Some(Grouping::without(grouping_labels(labels)?)),
            (None, None) => None,
        };
        self.wrap_in_call(name.into(), args, grouping);
        Ok(self)
    }

    fn wrap_in_call(&mut self, name: String, args: Vec<Arg>, grouping: Option<Grouping>) {
        let current = std::mem::replace(&mut self.root, Expr::Number(0.0));

        let mut used_current = false;
        let mut call_args: Vec<Expr> = args
            .into_iter()
            .map(|arg| match arg {
                Arg::Number(n) => Expr::Number(n),
                Arg::Text(s) => Expr::String(s),
                Arg::Expr(e) => e,
                Arg::Current => {
                    used_current = true;
                    current.clone()
                }
            })
            .collect();
        if !used_current {
            call_args.insert(0, current);
        }

        self.root = Expr::Call(Box::new(FunctionCall {
            name,
            args: call_args,
            grouping,
        }));
    }

    /// Attach a range window and wrap in `rate(...)` in one step.
    pub fn with_rate(&mut self, window: &str) -> Result<&mut Self, Error> {
        self.with_range(window)?;
        self.with_function("rate", vec![Arg::Current])
    }

    /// Wrap the current tree as the left operand of a comparison or set
    /// operation: `==`, `!=`, `>`, `<`, `>=`, `<=`, `and`, `or`, `unless`.
    ///
    /// Arithmetic operators are rejected here; use
    /// [`QueryBuilder::with_arithmetic_op`].
    pub fn with_binary_op(&mut self, operator: &str, value: impl Into<Arg>) -> Result<&mut Self, Error> {
        let op = BinaryOp::from_str(operator)?;
        if op.is_arithmetic() {
            return Err(Error::InvalidOperator(operator.to_string()));
        }
        self.wrap_in_binary(op, value.into());
        Ok(self)
    }

    /// Wrap the current tree as the left operand of an arithmetic
    /// operation: `+`, `-`, `*`, `/`, `%`, `^`.
    pub fn with_arithmetic_op(
        &mut self,
        operator: &str,
        value: impl Into<Arg>,
    ) -> Result<&mut Self, Error> {
        let op = BinaryOp::from_str(operator)?;
        if !op.is_arithmetic() {
            return Err(Error::InvalidOperator(operator.to_string()));
        }
        self.wrap_in_binary(op, value.into());
        Ok(self)
    }

    fn wrap_in_binary(&mut self, op: BinaryOp, value: Arg) {
        let current = std::mem::replace(&mut self.root, Expr::Number(0.0));
        let rhs = match value {
            Arg::Number(n) => Expr::Number(n),
            Arg::Text(s) => Expr::String(s),
            Arg::Expr(e) => e,
            // The tree cannot be both operands; a Current rhs mirrors it
            Arg::Current => current.clone(),
        };
        self.root = Expr::Binary(Box::new(BinaryExpr::new(op, current, rhs)));
    }

    /// Remove the nearest enclosing call with this name, splicing its
    /// primary argument into its place. No-op when no such call exists.
    ///
    /// The primary argument is the one holding a selector; for literal-only
    /// argument lists it is the first argument.
    pub fn remove_function(&mut self, name: &str) -> &mut Self {
        remove_call(&mut self.root, name);
        self
    }

    /// Unwrap the root comparison/set operation, keeping its left operand.
    /// No-op when the root is not one.
    pub fn remove_binary_op(&mut self) -> &mut Self {
        self.unwrap_binary(false);
        self
    }

    /// Unwrap the root arithmetic operation, keeping its left operand.
    /// No-op when the root is not one.
    pub fn remove_arithmetic_op(&mut self) -> &mut Self {
        self.unwrap_binary(true);
        self
    }

    fn unwrap_binary(&mut self, arithmetic: bool) {
        if matches!(&self.root, Expr::Binary(b) if b.op.is_arithmetic() == arithmetic) {
            if let Expr::Binary(binary) = std::mem::replace(&mut self.root, Expr::Number(0.0)) {
                self.root = binary.lhs;
            }
        }
    }

    /// Render the canonical query text. Pure; the tree is left untouched.
    pub fn build(&self) -> String {
        self.root.to_string()
    }
}

/// Check grouping labels against the label identifier grammar and drop
/// repeats, keeping first positions. Rejecting up front keeps the rendered
/// clause parseable.
fn grouping_labels(labels: Vec<String>) -> Result<Vec<String>, Error> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        if !is_valid_label_name(&label) {
            return Err(Error::InvalidLabel(label));
        }
        if !out.contains(&label) {
            out.push(label);
        }
    }
    Ok(out)
}

/// Depth-first search for a call named `name`; on a match, splice its
/// primary argument into the call's position.
fn remove_call(expr: &mut Expr, name: &str) -> bool {
    match expr {
        Expr::Call(call) if call.name == name => {
            let idx = call
                .args
                .iter()
                .position(|arg| arg.selector().is_some())
                .unwrap_or(0);
            if call.args.is_empty() {
                return false;
            }
            let inner = std::mem::replace(&mut call.args[idx], Expr::Number(0.0));
            *expr = inner;
            true
        }
        Expr::Call(call) => call.args.iter_mut().any(|arg| remove_call(arg, name)),
        Expr::Binary(binary) => {
            remove_call(&mut binary.lhs, name) || remove_call(&mut binary.rhs, name)
        }
        Expr::Unary(unary) => remove_call(&mut unary.expr, name),
        Expr::Number(_) | Expr::String(_) | Expr::Selector(_) => false,
    }
}
