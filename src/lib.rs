//! # promql-builder
//!
//! Parse, mutate and re-render [Prometheus](https://prometheus.io) PromQL
//! queries, built on the [nom](https://github.com/rust-bakery/nom) parser
//! combinator library.
//!
//! Query text parses into an expression tree ([`Expr`]); the
//! [`QueryBuilder`] applies structured edits to that tree (label matchers,
//! range windows, offsets, function wrappers, comparisons, arithmetic); the
//! `Display` impls render it back to canonical text. Rendering is
//! deterministic and re-parses to the identical tree.
//!
//! ## Building a query from scratch
//!
//! ```rust
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
//!
//! ## Editing an existing query
//!
//! ```rust
//! use promql_builder::QueryBuilder;
//!
//! let mut builder = QueryBuilder::parse(r#"rate(http_requests_total{status="200"}[5m])"#)?;
//! let query = builder
//!     .with_label_op("path", "/api", "=~")?
//!     .with_range("10m")?
//!     .with_binary_op(">", 0.5)?
//!     .build();
//! assert_eq!(
//!     query,
//!     r#"(rate(http_requests_total{status="200",path=~"/api"}[10m]) > 0.5)"#
//! );
//! # Ok::<(), promql_builder::Error>(())
//! ```
//!
//! ## Parsing only
//!
//! ```rust
//! use promql_builder::{Expr, parse};
//!
//! let tree = parse("sum by (job) (rate(http_requests_total[5m]))")?;
//! // Grouping clauses normalize to the trailing position
//! assert_eq!(tree.to_string(), "sum(rate(http_requests_total[5m])) by (job)");
//! assert!(matches!(tree, Expr::Call(_)));
//! # Ok::<(), promql_builder::Error>(())
//! ```
//!
//! ## Scope
//!
//! The supported grammar covers selectors with label matchers, range and
//! offset modifiers, function and aggregation calls with `by`/`without`
//! grouping, and the full binary/unary operator table with Prometheus
//! precedence. Subqueries and the `on`/`ignoring`/`group_left` vector
//! matching modifiers are not supported, and nothing is validated against
//! live metric metadata.

pub mod ast;
pub mod builder;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryExpr, BinaryOp, Expr, FunctionCall, UnaryExpr, UnaryOp};
pub use builder::{Arg, QueryBuilder};
pub use error::Error;
pub use lexer::duration::{Duration, DurationUnit};
pub use parser::grouping::{Grouping, GroupingAction};
pub use parser::parse;
pub use parser::selector::{LabelMatcher, MatchOp, VectorSelector};
