//! Error types shared by the lexer, parser and query builder.

use thiserror::Error;

/// All failure modes of this crate.
///
/// Parsing failures ([`Error::Lex`], [`Error::Parse`]) carry the byte offset
/// into the original query text. Builder failures are raised before any
/// mutation takes place, so a failed call never leaves a half-edited tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Unterminated string, invalid character, or malformed literal.
    #[error("lex error at position {position}: {reason}")]
    Lex { position: usize, reason: String },

    /// Structurally malformed query.
    #[error("parse error at position {position}: expected {expected}, found {found}")]
    Parse {
        position: usize,
        expected: String,
        found: String,
    },

    /// Operator string outside the recognized set for the attempted call.
    #[error("invalid operator: {0:?}")]
    InvalidOperator(String),

    /// Grouping label that is not a valid label identifier.
    #[error("invalid label name: {0:?}")]
    InvalidLabel(String),

    /// Both `by` and `without` supplied to the same function wrapper.
    #[error("grouping clause cannot combine by and without")]
    ConflictingGrouping,

    /// A structural mutation needed a selector but the tree has none.
    #[error("expression contains no metric selector")]
    NoSelector,

    /// Duration string does not match `<positive integer><s|m|h|d|w|y>`.
    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),
}

impl Error {
    /// Position of the failure in the input, for lex/parse errors.
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::Lex { position, .. } | Error::Parse { position, .. } => Some(*position),
            _ => None,
        }
    }
}
