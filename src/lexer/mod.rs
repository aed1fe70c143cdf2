// Token-level parsers: identifiers, strings, numbers, durations, whitespace.
// The expression parser in crate::parser composes these.

pub mod duration;
pub mod identifier;
pub mod number;
pub mod string;
pub mod whitespace;

pub use duration::{Duration, DurationUnit, duration};
pub use identifier::{label_name, metric_name};
pub use number::number;
pub use string::string_literal;
pub use whitespace::{ws_opt, ws_req};
