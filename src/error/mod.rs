//! Error types.
//!
//! Two disjoint families: [`ConfigError`] for mistakes made while building a
//! query, and [`ParseErrors`] for structural failures found in received
//! data. [`QueryError`] joins them at the execution boundary.

mod config_error;
mod parse_error;

pub use config_error::{ConfigError, QueryError, TransportError};
pub use parse_error::{ErrorCollector, ParseError, ParseErrors};
