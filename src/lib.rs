//! # shapeql
//!
//! Build a document-store query incrementally and immutably while
//! assembling a runtime validator for exactly the shape of data that query
//! returns.
//!
//! ## Overview
//!
//! Every builder step returns a new [`QueryNode`] holding the query text so
//! far and the validator attached to it. Projections ([`Projection`]) map
//! output keys to query fragments and validators; compiling one yields a
//! `{ ... }` fragment and one object validator. When the raw JSON comes
//! back, [`QueryNode::parse`] runs the validator once and reports *all*
//! structural failures together, each with its path:
//!
//! ```text
//! 2 Parsing Errors:
//! result[0].price: Expected number, received string
//! result[3].slug: Expected string, received null
//! ```
//!
//! ## Core Types
//!
//! - [`Shape`], [`Validator`]: validator combinators
//! - [`ParseErrors`], [`ErrorCollector`], [`JsonPath`]: error aggregation
//! - [`conditional`]: first-match and merge-all resolution of branches
//! - [`QueryNode`], [`BuilderConfig`]: the immutable query builder
//! - [`Projection`], [`Conditional`]: projection compilation
//!
//! ## Example
//!
//! ```rust
//! use shapeql::{Projection, QueryNode, Shape};
//! use serde_json::json;
//!
//! let products = QueryNode::new()
//!     .star()
//!     .filter_by_type(["product"])
//!     .project(
//!         Projection::new()
//!             .field("name", Shape::string())
//!             .field("price", Shape::number()),
//!     )
//!     .unwrap();
//!
//! let error = products
//!     .parse(&json!([{"name": "A", "price": "bad"}]))
//!     .unwrap_err();
//!
//! assert_eq!(
//!     error.to_string(),
//!     "1 Parsing Error:\nresult[0].price: Expected number, received string"
//! );
//! ```

pub mod conditional;
pub mod error;
pub mod path;
pub mod projection;
pub mod query;
pub mod shape;

#[cfg(feature = "transport")]
pub mod transport;

pub use conditional::{ConditionalBranch, ConditionalPolicy, Discriminator, DiscriminatorTest};
pub use error::{ConfigError, ErrorCollector, ParseError, ParseErrors, QueryError, TransportError};
pub use path::{JsonPath, PathSegment};
pub use projection::{
    classify, CompiledProjection, Conditional, FieldSpec, NormalizedField, Projection,
    ProjectionValue,
};
pub use query::{BuilderConfig, Cardinality, Direction, QueryNode};
pub use shape::{
    chain, combine_objects, union, ArrayShape, IntoValidator, NumberShape, ObjectShape, Shape,
    StringShape, Validate, Validator,
};

#[cfg(feature = "transport")]
pub use transport::QueryTransport;

/// Type alias for validation results using ParseErrors
pub type ValidationResult<T> = stillwater::Validation<T, ParseErrors>;
