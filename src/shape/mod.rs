//! Validator combinators.
//!
//! Every shape validates a `serde_json::Value` and accumulates all failures
//! instead of stopping at the first one. Structural mismatches at a node
//! (an object where an array was expected) fail that node immediately;
//! failures inside fields or elements are collected under their key or
//! index so siblings are still validated.
//!
//! # Example
//!
//! ```rust
//! use shapeql::{IntoValidator, Shape};
//! use serde_json::json;
//!
//! let product = Shape::object()
//!     .field("name", Shape::string().min_len(1))
//!     .field("tags", Shape::array(Shape::string()))
//!     .into_validator();
//!
//! let result = product.parse(&json!({"name": "Lamp", "tags": ["home"]}));
//! assert!(result.is_ok());
//! ```

mod array;
mod combinators;
mod numeric;
mod object;
mod primitives;
mod string;
mod traits;

use serde_json::Value;

pub use array::ArrayShape;
pub use combinators::{chain, union};
pub use numeric::NumberShape;
pub use object::{combine_objects, ObjectShape};
pub use string::StringShape;
pub use traits::{IntoValidator, Validate, Validator};

/// Entry point for creating validators.
pub struct Shape;

impl Shape {
    /// A string validator; add constraints with the builder methods.
    pub fn string() -> StringShape {
        StringShape::new()
    }

    /// A number validator; add constraints with the builder methods.
    pub fn number() -> NumberShape {
        NumberShape::new()
    }

    /// Accepts `true` or `false`.
    pub fn boolean() -> Validator {
        primitives::boolean()
    }

    /// Accepts only `null`.
    pub fn null() -> Validator {
        primitives::null()
    }

    /// Accepts anything, unchanged.
    pub fn unknown() -> Validator {
        primitives::unknown()
    }

    /// Accepts any object, unchanged.
    pub fn any_object() -> Validator {
        primitives::any_object()
    }

    /// Accepts only a value equal to `expected`.
    pub fn literal(expected: impl Into<Value>) -> Validator {
        primitives::literal(expected.into())
    }

    /// An object validator; declare keys with [`ObjectShape::field`].
    pub fn object() -> ObjectShape {
        ObjectShape::new()
    }

    /// An array whose every element passes `item`.
    pub fn array(item: impl IntoValidator) -> ArrayShape {
        ArrayShape::new(Some(item.into_validator()))
    }

    /// An array of `item`, or a single `item`.
    pub fn maybe_array(item: impl IntoValidator) -> ArrayShape {
        ArrayShape::maybe(Some(item.into_validator()))
    }

    /// First matching validator wins; see [`union`].
    pub fn union<I>(options: I) -> Validator
    where
        I: IntoIterator,
        I::Item: IntoValidator,
    {
        union(options.into_iter().map(IntoValidator::into_validator).collect())
    }

    /// `null` passes; anything else must pass `inner`.
    pub fn nullable(inner: impl IntoValidator) -> Validator {
        primitives::nullable(inner)
    }

    /// `null` (or a missing key) becomes `default`; anything else must pass `inner`.
    pub fn default_value(inner: impl IntoValidator, default: impl Into<Value>) -> Validator {
        primitives::default_value(inner, default.into())
    }
}
