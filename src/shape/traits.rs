//! The validator abstraction shared by every combinator.
//!
//! A [`Validator`] checks (and may transform) one JSON value. It is a cheap,
//! clonable handle over an `Arc<dyn Validate>`, so the same validator can be
//! attached to many query nodes and embedded in many composite shapes.

use std::fmt::{self, Display};
use std::sync::Arc;

use serde_json::Value;
use stillwater::Validation;

use crate::error::{ParseError, ParseErrors};
use crate::ValidationResult;

/// A type that validates JSON values.
///
/// Implementations report failures with root-relative paths; the enclosing
/// combinator prefixes them with its own key or index.
pub trait Validate: Send + Sync {
    /// Validates `value`, returning the (possibly transformed) output.
    fn validate(&self, value: &Value) -> ValidationResult<Value>;
}

/// A shared, type-erased validator.
///
/// # Example
///
/// ```rust
/// use shapeql::{Shape, IntoValidator};
/// use serde_json::json;
///
/// let price = Shape::number().min(0.0).into_validator();
/// assert!(price.validate(&json!(12.5)).is_success());
/// assert!(price.parse(&json!("12.5")).is_err());
/// ```
#[derive(Clone)]
pub struct Validator(Arc<dyn Validate>);

impl Validator {
    /// Wraps any [`Validate`] implementation.
    pub fn new<V: Validate + 'static>(validate: V) -> Self {
        Self(Arc::new(validate))
    }

    /// Creates a validator from a closure that reports `ParseErrors` itself.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Value) -> ValidationResult<Value> + Send + Sync + 'static,
    {
        Self::new(FnValidator(f))
    }

    /// Creates a validator from a closure with its own error type.
    ///
    /// A foreign error carries no path information, so it is normalized
    /// into one root-path entry (code `custom`) holding its `Display` text.
    pub fn try_from_fn<F, E>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, E> + Send + Sync + 'static,
        E: Display,
    {
        Self::from_fn(move |value| match f(value) {
            Ok(output) => Validation::Success(output),
            Err(error) => Validation::Failure(ParseErrors::single(
                ParseError::new(value.clone(), error.to_string()).with_code("custom"),
            )),
        })
    }

    /// Validates a value.
    pub fn validate(&self, value: &Value) -> ValidationResult<Value> {
        self.0.validate(value)
    }

    /// Validates a value, returning a `Result` for `?`-style callers.
    pub fn parse(&self, value: &Value) -> Result<Value, ParseErrors> {
        self.validate(value).into_result()
    }

    /// Sequential composition: `next` runs on this validator's output.
    pub fn then(&self, next: impl IntoValidator) -> Validator {
        let first = self.clone();
        let next = next.into_validator();
        Validator::from_fn(move |value| match first.validate(value) {
            Validation::Success(output) => next.validate(&output),
            failure => failure,
        })
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

struct FnValidator<F>(F);

impl<F> Validate for FnValidator<F>
where
    F: Fn(&Value) -> ValidationResult<Value> + Send + Sync,
{
    fn validate(&self, value: &Value) -> ValidationResult<Value> {
        (self.0)(value)
    }
}

/// Conversion into a shared [`Validator`].
///
/// Implemented for `Validator` itself and for every shape builder, so
/// builder methods accept either.
pub trait IntoValidator {
    fn into_validator(self) -> Validator;
}

impl IntoValidator for Validator {
    fn into_validator(self) -> Validator {
        self
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Validator>();
    assert_sync::<Validator>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_try_from_fn_normalizes_foreign_error() {
        let even = Validator::try_from_fn(|value: &Value| match value.as_i64() {
            Some(n) if n % 2 == 0 => Ok(value.clone()),
            _ => Err("must be even"),
        });

        assert!(even.validate(&json!(4)).is_success());

        let errors = even.parse(&json!(3)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.first().path.is_root());
        assert_eq!(errors.first().code, "custom");
        assert_eq!(errors.to_string(), "1 Parsing Error:\nresult: must be even");
    }

    #[test]
    fn test_then_feeds_output_forward() {
        let double = Validator::from_fn(|value| {
            Validation::Success(json!(value.as_i64().unwrap_or(0) * 2))
        });
        let plus_one = Validator::from_fn(|value| {
            Validation::Success(json!(value.as_i64().unwrap_or(0) + 1))
        });

        assert_eq!(double.then(plus_one).parse(&json!(5)).unwrap(), json!(11));
    }
}
