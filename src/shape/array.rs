//! Array validation.
//!
//! This module provides [`ArrayShape`], which validates every element of an
//! array, and its "maybe array" variant, which also accepts a single item.

use serde_json::Value;
use stillwater::Validation;

use crate::error::ErrorCollector;
use crate::path::PathSegment;
use crate::ValidationResult;

use super::primitives::type_mismatch;
use super::traits::{IntoValidator, Validate, Validator};

/// A validator for arrays.
///
/// Failing elements are reported under their index and do not stop the
/// remaining elements from being validated.
///
/// # Example
///
/// ```rust
/// use shapeql::{Shape, Validate};
/// use serde_json::json;
///
/// let ids = Shape::array(Shape::object().field("id", Shape::string()));
///
/// let errors = ids
///     .validate(&json!([{"id": "a"}, {"id": 42}]))
///     .into_result()
///     .unwrap_err();
///
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors.first().path.to_string(), "[1].id");
/// ```
#[derive(Clone)]
pub struct ArrayShape {
    item: Option<Validator>,
    accept_single: bool,
}

impl ArrayShape {
    /// Strict array of `item`. `None` accepts any elements.
    pub fn new(item: Option<Validator>) -> Self {
        Self {
            item,
            accept_single: false,
        }
    }

    /// Array of `item`, or a single `item`.
    ///
    /// A projection that passes through a dereference may yield one document
    /// or many depending on the upstream cardinality.
    pub fn maybe(item: Option<Validator>) -> Self {
        Self {
            item,
            accept_single: true,
        }
    }

    fn validate_items(&self, items: &[Value]) -> ValidationResult<Value> {
        let item = match &self.item {
            Some(item) => item,
            None => return Validation::Success(Value::Array(items.to_vec())),
        };

        let mut errors = ErrorCollector::new();
        let mut validated = Vec::with_capacity(items.len());
        for (index, element) in items.iter().enumerate() {
            match item.validate(element) {
                Validation::Success(v) => validated.push(v),
                Validation::Failure(e) => errors.add(Some(PathSegment::index(index)), e),
            }
        }
        errors.finish(Value::Array(validated))
    }
}

impl Validate for ArrayShape {
    fn validate(&self, value: &Value) -> ValidationResult<Value> {
        match (value, &self.item) {
            (Value::Array(items), _) => self.validate_items(items),
            (single, Some(item)) if self.accept_single => item.validate(single),
            (single, None) if self.accept_single => Validation::Success(single.clone()),
            (other, _) => type_mismatch("an array", other),
        }
    }
}

impl IntoValidator for ArrayShape {
    fn into_validator(self) -> Validator {
        Validator::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use serde_json::json;

    fn doubled() -> Validator {
        Validator::from_fn(|value| match value.as_i64() {
            Some(n) => Validation::Success(json!(n * 2)),
            None => type_mismatch("number", value),
        })
    }

    #[test]
    fn test_rejects_non_array() {
        let errors = ArrayShape::new(None)
            .validate(&json!({"a": 1}))
            .into_result()
            .unwrap_err();
        assert_eq!(errors.first().message, "Expected an array, received object");
    }

    #[test]
    fn test_reports_every_failing_index() {
        let schema = ArrayShape::new(Some(Shape::number().into_validator()));
        let errors = schema
            .validate(&json!(["a", 1, "b", 2]))
            .into_result()
            .unwrap_err();
        let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["[0]", "[2]"]);
    }

    #[test]
    fn test_without_item_validator_copies() {
        let output = ArrayShape::new(None)
            .validate(&json!([1, "x", null]))
            .into_result()
            .unwrap();
        assert_eq!(output, json!([1, "x", null]));
    }

    #[test]
    fn test_maybe_array_single_and_many() {
        let schema = ArrayShape::maybe(Some(doubled()));
        assert_eq!(schema.validate(&json!(3)).into_result().unwrap(), json!(6));
        assert_eq!(
            schema.validate(&json!([1, 2])).into_result().unwrap(),
            json!([2, 4])
        );
    }

    #[test]
    fn test_maybe_array_keeps_validating_after_failure() {
        let schema = ArrayShape::maybe(Some(doubled()));
        let errors = schema
            .validate(&json!(["x", 2, "y"]))
            .into_result()
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.iter().last().unwrap().path.to_string(), "[2]");
    }
}
