//! Object validation.
//!
//! This module provides [`ObjectShape`], which validates a fixed set of keys
//! and returns a new object holding only those keys, and
//! [`combine_objects`], which merges the outputs of several object
//! validators run against the same input.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::ErrorCollector;
use crate::path::PathSegment;
use crate::ValidationResult;

use super::primitives::{type_mismatch, type_name};
use super::traits::{IntoValidator, Validate, Validator};

/// A validator for JSON objects with a known set of keys.
///
/// A key without a validator is copied through unchanged. A key missing from
/// the input reads as `null`. Every key is validated even after an earlier
/// key has failed, so one run reports all field errors together.
///
/// # Example
///
/// ```rust
/// use shapeql::{Shape, Validate};
/// use serde_json::json;
///
/// let product = Shape::object()
///     .field("name", Shape::string())
///     .field("price", Shape::number());
///
/// let errors = product
///     .validate(&json!({"name": "A", "price": "bad"}))
///     .into_result()
///     .unwrap_err();
///
/// assert_eq!(
///     errors.to_string(),
///     "1 Parsing Error:\nresult.price: Expected number, received string"
/// );
/// ```
#[derive(Clone, Default)]
pub struct ObjectShape {
    fields: IndexMap<String, Option<Validator>>,
}

impl ObjectShape {
    /// Creates an object validator with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a validated field.
    pub fn field(mut self, name: impl Into<String>, validator: impl IntoValidator) -> Self {
        self.fields.insert(name.into(), Some(validator.into_validator()));
        self
    }

    /// Adds a field that is copied through without validation.
    pub fn include(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into(), None);
        self
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<IndexMap<String, Option<Validator>>> for ObjectShape {
    fn from(fields: IndexMap<String, Option<Validator>>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>> FromIterator<(K, Option<Validator>)> for ObjectShape {
    fn from_iter<I: IntoIterator<Item = (K, Option<Validator>)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Validate for ObjectShape {
    fn validate(&self, value: &Value) -> ValidationResult<Value> {
        let obj = match value.as_object() {
            Some(o) => o,
            None => return type_mismatch("an object", value),
        };

        let mut errors = ErrorCollector::new();
        let mut validated = Map::new();

        for (name, validator) in &self.fields {
            let field_value = obj.get(name).unwrap_or(&Value::Null);
            match validator {
                None => {
                    validated.insert(name.clone(), field_value.clone());
                }
                Some(validator) => match validator.validate(field_value) {
                    Validation::Success(v) => {
                        validated.insert(name.clone(), v);
                    }
                    Validation::Failure(e) => {
                        errors.add(Some(PathSegment::field(name.as_str())), e);
                    }
                },
            }
        }

        errors.finish(Value::Object(validated))
    }
}

impl IntoValidator for ObjectShape {
    fn into_validator(self) -> Validator {
        Validator::new(self)
    }
}

/// Runs every validator against the same input and shallow-merges outputs.
///
/// The input itself must be an object; anything else fails once, before
/// any layer runs. Later validators win on key conflicts. If any validator
/// fails, all failures are returned together and no partial object is
/// produced.
pub fn combine_objects(validators: Vec<Validator>) -> Validator {
    Validator::from_fn(move |value| {
        if !value.is_object() {
            return type_mismatch("an object", value);
        }

        let mut errors = ErrorCollector::new();
        let mut merged = Map::new();

        for validator in &validators {
            match validator.validate(value) {
                Validation::Success(Value::Object(fields)) => merged.extend(fields),
                Validation::Success(other) => errors.add_error(
                    None,
                    &other,
                    format!("Expected an object, received {}", type_name(&other)),
                    "invalid_type",
                ),
                Validation::Failure(e) => errors.add(None, e),
            }
        }

        errors.finish(Value::Object(merged))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object() {
        let schema = ObjectShape::new();
        for input in [json!("x"), json!(1), json!(null), json!([1, 2])] {
            let errors = schema.validate(&input).into_result().unwrap_err();
            assert_eq!(errors.len(), 1);
            assert!(errors.first().path.is_root());
            assert!(errors.first().message.starts_with("Expected an object, received"));
        }
    }

    #[test]
    fn test_null_is_described() {
        let errors = ObjectShape::new()
            .validate(&json!(null))
            .into_result()
            .unwrap_err();
        assert_eq!(errors.first().message, "Expected an object, received null");
    }

    #[test]
    fn test_keeps_only_shape_keys() {
        let schema = ObjectShape::new()
            .field("name", Shape::string())
            .include("slug");
        let output = schema
            .validate(&json!({"name": "A", "slug": "a", "extra": true}))
            .into_result()
            .unwrap();
        assert_eq!(output, json!({"name": "A", "slug": "a"}));
    }

    #[test]
    fn test_missing_fields_each_reported() {
        let schema = ObjectShape::new()
            .field("a", Shape::string())
            .field("b", Shape::number())
            .field("c", Shape::boolean())
            .field("d", Shape::string());

        let errors = schema
            .validate(&json!({"a": "x"}))
            .into_result()
            .unwrap_err();
        let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec![".b", ".c", ".d"]);
    }

    #[test]
    fn test_missing_unvalidated_key_reads_null() {
        let schema = ObjectShape::new().include("image");
        let output = schema.validate(&json!({})).into_result().unwrap();
        assert_eq!(output, json!({"image": null}));
    }

    #[test]
    fn test_combine_objects_later_wins() {
        let base = Validator::from_fn(|_| Validation::Success(json!({"a": 1, "b": 1})));
        let top = Validator::from_fn(|_| Validation::Success(json!({"b": 2})));

        let combined = combine_objects(vec![base, top]);
        assert_eq!(combined.parse(&json!({})).unwrap(), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_combine_objects_aggregates_all_failures() {
        let left = Shape::object().field("a", Shape::string()).into_validator();
        let right = Shape::object().field("b", Shape::number()).into_validator();
        let ok = Shape::object().include("c").into_validator();

        let combined = combine_objects(vec![left, ok, right]);
        let errors = combined
            .parse(&json!({"a": 1, "b": "x", "c": 3}))
            .unwrap_err();

        let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec![".a", ".b"]);
    }

    #[test]
    fn test_combine_objects_rejects_non_object_output() {
        let scalar = Validator::from_fn(|_| Validation::Success(json!(5)));
        let errors = combine_objects(vec![scalar]).parse(&json!({})).unwrap_err();
        assert_eq!(errors.first().code, "invalid_type");
    }

    #[test]
    fn test_combine_objects_rejects_non_object_input_once() {
        let layers = vec![
            Shape::any_object(),
            Shape::object().field("a", Shape::string()).into_validator(),
            Shape::object().include("b").into_validator(),
        ];
        let errors = combine_objects(layers).parse(&json!([5])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.first().path.is_root());
        assert_eq!(errors.first().message, "Expected an object, received array");
    }
}
