//! Primitive validators and small value-level helpers.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{ParseError, ParseErrors};
use crate::ValidationResult;

use super::traits::{IntoValidator, Validator};

/// Returns the JSON type name for a value.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A root-path `invalid_type` failure: `Expected <expected>, received <type>`.
pub(crate) fn type_mismatch<T>(expected: &str, value: &Value) -> ValidationResult<T> {
    Validation::Failure(ParseErrors::single(
        ParseError::new(
            value.clone(),
            format!("Expected {}, received {}", expected, type_name(value)),
        )
        .with_code("invalid_type"),
    ))
}

pub(crate) fn boolean() -> Validator {
    Validator::from_fn(|value| match value {
        Value::Bool(_) => Validation::Success(value.clone()),
        other => type_mismatch("boolean", other),
    })
}

pub(crate) fn null() -> Validator {
    Validator::from_fn(|value| match value {
        Value::Null => Validation::Success(Value::Null),
        other => type_mismatch("null", other),
    })
}

pub(crate) fn unknown() -> Validator {
    Validator::from_fn(|value| Validation::Success(value.clone()))
}

pub(crate) fn any_object() -> Validator {
    Validator::from_fn(|value| match value {
        Value::Object(_) => Validation::Success(value.clone()),
        other => type_mismatch("an object", other),
    })
}

pub(crate) fn literal(expected: Value) -> Validator {
    Validator::from_fn(move |value| {
        if *value == expected {
            Validation::Success(value.clone())
        } else {
            Validation::Failure(ParseErrors::single(
                ParseError::new(
                    value.clone(),
                    format!("Expected literal {}, received {}", expected, value),
                )
                .with_code("invalid_literal"),
            ))
        }
    })
}

pub(crate) fn nullable(inner: impl IntoValidator) -> Validator {
    let inner = inner.into_validator();
    Validator::from_fn(move |value| {
        if value.is_null() {
            Validation::Success(Value::Null)
        } else {
            inner.validate(value)
        }
    })
}

pub(crate) fn default_value(inner: impl IntoValidator, default: Value) -> Validator {
    let inner = inner.into_validator();
    Validator::from_fn(move |value| {
        if value.is_null() {
            Validation::Success(default.clone())
        } else {
            inner.validate(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        assert_eq!(type_name(&json!(null)), "null");
        assert_eq!(type_name(&json!([1])), "array");
        assert_eq!(type_name(&json!({"a": 1})), "object");
        assert_eq!(type_name(&json!(1.5)), "number");
    }

    #[test]
    fn test_boolean_rejects_string() {
        let errors = boolean().parse(&json!("true")).unwrap_err();
        assert_eq!(errors.first().message, "Expected boolean, received string");
        assert_eq!(errors.first().code, "invalid_type");
    }

    #[test]
    fn test_literal() {
        let product = literal(json!("product"));
        assert!(product.validate(&json!("product")).is_success());

        let errors = product.parse(&json!("category")).unwrap_err();
        assert_eq!(
            errors.first().message,
            r#"Expected literal "product", received "category""#
        );
    }

    #[test]
    fn test_nullable_passes_null_only() {
        let maybe_bool = nullable(boolean());
        assert_eq!(maybe_bool.parse(&json!(null)).unwrap(), json!(null));
        assert_eq!(maybe_bool.parse(&json!(true)).unwrap(), json!(true));
        assert!(maybe_bool.parse(&json!(1)).is_err());
    }

    #[test]
    fn test_default_value_replaces_null() {
        let flag = default_value(boolean(), json!(false));
        assert_eq!(flag.parse(&json!(null)).unwrap(), json!(false));
        assert_eq!(flag.parse(&json!(true)).unwrap(), json!(true));
    }

    #[test]
    fn test_null_and_unknown() {
        assert!(null().validate(&json!(null)).is_success());
        assert!(null().validate(&json!(0)).is_failure());
        assert_eq!(unknown().parse(&json!({"x": [1]})).unwrap(), json!({"x": [1]}));
    }

    #[test]
    fn test_any_object_keeps_every_key() {
        let doc = json!({"_id": "a", "nested": {"x": 1}});
        assert_eq!(any_object().parse(&doc).unwrap(), doc);
        assert!(any_object().parse(&json!([doc])).is_err());
    }
}
