//! Build-time and boundary error types.

use thiserror::Error;

use super::ParseErrors;

/// Raised while *building* a query or projection.
///
/// Configuration errors are fatal and immediate: they surface from the
/// builder call that introduced the problem, never at data time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unexpected value for projection key \"{key}\"")]
    UnexpectedProjectionValue { key: String },

    #[error("Unknown field \"{key}\" cannot be included as-is")]
    UnknownField { key: String },

    #[error("cannot chain \"{text}\" after a validator has been attached; use a passthrough operation to keep the existing validator")]
    ChainAfterValidator { text: String },

    #[error("validation is required, but no validator was supplied for: {}", keys.join(", "))]
    MissingValidation { keys: Vec<String> },

    #[error("either every branch must supply a validator or none may; unvalidated branches: {}", branches.join(", "))]
    PartialBranchValidation { branches: Vec<String> },

    #[error("validation is required, but the query has no validator attached")]
    ValidationRequired,

    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Error type for executing and parsing a finished query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseErrors),

    #[error("query transport failed: {0}")]
    Transport(#[source] TransportError),
}

/// Error returned by a query transport.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_validation_names_every_key() {
        let error = ConfigError::MissingValidation {
            keys: vec!["name".to_string(), "price".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "validation is required, but no validator was supplied for: name, price"
        );
    }

    #[test]
    fn test_unexpected_projection_value_message() {
        let error = ConfigError::UnexpectedProjectionValue {
            key: "slug".to_string(),
        };
        assert_eq!(error.to_string(), "Unexpected value for projection key \"slug\"");
    }
}
