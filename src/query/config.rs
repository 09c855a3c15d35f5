//! Builder configuration.

/// Settings shared by every node derived from one root.
///
/// # Example
///
/// ```rust
/// use shapeql::{BuilderConfig, QueryNode};
///
/// let root = QueryNode::with_config(BuilderConfig::new().validation_required(true));
/// assert!(root.config().is_validation_required());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuilderConfig {
    validation_required: bool,
}

impl BuilderConfig {
    /// Creates the default configuration: validation optional.
    pub fn new() -> Self {
        Self::default()
    }

    /// When enabled, every projected field must carry a validator and
    /// parsing a node with no validator is a configuration error.
    pub fn validation_required(mut self, required: bool) -> Self {
        self.validation_required = required;
        self
    }

    /// Returns whether validation is required.
    pub fn is_validation_required(&self) -> bool {
        self.validation_required
    }
}
