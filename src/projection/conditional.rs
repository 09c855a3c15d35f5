//! Conditional projection groups.

use crate::conditional::ConditionalPolicy;
use crate::query::quote;

use super::{Projection, CONDITIONAL_PREFIX};

/// A named group of `condition => projection` branches.
///
/// - [`Conditional::merge`] emits `cond => { ... }` entries inline; several
///   conditions may hold at once and every applicable branch contributes.
/// - [`Conditional::select`] emits `...select(cond => { ... }, ...)`; the
///   conditions are mutually exclusive and the first applicable branch wins.
/// - [`Conditional::by_type`] is `merge` over `_type == "<name>"` conditions.
///
/// # Example
///
/// ```rust
/// use shapeql::{Conditional, Projection, QueryNode, Shape};
///
/// let media = Conditional::by_type("media")
///     .type_branch("image", Projection::new().field("url", Shape::string()))
///     .type_branch("video", Projection::new().field("duration", Shape::number()))
///     .exhaustive();
///
/// let node = QueryNode::new()
///     .star()
///     .project(Projection::new().field("_id", Shape::string()).conditional(media))
///     .unwrap();
///
/// assert_eq!(
///     node.query(),
///     r#"*{ _id, _type == "image" => { url }, _type == "video" => { duration } }"#
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Conditional {
    name: String,
    branches: Vec<(String, Projection)>,
    policy: ConditionalPolicy,
    exhaustive: bool,
}

impl Conditional {
    fn with_policy(name: impl Into<String>, policy: ConditionalPolicy) -> Self {
        Self {
            name: name.into(),
            branches: Vec::new(),
            policy,
            exhaustive: false,
        }
    }

    /// Overlapping conditions; every applicable branch is merged.
    pub fn merge(name: impl Into<String>) -> Self {
        Self::with_policy(name, ConditionalPolicy::MergeAll)
    }

    /// Mutually exclusive conditions; the first applicable branch wins.
    pub fn select(name: impl Into<String>) -> Self {
        Self::with_policy(name, ConditionalPolicy::FirstMatch)
    }

    /// Branches keyed by document type.
    pub fn by_type(name: impl Into<String>) -> Self {
        Self::merge(name)
    }

    /// Adds a branch.
    pub fn branch(mut self, condition: impl Into<String>, projection: Projection) -> Self {
        self.branches.push((condition.into(), projection));
        self
    }

    /// Adds a `_type == "<type_name>"` branch.
    pub fn type_branch(self, type_name: &str, projection: Projection) -> Self {
        self.branch(format!("_type == {}", quote(type_name)), projection)
    }

    /// Asserts the branches cover every possible document: data matching
    /// none of them is a validation failure instead of an empty contribution.
    pub fn exhaustive(mut self) -> Self {
        self.exhaustive = true;
        self
    }

    /// The reserved projection key for this group.
    pub fn key(&self) -> String {
        format!("{}{}", CONDITIONAL_PREFIX, self.name)
    }

    pub fn policy(&self) -> ConditionalPolicy {
        self.policy
    }

    pub fn is_exhaustive(&self) -> bool {
        self.exhaustive
    }

    pub(crate) fn branches(&self) -> &[(String, Projection)] {
        &self.branches
    }
}
