//! Resolution of conditional (polymorphic) projections.
//!
//! A conditional projection lists branches, each pairing the condition text
//! sent to the store with the validator for the fields that branch adds.
//! The store evaluates the conditions; at validation time only the data is
//! left, so a branch "applies" when its validator accepts the input.
//!
//! Two policies share this mechanism:
//!
//! - [`ConditionalPolicy::FirstMatch`]: conditions are assumed mutually
//!   exclusive. Branches are tried in declaration order and the first one
//!   that accepts the input wins.
//! - [`ConditionalPolicy::MergeAll`]: conditions may overlap. Every branch
//!   that accepts the input contributes its fields; contributions are merged
//!   in declaration order, so the last applicable branch wins a key conflict.
//!
//! Some conditions can be decided from the data itself: `field == literal`
//! and `defined(field)`. A branch carrying such a [`Discriminator`] applies
//! exactly when the discriminator holds, and its validation failures are
//! reported instead of being read as "branch not applicable".
//!
//! When no branch applies the result is an empty object, unless the
//! resolver is exhaustive, in which case it fails.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use stillwater::Validation;
use tracing::trace;

use crate::error::{ConfigError, ErrorCollector, ParseError, ParseErrors};
use crate::shape::Validator;
use crate::ValidationResult;

static EQUALS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*==\s*(.+?)\s*$").expect("equals regex")
});

static DEFINED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*defined\(\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*\)\s*$").expect("defined regex")
});

/// What a [`Discriminator`] checks about its field.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscriminatorTest {
    /// `field == literal`
    Equals(Value),
    /// `defined(field)`: present and not null.
    Defined,
}

/// A condition that can be evaluated against the returned data.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
    pub field: String,
    pub test: DiscriminatorTest,
    /// The branch projects `field` itself, so an absent key means the
    /// condition was false rather than "not projected".
    pub carried: bool,
}

impl Discriminator {
    /// Recognizes `field == <json literal>` and `defined(field)`.
    ///
    /// Any other condition text returns `None`.
    pub fn parse(condition: &str) -> Option<Self> {
        if let Some(caps) = DEFINED.captures(condition) {
            return Some(Self {
                field: caps[1].to_string(),
                test: DiscriminatorTest::Defined,
                carried: false,
            });
        }
        let caps = EQUALS.captures(condition)?;
        let literal: Value = serde_json::from_str(&caps[2]).ok()?;
        Some(Self {
            field: caps[1].to_string(),
            test: DiscriminatorTest::Equals(literal),
            carried: false,
        })
    }

    pub fn carried(mut self, carried: bool) -> Self {
        self.carried = carried;
        self
    }

    /// `Some(holds)` when the data decides the condition, `None` when the
    /// field is not part of the data.
    pub fn holds(&self, value: &Value) -> Option<bool> {
        match (value.get(&self.field), &self.test) {
            (Some(found), DiscriminatorTest::Equals(expected)) => Some(found == expected),
            (Some(found), DiscriminatorTest::Defined) => Some(!found.is_null()),
            (None, _) if self.carried => Some(false),
            (None, _) => None,
        }
    }
}

/// One condition with the validator for the data it selects.
#[derive(Debug, Clone)]
pub struct ConditionalBranch {
    pub condition: String,
    pub validator: Validator,
    pub discriminator: Option<Discriminator>,
}

impl ConditionalBranch {
    pub fn new(condition: impl Into<String>, validator: Validator) -> Self {
        Self {
            condition: condition.into(),
            validator,
            discriminator: None,
        }
    }

    /// Decides applicability with `discriminator` instead of validator
    /// acceptance whenever the data carries its field.
    pub fn with_discriminator(mut self, discriminator: Discriminator) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    fn decided(&self, value: &Value) -> Option<bool> {
        self.discriminator.as_ref().and_then(|d| d.holds(value))
    }
}

/// How simultaneously applicable branches are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalPolicy {
    /// Pick the first applicable branch.
    FirstMatch,
    /// Merge every applicable branch; later branches win conflicts.
    MergeAll,
}

/// Builds the validator for `branches` under `policy`.
pub fn resolve(
    branches: Vec<ConditionalBranch>,
    policy: ConditionalPolicy,
    exhaustive: bool,
) -> Validator {
    match policy {
        ConditionalPolicy::FirstMatch => first_match(branches, exhaustive),
        ConditionalPolicy::MergeAll => merge_all(branches, exhaustive),
    }
}

/// The first applicable branch wins.
///
/// A branch whose discriminator holds is applicable and its result, failure
/// included, is final. Otherwise a branch applies when its validator
/// accepts the input.
pub fn first_match(branches: Vec<ConditionalBranch>, exhaustive: bool) -> Validator {
    Validator::from_fn(move |value| {
        for branch in &branches {
            match branch.decided(value) {
                Some(false) => continue,
                Some(true) => {
                    trace!(condition = %branch.condition, "conditional branch selected");
                    return branch.validator.validate(value);
                }
                None => {
                    if let Validation::Success(output) = branch.validator.validate(value) {
                        trace!(condition = %branch.condition, "conditional branch matched");
                        return Validation::Success(output);
                    }
                }
            }
        }
        no_branch_matched(branches.len(), value, exhaustive)
    })
}

/// Every applicable branch contributes; outputs are merged in order.
///
/// Failures of a branch whose discriminator holds are reported; failures of
/// an undecided branch only mean it does not apply.
pub fn merge_all(branches: Vec<ConditionalBranch>, exhaustive: bool) -> Validator {
    Validator::from_fn(move |value| {
        let mut merged = Map::new();
        let mut errors = ErrorCollector::new();
        let mut matched = 0;

        for branch in &branches {
            let decided = branch.decided(value);
            if decided == Some(false) {
                continue;
            }
            match branch.validator.validate(value) {
                Validation::Success(Value::Object(fields)) => {
                    trace!(condition = %branch.condition, "conditional branch applied");
                    matched += 1;
                    merged.extend(fields);
                }
                Validation::Success(other) => {
                    matched += 1;
                    errors.add_error(
                        None,
                        &other,
                        format!(
                            "Conditional branch `{}` produced a non-object value",
                            branch.condition
                        ),
                        "invalid_type",
                    );
                }
                Validation::Failure(e) if decided == Some(true) => {
                    matched += 1;
                    errors.add(None, e);
                }
                Validation::Failure(_) => {}
            }
        }

        if matched == 0 {
            return no_branch_matched(branches.len(), value, exhaustive);
        }
        errors.finish(Value::Object(merged))
    })
}

fn no_branch_matched(count: usize, value: &Value, exhaustive: bool) -> ValidationResult<Value> {
    if exhaustive {
        Validation::Failure(ParseErrors::single(
            ParseError::new(
                value.clone(),
                format!(
                    "The data did not match any of the {} conditional assertions",
                    count
                ),
            )
            .with_code("conditional_none_matched"),
        ))
    } else {
        Validation::Success(Value::Object(Map::new()))
    }
}

/// Applies the all-or-nothing validation rule to compiled branches.
///
/// Returns `Ok(None)` when no branch has a validator, `Ok(Some(..))` when all
/// do, and an error naming the unvalidated conditions otherwise.
pub fn require_uniform_coverage(
    branches: Vec<(String, Option<Validator>)>,
) -> Result<Option<Vec<ConditionalBranch>>, ConfigError> {
    let missing: Vec<String> = branches
        .iter()
        .filter(|(_, validator)| validator.is_none())
        .map(|(condition, _)| condition.clone())
        .collect();

    if missing.len() == branches.len() {
        return Ok(None);
    }
    if !missing.is_empty() {
        return Err(ConfigError::PartialBranchValidation { branches: missing });
    }

    Ok(Some(
        branches
            .into_iter()
            .filter_map(|(condition, validator)| {
                validator.map(|v| ConditionalBranch::new(condition, v))
            })
            .collect(),
    ))
}
