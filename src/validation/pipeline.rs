use super::rules::{AgeRule, FirstNameRule, LastNameRule, ValidationRule};
use crate::config::StorageConfig;
use crate::error::ValidationError;
use crate::storage::types::User;

/// Whole-record validation as seen by a node.
pub trait Validator: Send + Sync {
    /// Validates a possibly absent record. `None` fails with `NullRecord`
    /// before any rule runs.
    fn validate(&self, user: Option<&User>) -> Result<(), ValidationError>;
}

/// Ordered, fail-fast list of rules.
pub struct UserValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl UserValidator {
    /// The standard pipeline: age, then first name, then last name.
    pub fn new() -> Self {
        Self::with_age_rule(AgeRule::default())
    }

    /// Standard pipeline with the age bounds taken from `config`.
    ///
    /// The lower bound never drops below 1, even for a hand-built config that
    /// skipped `StorageConfig::validate`.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::with_age_rule(AgeRule {
            min: config.min_age.max(1),
            max: config.max_age,
        })
    }

    fn with_age_rule(age: AgeRule) -> Self {
        Self::with_rules(vec![
            Box::new(age),
            Box::new(FirstNameRule),
            Box::new(LastNameRule),
        ])
    }

    /// A pipeline running exactly `rules`, in the given order.
    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for UserValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for UserValidator {
    fn validate(&self, user: Option<&User>) -> Result<(), ValidationError> {
        let user = user.ok_or(ValidationError::NullRecord)?;
        for rule in &self.rules {
            rule.check(user)?;
        }
        Ok(())
    }
}
