use crate::error::ValidationError;
use crate::storage::types::User;

/// A check over a single field of a record.
pub trait ValidationRule: Send + Sync {
    fn check(&self, user: &User) -> Result<(), ValidationError>;
}

/// Rejects ages below `min`, and above `max` when one is configured.
#[derive(Debug, Clone, Copy)]
pub struct AgeRule {
    pub min: i32,
    pub max: Option<i32>,
}

impl Default for AgeRule {
    fn default() -> Self {
        Self { min: 1, max: None }
    }
}

impl ValidationRule for AgeRule {
    fn check(&self, user: &User) -> Result<(), ValidationError> {
        let too_old = self.max.is_some_and(|max| user.age > max);
        if user.age < self.min || too_old {
            return Err(ValidationError::AgeOutOfRange { age: user.age });
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FirstNameRule;

impl ValidationRule for FirstNameRule {
    fn check(&self, user: &User) -> Result<(), ValidationError> {
        if is_blank(&user.first_name) {
            return Err(ValidationError::FirstNameEmpty);
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LastNameRule;

impl ValidationRule for LastNameRule {
    fn check(&self, user: &User) -> Result<(), ValidationError> {
        if is_blank(&user.last_name) {
            return Err(ValidationError::LastNameEmpty);
        }
        Ok(())
    }
}

/// Empty or whitespace-only.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
