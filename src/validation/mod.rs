//! Validation Pipeline
//!
//! Checks a record before any node accepts it.
//!
//! ## Core Concepts
//! - **Rules**: Each `ValidationRule` inspects a single field and fails with its own error kind.
//! - **Pipeline**: `UserValidator` runs its rules in a fixed order (age, first name, last name)
//!   and stops at the first failure.
//! - **Purity**: Validation never touches node state, so it is safe to run on master and replica alike.

pub mod pipeline;
pub mod rules;

pub use pipeline::{UserValidator, Validator};
pub use rules::{AgeRule, FirstNameRule, LastNameRule, ValidationRule};
