//! Error types shared by every node.
//!
//! Validation failures carry the specific rule that rejected a record so callers
//! can branch on the reason. Everything else a store can refuse is a `StorageError`.

use crate::storage::types::{NodeRole, UserId};
use thiserror::Error;

/// Raised by the validation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("record is absent")]
    NullRecord,

    #[error("age {age} is out of range")]
    AgeOutOfRange { age: i32 },

    #[error("first name is empty or whitespace")]
    FirstNameEmpty,

    #[error("last name is empty or whitespace")]
    LastNameEmpty,
}

/// Field of a search predicate that was malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    FirstName,
    LastName,
    Age,
}

impl std::fmt::Display for SearchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchField::FirstName => write!(f, "first name"),
            SearchField::LastName => write!(f, "last name"),
            SearchField::Age => write!(f, "age"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{operation} is not supported on a {role} node without master provenance")]
    OperationNotSupported {
        role: NodeRole,
        operation: &'static str,
    },

    #[error("subscriber is absent or already dropped")]
    NullSubscriber,

    #[error("invalid search argument: {field}")]
    InvalidSearchArgument { field: SearchField },

    #[error("record {0} is already stored")]
    DuplicateIdentifier(UserId),

    #[error("replicated record has no identifier")]
    MissingIdentifier,
}

impl StorageError {
    /// Returns the validation failure wrapped by this error, if any.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            StorageError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
