use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique identifier of a stored record.
///
/// Assigned once by the master that commits the record and never changed afterwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a node, used in logs and replica health bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of a node, fixed at construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeRole {
    Master,
    Replica,
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRole::Master => write!(f, "master"),
            NodeRole::Replica => write!(f, "replica"),
        }
    }
}

/// A person record.
///
/// Before an identifier is assigned two records are equal when all their fields
/// are equal. Once stored, removal and lookup go through `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
}

impl User {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, age: i32) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            age,
        }
    }

    /// Whether `other` denotes the same stored record.
    ///
    /// Compares identifiers when `self` has one, field values otherwise.
    pub fn same_record(&self, other: &User) -> bool {
        match self.id {
            Some(id) => other.id == Some(id),
            None => {
                self.first_name == other.first_name
                    && self.last_name == other.last_name
                    && self.age == other.age
            }
        }
    }
}
