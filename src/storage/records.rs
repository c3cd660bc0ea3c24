use super::id::IdGenerator;
use super::types::{User, UserId};
use crate::error::{Result, SearchField, StorageError};
use crate::validation::Validator;
use crate::validation::rules::is_blank;
use std::sync::Arc;

/// The ordered record sequence owned by one node, plus the shared add/remove logic.
///
/// The sequence sits behind an `Arc` so readers can take a snapshot in O(1) and
/// iterate it lazily while writers copy-on-write.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Arc<Vec<User>>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn snapshot(&self) -> Arc<Vec<User>> {
        Arc::clone(&self.records)
    }

    /// Validates `user`, assigns a fresh identifier and appends it.
    /// Any caller supplied identifier is overwritten.
    pub fn insert_new(
        &mut self,
        mut user: User,
        validator: &dyn Validator,
        ids: &dyn IdGenerator,
    ) -> Result<User> {
        validator.validate(Some(&user))?;
        let mut id = ids.generate();
        while self.contains_id(id) {
            id = ids.generate();
        }
        user.id = Some(id);
        Arc::make_mut(&mut self.records).push(user.clone());
        Ok(user)
    }

    /// Appends a record committed elsewhere, keeping its identifier.
    /// Still validated: a node never holds an invalid record.
    pub fn insert_replicated(&mut self, user: User, validator: &dyn Validator) -> Result<User> {
        validator.validate(Some(&user))?;
        let id = user.id.ok_or(StorageError::MissingIdentifier)?;
        if self.contains_id(id) {
            return Err(StorageError::DuplicateIdentifier(id));
        }
        Arc::make_mut(&mut self.records).push(user.clone());
        Ok(user)
    }

    /// Removes the first record matching `user` and returns it.
    pub fn remove(&mut self, user: &User) -> Option<User> {
        let index = self.records.iter().position(|stored| user.same_record(stored))?;
        Some(Arc::make_mut(&mut self.records).remove(index))
    }

    /// Replaces the whole sequence.
    pub fn reset(&mut self, records: Arc<Vec<User>>) {
        self.records = records;
    }

    fn contains_id(&self, id: UserId) -> bool {
        self.records.iter().any(|stored| stored.id == Some(id))
    }

    pub fn search(&self, query: &UserQuery) -> Result<SearchResults> {
        query.check()?;
        Ok(SearchResults {
            snapshot: self.snapshot(),
            query: query.clone(),
        })
    }
}

/// Conjunctive search predicate. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
}

impl UserQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn age(mut self, age: i32) -> Self {
        self.age = Some(age);
        self
    }

    /// Rejects blank names and non-positive ages, in first name, last name, age order.
    pub fn check(&self) -> Result<()> {
        if self.first_name.as_deref().is_some_and(is_blank) {
            return Err(StorageError::InvalidSearchArgument {
                field: SearchField::FirstName,
            });
        }
        if self.last_name.as_deref().is_some_and(is_blank) {
            return Err(StorageError::InvalidSearchArgument {
                field: SearchField::LastName,
            });
        }
        if self.age.is_some_and(|age| age < 1) {
            return Err(StorageError::InvalidSearchArgument {
                field: SearchField::Age,
            });
        }
        Ok(())
    }

    pub fn matches(&self, user: &User) -> bool {
        self.first_name.as_ref().is_none_or(|v| *v == user.first_name)
            && self.last_name.as_ref().is_none_or(|v| *v == user.last_name)
            && self.age.is_none_or(|v| v == user.age)
    }
}

/// Lazily filtered view over a snapshot of a node's records.
///
/// Iterating does the matching; the view can be iterated any number of times
/// and always yields the same sequence, in insertion order.
#[derive(Debug, Clone)]
pub struct SearchResults {
    snapshot: Arc<Vec<User>>,
    query: UserQuery,
}

impl SearchResults {
    pub fn iter(&self) -> impl Iterator<Item = &User> + '_ {
        self.snapshot.iter().filter(|user| self.query.matches(user))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn to_vec(&self) -> Vec<User> {
        self.iter().cloned().collect()
    }

    pub fn query(&self) -> &UserQuery {
        &self.query
    }
}

impl<'a> IntoIterator for &'a SearchResults {
    type Item = &'a User;
    type IntoIter = Box<dyn Iterator<Item = &'a User> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
