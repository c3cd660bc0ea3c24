use super::records::{SearchResults, UserQuery};
use super::types::{NodeRole, User};
use crate::error::Result;

/// The store contract shared by master, replica and any decorator around them.
///
/// The search variants are conjunctions of exact field matches. They reject blank
/// names and non-positive ages before scanning and return an empty result when
/// nothing matches.
pub trait UserStorage: Send + Sync {
    fn role(&self) -> NodeRole;

    fn count(&self) -> usize;

    /// Validates and stores `user`, returning the stored record with its identifier.
    fn add(&self, user: User) -> Result<User>;

    /// Removes the record with the same identifier (or the same field values when
    /// `user` has none). `Ok(false)` when nothing matched.
    fn remove(&self, user: &User) -> Result<bool>;

    fn search(&self, query: &UserQuery) -> Result<SearchResults>;

    fn search_by_first_name(&self, first_name: &str) -> Result<SearchResults> {
        self.search(&UserQuery::new().first_name(first_name))
    }

    fn search_by_last_name(&self, last_name: &str) -> Result<SearchResults> {
        self.search(&UserQuery::new().last_name(last_name))
    }

    fn search_by_age(&self, age: i32) -> Result<SearchResults> {
        self.search(&UserQuery::new().age(age))
    }

    fn search_by_first_and_last_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<SearchResults> {
        self.search(&UserQuery::new().first_name(first_name).last_name(last_name))
    }

    fn search_by_first_name_and_age(&self, first_name: &str, age: i32) -> Result<SearchResults> {
        self.search(&UserQuery::new().first_name(first_name).age(age))
    }

    fn search_by_last_name_and_age(&self, last_name: &str, age: i32) -> Result<SearchResults> {
        self.search(&UserQuery::new().last_name(last_name).age(age))
    }

    fn search_by_full_name_and_age(
        &self,
        first_name: &str,
        last_name: &str,
        age: i32,
    ) -> Result<SearchResults> {
        self.search(
            &UserQuery::new()
                .first_name(first_name)
                .last_name(last_name)
                .age(age),
        )
    }
}

impl<S: UserStorage + ?Sized> UserStorage for std::sync::Arc<S> {
    fn role(&self) -> NodeRole {
        (**self).role()
    }

    fn count(&self) -> usize {
        (**self).count()
    }

    fn add(&self, user: User) -> Result<User> {
        (**self).add(user)
    }

    fn remove(&self, user: &User) -> Result<bool> {
        (**self).remove(user)
    }

    fn search(&self, query: &UserQuery) -> Result<SearchResults> {
        (**self).search(query)
    }

    fn search_by_first_name(&self, first_name: &str) -> Result<SearchResults> {
        (**self).search_by_first_name(first_name)
    }

    fn search_by_last_name(&self, last_name: &str) -> Result<SearchResults> {
        (**self).search_by_last_name(last_name)
    }

    fn search_by_age(&self, age: i32) -> Result<SearchResults> {
        (**self).search_by_age(age)
    }

    fn search_by_first_and_last_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<SearchResults> {
        (**self).search_by_first_and_last_name(first_name, last_name)
    }

    fn search_by_first_name_and_age(&self, first_name: &str, age: i32) -> Result<SearchResults> {
        (**self).search_by_first_name_and_age(first_name, age)
    }

    fn search_by_last_name_and_age(&self, last_name: &str, age: i32) -> Result<SearchResults> {
        (**self).search_by_last_name_and_age(last_name, age)
    }

    fn search_by_full_name_and_age(
        &self,
        first_name: &str,
        last_name: &str,
        age: i32,
    ) -> Result<SearchResults> {
        (**self).search_by_full_name_and_age(first_name, last_name, age)
    }
}
