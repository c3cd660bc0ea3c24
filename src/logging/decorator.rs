use crate::config::StorageConfig;
use crate::error::Result;
use crate::storage::{NodeRole, SearchResults, User, UserQuery, UserStorage};
use std::sync::atomic::{AtomicBool, Ordering};

/// `tracing` target of the per-call events.
pub const CALL_TARGET: &str = "user_storage::calls";

/// Transparent logging decorator over any store.
pub struct LoggingStorage<S> {
    inner: S,
    enabled: AtomicBool,
}

impl<S: UserStorage> LoggingStorage<S> {
    pub fn new(inner: S) -> Self {
        Self::with_switch(inner, true)
    }

    pub fn from_config(inner: S, config: &StorageConfig) -> Self {
        Self::with_switch(inner, config.logging_enabled)
    }

    pub fn with_switch(inner: S, enabled: bool) -> Self {
        Self {
            inner,
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn log_call(&self, method: &'static str) {
        if self.is_enabled() {
            tracing::info!(target: CALL_TARGET, method, role = %self.inner.role(), "{}() method is called", method);
        }
    }
}

impl<S: UserStorage> UserStorage for LoggingStorage<S> {
    fn role(&self) -> NodeRole {
        self.inner.role()
    }

    fn count(&self) -> usize {
        self.log_call("count");
        self.inner.count()
    }

    fn add(&self, user: User) -> Result<User> {
        self.log_call("add");
        self.inner.add(user)
    }

    fn remove(&self, user: &User) -> Result<bool> {
        self.log_call("remove");
        self.inner.remove(user)
    }

    fn search(&self, query: &UserQuery) -> Result<SearchResults> {
        self.log_call("search");
        self.inner.search(query)
    }

    fn search_by_first_name(&self, first_name: &str) -> Result<SearchResults> {
        self.log_call("search_by_first_name");
        self.inner.search_by_first_name(first_name)
    }

    fn search_by_last_name(&self, last_name: &str) -> Result<SearchResults> {
        self.log_call("search_by_last_name");
        self.inner.search_by_last_name(last_name)
    }

    fn search_by_age(&self, age: i32) -> Result<SearchResults> {
        self.log_call("search_by_age");
        self.inner.search_by_age(age)
    }

    fn search_by_first_and_last_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<SearchResults> {
        self.log_call("search_by_first_and_last_name");
        self.inner.search_by_first_and_last_name(first_name, last_name)
    }

    fn search_by_first_name_and_age(&self, first_name: &str, age: i32) -> Result<SearchResults> {
        self.log_call("search_by_first_name_and_age");
        self.inner.search_by_first_name_and_age(first_name, age)
    }

    fn search_by_last_name_and_age(&self, last_name: &str, age: i32) -> Result<SearchResults> {
        self.log_call("search_by_last_name_and_age");
        self.inner.search_by_last_name_and_age(last_name, age)
    }

    fn search_by_full_name_and_age(
        &self,
        first_name: &str,
        last_name: &str,
        age: i32,
    ) -> Result<SearchResults> {
        self.log_call("search_by_full_name_and_age");
        self.inner.search_by_full_name_and_age(first_name, last_name, age)
    }
}
