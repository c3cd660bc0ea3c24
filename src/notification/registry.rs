use crate::error::{Result, StorageError};
use crate::storage::types::User;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

/// Observer of committed writes on a master.
///
/// Called synchronously after the write has been replayed on every replica,
/// while the master still holds its write gate. Callbacks may read the master
/// but must not write to it: a write from the callback's own thread is refused
/// with `OperationNotSupported`, and one handed to another thread and awaited
/// never completes.
pub trait Subscriber: Send + Sync {
    fn on_record_added(&self, user: &User);
    fn on_record_removed(&self, user: &User);
}

/// Ordered set of weak subscriber references.
///
/// Registering the same subscriber twice is a no-op.
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: Vec<Weak<dyn Subscriber>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Ok(false)` when `subscriber` was already registered.
    pub fn register(&mut self, subscriber: Weak<dyn Subscriber>) -> Result<bool> {
        if subscriber.strong_count() == 0 {
            return Err(StorageError::NullSubscriber);
        }
        self.prune();
        if self.position(&subscriber).is_some() {
            return Ok(false);
        }
        self.subscribers.push(subscriber);
        Ok(true)
    }

    /// Returns `Ok(false)` when `subscriber` was not registered.
    pub fn unregister(&mut self, subscriber: &Weak<dyn Subscriber>) -> Result<bool> {
        if subscriber.strong_count() == 0 {
            return Err(StorageError::NullSubscriber);
        }
        self.prune();
        match self.position(subscriber) {
            Some(index) => {
                self.subscribers.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Live subscribers.
    pub fn len(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|s| s.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify_added(&self, user: &User) {
        self.dispatch("on_record_added", |subscriber| {
            subscriber.on_record_added(user)
        });
    }

    pub fn notify_removed(&self, user: &User) {
        self.dispatch("on_record_removed", |subscriber| {
            subscriber.on_record_removed(user)
        });
    }

    fn dispatch<F>(&self, event: &str, call: F)
    where
        F: Fn(&Arc<dyn Subscriber>),
    {
        for (index, weak) in self.subscribers.iter().enumerate() {
            let Some(subscriber) = weak.upgrade() else {
                continue;
            };
            if catch_unwind(AssertUnwindSafe(|| call(&subscriber))).is_err() {
                tracing::error!("Subscriber #{} panicked in {}; continuing", index, event);
            }
        }
    }

    fn position(&self, subscriber: &Weak<dyn Subscriber>) -> Option<usize> {
        self.subscribers
            .iter()
            .position(|existing| Weak::ptr_eq(existing, subscriber))
    }

    fn prune(&mut self) {
        self.subscribers.retain(|s| s.strong_count() > 0);
    }
}
