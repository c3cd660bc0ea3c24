//! Notification Module Tests
//!
//! ## Test Scopes
//! - **Registration**: Null, duplicate and unknown subscribers.
//! - **Dispatch**: Registration order, dropped subscribers, panic containment.

#[cfg(test)]
mod tests {
    use crate::error::StorageError;
    use crate::notification::{Subscriber, SubscriberRegistry};
    use crate::storage::types::User;
    use parking_lot::Mutex;
    use std::sync::{Arc, Weak};

    /// Appends `<name>:<event>:<first name>` to a shared journal.
    struct Journal {
        name: &'static str,
        entries: Arc<Mutex<Vec<String>>>,
    }

    impl Subscriber for Journal {
        fn on_record_added(&self, user: &User) {
            self.entries
                .lock()
                .push(format!("{}:added:{}", self.name, user.first_name));
        }

        fn on_record_removed(&self, user: &User) {
            self.entries
                .lock()
                .push(format!("{}:removed:{}", self.name, user.first_name));
        }
    }

    struct Panicking;

    impl Subscriber for Panicking {
        fn on_record_added(&self, _user: &User) {
            panic!("subscriber failure");
        }

        fn on_record_removed(&self, _user: &User) {
            panic!("subscriber failure");
        }
    }

    fn journal(name: &'static str, entries: &Arc<Mutex<Vec<String>>>) -> Arc<dyn Subscriber> {
        Arc::new(Journal {
            name,
            entries: entries.clone(),
        })
    }

    // ============================================================
    // REGISTRATION TESTS
    // ============================================================

    #[test]
    fn test_register_rejects_dropped_subscriber() {
        let mut registry = SubscriberRegistry::new();
        let dangling: Weak<dyn Subscriber> = Weak::<Panicking>::new();

        assert_eq!(
            registry.register(dangling.clone()),
            Err(StorageError::NullSubscriber)
        );
        assert_eq!(
            registry.unregister(&dangling),
            Err(StorageError::NullSubscriber)
        );
    }

    #[test]
    fn test_register_is_idempotent() {
        let entries = Arc::new(Mutex::new(Vec::new()));
        let subscriber = journal("a", &entries);
        let mut registry = SubscriberRegistry::new();

        assert_eq!(registry.register(Arc::downgrade(&subscriber)), Ok(true));
        assert_eq!(registry.register(Arc::downgrade(&subscriber)), Ok(false));
        assert_eq!(registry.len(), 1);

        registry.notify_added(&User::new("Ann", "Lee", 30));
        assert_eq!(entries.lock().len(), 1, "Duplicate must not double-notify");
    }

    #[test]
    fn test_unregister() {
        let entries = Arc::new(Mutex::new(Vec::new()));
        let subscriber = journal("a", &entries);
        let weak = Arc::downgrade(&subscriber);
        let mut registry = SubscriberRegistry::new();

        registry.register(weak.clone()).unwrap();
        assert_eq!(registry.unregister(&weak), Ok(true));
        assert_eq!(registry.unregister(&weak), Ok(false));
        assert!(registry.is_empty());

        registry.notify_added(&User::new("Ann", "Lee", 30));
        assert!(entries.lock().is_empty());
    }

    // ============================================================
    // DISPATCH TESTS
    // ============================================================

    #[test]
    fn test_dispatch_in_registration_order() {
        let entries = Arc::new(Mutex::new(Vec::new()));
        let first = journal("first", &entries);
        let second = journal("second", &entries);
        let mut registry = SubscriberRegistry::new();
        registry.register(Arc::downgrade(&first)).unwrap();
        registry.register(Arc::downgrade(&second)).unwrap();

        let user = User::new("Ann", "Lee", 30);
        registry.notify_added(&user);
        registry.notify_removed(&user);

        assert_eq!(
            *entries.lock(),
            vec![
                "first:added:Ann",
                "second:added:Ann",
                "first:removed:Ann",
                "second:removed:Ann",
            ]
        );
    }

    #[test]
    fn test_dropped_subscriber_is_skipped() {
        let entries = Arc::new(Mutex::new(Vec::new()));
        let kept = journal("kept", &entries);
        let dropped = journal("dropped", &entries);
        let mut registry = SubscriberRegistry::new();
        registry.register(Arc::downgrade(&dropped)).unwrap();
        registry.register(Arc::downgrade(&kept)).unwrap();

        drop(dropped);
        assert_eq!(registry.len(), 1);

        registry.notify_added(&User::new("Ann", "Lee", 30));
        assert_eq!(*entries.lock(), vec!["kept:added:Ann"]);
    }

    #[test]
    fn test_panicking_subscriber_is_contained() {
        let entries = Arc::new(Mutex::new(Vec::new()));
        let broken: Arc<dyn Subscriber> = Arc::new(Panicking);
        let healthy = journal("healthy", &entries);
        let mut registry = SubscriberRegistry::new();
        registry.register(Arc::downgrade(&broken)).unwrap();
        registry.register(Arc::downgrade(&healthy)).unwrap();

        registry.notify_added(&User::new("Ann", "Lee", 30));

        assert_eq!(*entries.lock(), vec!["healthy:added:Ann"]);
    }
}
