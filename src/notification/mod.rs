//! Change Notification
//!
//! Lets external observers follow the master's committed writes.
//!
//! ## Core Concepts
//! - **Subscriber**: Two callbacks, one per committed add and one per committed remove.
//! - **Registry**: An ordered list of weak subscriber references owned by the master.
//!   The master never keeps a subscriber alive; dropped subscribers are pruned lazily.
//! - **Containment**: A panicking subscriber is logged and skipped so it cannot break
//!   the master's commit path or starve later subscribers.

pub mod registry;

pub use registry::{Subscriber, SubscriberRegistry};

#[cfg(test)]
mod tests;
