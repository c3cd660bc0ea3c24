//! Replicated User Storage Library
//!
//! An in-memory directory of person records with pluggable validation,
//! master/replica propagation and change notification.
//! It serves as the foundation for the demo binary (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of loosely coupled subsystems:
//!
//! - **`storage`**: The record store contract, the shared record set, and the master and
//!   replica nodes. The master replays every committed write onto its replicas.
//! - **`validation`**: Field rules and the ordered, fail-fast validation pipeline.
//! - **`notification`**: Subscribers that want to hear about committed adds and removes.
//! - **`logging`**: A decorator that logs every store call without changing its outcome.
//! - **`config`**: Node configuration with defaults, loadable from JSON or the environment.
//! - **`error`**: Typed validation and storage errors.

pub mod config;
pub mod error;
pub mod logging;
pub mod notification;
pub mod storage;
pub mod validation;

pub use config::{ReplicationPolicy, StorageConfig};
pub use error::{Result, SearchField, StorageError, ValidationError};
