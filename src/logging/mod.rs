//! Call Logging
//!
//! `LoggingStorage` wraps any `UserStorage` and emits one `tracing` event per call
//! (target `user_storage::calls`) before delegating. Results and errors pass through
//! untouched. The switch can be flipped at runtime.

pub mod decorator;

pub use decorator::{CALL_TARGET, LoggingStorage};
