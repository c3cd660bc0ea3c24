//! Replicated Record Storage
//!
//! Implements an in-memory directory of person records replicated from one master
//! to any number of replicas inside the same process.
//!
//! ## Core Concepts
//! - **Contract**: `UserStorage` is the single interface every node and decorator implements
//!   (count, add, remove and the search family).
//! - **Record set**: `RecordSet` holds one node's ordered records and the shared add/remove/search
//!   logic. Master and replica compose it instead of inheriting from a common base.
//! - **Replication**: The master commits locally, replays the write on each replica, then
//!   notifies subscribers. Replicas only accept writes that carry a master's `ReplayToken`.
//! - **Health**: Failed replays are tracked per replica; under the strict policy a diverged
//!   replica is skipped until it is re-synced from the master's snapshot.

pub mod id;
pub mod master;
pub mod records;
pub mod replica;
pub mod service;
pub mod types;

pub use id::{IdGenerator, UuidGenerator};
pub use master::{MasterStorage, ReplicaHealth};
pub use records::{RecordSet, SearchResults, UserQuery};
pub use replica::{Origin, ReplayToken, ReplicaStorage};
pub use service::UserStorage;
pub use types::{NodeId, NodeRole, User, UserId};
