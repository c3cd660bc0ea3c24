use super::id::{IdGenerator, UuidGenerator};
use super::records::{RecordSet, SearchResults, UserQuery};
use super::replica::{Origin, ReplayToken, ReplicaStorage};
use super::service::UserStorage;
use super::types::{NodeId, NodeRole, User};
use crate::config::{ReplicationPolicy, StorageConfig};
use crate::error::{Result, StorageError};
use crate::notification::{Subscriber, SubscriberRegistry};
use crate::validation::{UserValidator, Validator};

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

/// Replication bookkeeping for one attached replica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaHealth {
    /// False once a replay failed under `ReplicationPolicy::Strict`, until re-synced.
    pub in_sync: bool,
    pub failed_replays: u64,
    pub last_error: Option<String>,
}

impl Default for ReplicaHealth {
    fn default() -> Self {
        Self {
            in_sync: true,
            failed_replays: 0,
            last_error: None,
        }
    }
}

/// Single-writer lock that remembers which thread holds it.
///
/// Subscribers run inside the gate, so a callback that writes back to the
/// master would wait on itself. `enter` refuses that case instead of blocking.
struct WriteGate {
    lock: Mutex<()>,
    holder: Mutex<Option<ThreadId>>,
}

struct GateGuard<'a> {
    gate: &'a WriteGate,
    _lock: MutexGuard<'a, ()>,
}

impl WriteGate {
    fn new() -> Self {
        Self {
            lock: Mutex::new(()),
            holder: Mutex::new(None),
        }
    }

    /// Blocks until the gate is free. `None` if the calling thread already holds it.
    fn enter(&self) -> Option<GateGuard<'_>> {
        let me = thread::current().id();
        if *self.holder.lock() == Some(me) {
            return None;
        }
        let lock = self.lock.lock();
        *self.holder.lock() = Some(me);
        Some(GateGuard { gate: self, _lock: lock })
    }
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        *self.gate.holder.lock() = None;
    }
}

/// The authoritative node.
///
/// A committed write is replayed on every attached replica, in attachment order,
/// and then announced to every subscriber, in registration order. The whole
/// sequence runs under a single write gate so concurrent writers cannot interleave
/// their fan-out. A subscriber writing back to the master from its callback is
/// refused with `OperationNotSupported`. Readers only take the record lock and therefore observe either
/// the state before or after a write.
///
/// Replication is best-effort: a failed replay is logged and recorded in the
/// replica's `ReplicaHealth` but never rolls back the master's own commit.
pub struct MasterStorage {
    id: NodeId,
    write_gate: WriteGate,
    records: RwLock<RecordSet>,
    replicas: RwLock<Vec<Arc<ReplicaStorage>>>,
    health: DashMap<NodeId, ReplicaHealth>,
    subscribers: RwLock<SubscriberRegistry>,
    validator: Box<dyn Validator>,
    ids: Box<dyn IdGenerator>,
    policy: ReplicationPolicy,
    read_only: bool,
}

impl MasterStorage {
    /// A master with default configuration fanning out to `replicas`.
    pub fn new(replicas: Vec<Arc<ReplicaStorage>>) -> Self {
        Self::from_config(&StorageConfig::default(), replicas)
    }

    /// Replicas handed in here are reset to the master's (empty) state.
    pub fn from_config(config: &StorageConfig, replicas: Vec<Arc<ReplicaStorage>>) -> Self {
        let master = Self {
            id: NodeId::new(),
            write_gate: WriteGate::new(),
            records: RwLock::new(RecordSet::new()),
            replicas: RwLock::new(Vec::new()),
            health: DashMap::new(),
            subscribers: RwLock::new(SubscriberRegistry::new()),
            validator: Box::new(UserValidator::from_config(config)),
            ids: Box::new(UuidGenerator),
            policy: config.replication,
            read_only: config.read_only,
        };

        for replica in replicas {
            if let Err(e) = master.attach_replica(replica) {
                tracing::error!("Master {}: failed to attach replica: {}", master.id, e);
            }
        }

        master
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn policy(&self) -> ReplicationPolicy {
        self.policy
    }

    pub fn snapshot(&self) -> Arc<Vec<User>> {
        self.records.read().snapshot()
    }

    // ============================================================
    // REPLICAS
    // ============================================================

    /// Attaches `replica` after bringing it to the master's current content.
    ///
    /// Returns `Ok(false)` if it is already attached. A replica owned by another
    /// master is refused with `OperationNotSupported` and left untouched.
    pub fn attach_replica(&self, replica: Arc<ReplicaStorage>) -> Result<bool> {
        let _gate = self.enter_gate("attach")?;

        if self.replicas.read().iter().any(|r| r.id() == replica.id()) {
            return Ok(false);
        }

        replica.bind_owner(&self.id)?;
        let snapshot = self.snapshot();
        let token = ReplayToken::issue(&self.id);
        if let Err(e) = replica.apply_resync(&snapshot, &token) {
            replica.release_owner(&self.id);
            return Err(e);
        }

        self.health
            .insert(replica.id().clone(), ReplicaHealth::default());
        tracing::info!("Master {} attached replica {}", self.id, replica.id());
        self.replicas.write().push(replica);
        Ok(true)
    }

    /// Stops propagating to a replica and releases it for other masters.
    ///
    /// Returns `Ok(false)` if no such replica is attached.
    pub fn detach_replica(&self, replica_id: &NodeId) -> Result<bool> {
        let _gate = self.enter_gate("detach")?;
        let mut replicas = self.replicas.write();
        let Some(index) = replicas.iter().position(|r| r.id() == replica_id) else {
            return Ok(false);
        };
        let replica = replicas.remove(index);
        replica.release_owner(&self.id);
        self.health.remove(replica_id);
        tracing::info!("Master {} detached replica {}", self.id, replica_id);
        Ok(true)
    }

    /// Rebuilds a replica from the master's snapshot and marks it in sync.
    ///
    /// Returns `Ok(false)` if no such replica is attached.
    pub fn resync_replica(&self, replica_id: &NodeId) -> Result<bool> {
        let _gate = self.enter_gate("resync")?;

        let Some(replica) = self
            .replicas
            .read()
            .iter()
            .find(|r| r.id() == replica_id)
            .cloned()
        else {
            return Ok(false);
        };

        let snapshot = self.snapshot();
        let token = ReplayToken::issue(&self.id);
        replica.apply_resync(&snapshot, &token)?;

        if let Some(mut health) = self.health.get_mut(replica_id) {
            health.in_sync = true;
            health.last_error = None;
        }
        Ok(true)
    }

    pub fn replicas(&self) -> Vec<Arc<ReplicaStorage>> {
        self.replicas.read().clone()
    }

    /// Replicas whose content is known to mirror the master.
    pub fn in_sync_replicas(&self) -> Vec<Arc<ReplicaStorage>> {
        self.replicas
            .read()
            .iter()
            .filter(|r| self.is_in_sync(r.id()))
            .cloned()
            .collect()
    }

    pub fn replica_health(&self, replica_id: &NodeId) -> Option<ReplicaHealth> {
        self.health.get(replica_id).map(|h| h.value().clone())
    }

    fn is_in_sync(&self, replica_id: &NodeId) -> bool {
        self.health
            .get(replica_id)
            .map(|h| h.in_sync)
            .unwrap_or(false)
    }

    /// Replays one committed write on every eligible replica, in order.
    ///
    /// `apply` returns `Ok(false)` when the replica did not hold what it was
    /// expected to hold, which counts as a failed replay.
    fn propagate<F>(&self, operation: &str, apply: F)
    where
        F: Fn(&ReplicaStorage, Origin<'_>) -> Result<bool>,
    {
        let token = ReplayToken::issue(&self.id);

        for replica in self.replicas.read().iter() {
            if self.policy == ReplicationPolicy::Strict && !self.is_in_sync(replica.id()) {
                tracing::debug!(
                    "Skipping {} on diverged replica {}",
                    operation,
                    replica.id()
                );
                continue;
            }

            let failure = match apply(&**replica, Origin::Master(&token)) {
                Ok(true) => None,
                Ok(false) => Some("record missing on replica".to_string()),
                Err(e) => Some(e.to_string()),
            };

            if let Some(error) = failure {
                tracing::error!(
                    "Master {}: {} replay failed on replica {}: {}",
                    self.id,
                    operation,
                    replica.id(),
                    error
                );
                let mut health = self.health.entry(replica.id().clone()).or_default();
                health.failed_replays += 1;
                health.last_error = Some(error);
                if self.policy == ReplicationPolicy::Strict {
                    health.in_sync = false;
                }
            }
        }
    }

    // ============================================================
    // SUBSCRIBERS
    // ============================================================

    /// Registers a subscriber. Returns `Ok(false)` if it was already registered.
    pub fn add_subscriber(&self, subscriber: Weak<dyn Subscriber>) -> Result<bool> {
        let _gate = self.enter_gate("add_subscriber")?;
        self.subscribers.write().register(subscriber)
    }

    /// Unregisters a subscriber. Returns `Ok(false)` if it was not registered.
    pub fn remove_subscriber(&self, subscriber: &Weak<dyn Subscriber>) -> Result<bool> {
        let _gate = self.enter_gate("remove_subscriber")?;
        self.subscribers.write().unregister(subscriber)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Takes the write gate, refusing a write issued from inside a notification.
    fn enter_gate(&self, operation: &'static str) -> Result<GateGuard<'_>> {
        self.write_gate.enter().ok_or_else(|| {
            tracing::warn!(
                "Master {} refused re-entrant {} from a subscriber callback",
                self.id,
                operation
            );
            StorageError::OperationNotSupported {
                role: NodeRole::Master,
                operation,
            }
        })
    }

    fn ensure_writable(&self, operation: &'static str) -> Result<()> {
        if self.read_only {
            return Err(StorageError::OperationNotSupported {
                role: NodeRole::Master,
                operation,
            });
        }
        Ok(())
    }
}

impl UserStorage for MasterStorage {
    fn role(&self) -> NodeRole {
        NodeRole::Master
    }

    fn count(&self) -> usize {
        self.records.read().len()
    }

    fn add(&self, user: User) -> Result<User> {
        self.ensure_writable("add")?;
        let _gate = self.enter_gate("add")?;

        let stored = self
            .records
            .write()
            .insert_new(user, self.validator.as_ref(), self.ids.as_ref())?;
        tracing::info!("Master {} added record {:?}", self.id, stored.id);

        self.propagate("add", |replica, origin| {
            replica.apply_add(stored.clone(), origin).map(|_| true)
        });
        self.subscribers.read().notify_added(&stored);

        Ok(stored)
    }

    fn remove(&self, user: &User) -> Result<bool> {
        self.ensure_writable("remove")?;
        let _gate = self.enter_gate("remove")?;

        let Some(removed) = self.records.write().remove(user) else {
            tracing::debug!("Master {}: nothing to remove for {:?}", self.id, user.id);
            return Ok(false);
        };
        tracing::info!("Master {} removed record {:?}", self.id, removed.id);

        self.propagate("remove", |replica, origin| {
            replica.apply_remove(&removed, origin)
        });
        self.subscribers.read().notify_removed(&removed);

        Ok(true)
    }

    fn search(&self, query: &UserQuery) -> Result<SearchResults> {
        self.records.read().search(query)
    }
}
