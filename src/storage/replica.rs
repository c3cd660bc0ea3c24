use super::records::{RecordSet, SearchResults, UserQuery};
use super::service::UserStorage;
use super::types::{NodeId, NodeRole, User};
use crate::config::StorageConfig;
use crate::error::{Result, StorageError};
use crate::validation::{UserValidator, Validator};
use parking_lot::RwLock;
use std::sync::Arc;

/// Proof that a write is being replayed by a master.
///
/// Only a master can mint one, and a replica additionally checks that the
/// token names the master it is bound to.
#[derive(Debug)]
pub struct ReplayToken {
    master: NodeId,
}

impl ReplayToken {
    pub(super) fn issue(master: &NodeId) -> Self {
        Self {
            master: master.clone(),
        }
    }

    pub fn master(&self) -> &NodeId {
        &self.master
    }
}

/// Who initiated a mutating call into a replica.
#[derive(Debug, Clone, Copy)]
pub enum Origin<'a> {
    External,
    Master(&'a ReplayToken),
}

/// Passive mirror of a master.
///
/// Reads behave like any store. Writes are only accepted when they carry a
/// `ReplayToken` from the master the replica is bound to; the public
/// `UserStorage` write path always refuses. A replica is bound to at most one
/// master at a time, from attach until detach.
pub struct ReplicaStorage {
    id: NodeId,
    owner: RwLock<Option<NodeId>>,
    records: RwLock<RecordSet>,
    validator: Box<dyn Validator>,
}

impl ReplicaStorage {
    pub fn new() -> Self {
        Self::with_validator(UserValidator::new())
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::with_validator(UserValidator::from_config(config))
    }

    pub fn with_validator(validator: impl Validator + 'static) -> Self {
        Self {
            id: NodeId::new(),
            owner: RwLock::new(None),
            records: RwLock::new(RecordSet::new()),
            validator: Box::new(validator),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn snapshot(&self) -> Arc<Vec<User>> {
        self.records.read().snapshot()
    }

    /// The master this replica currently mirrors, if any.
    pub fn owner(&self) -> Option<NodeId> {
        self.owner.read().clone()
    }

    /// Binds the replica to `master`. Fails if another master already owns it.
    pub(super) fn bind_owner(&self, master: &NodeId) -> Result<()> {
        let mut owner = self.owner.write();
        if let Some(current) = owner.as_ref()
            && current != master
        {
            tracing::warn!(
                "Replica {} refused attach by {}: owned by {}",
                self.id,
                master,
                current
            );
            return Err(StorageError::OperationNotSupported {
                role: NodeRole::Replica,
                operation: "attach",
            });
        }
        *owner = Some(master.clone());
        Ok(())
    }

    /// Clears the binding if `master` holds it.
    pub(super) fn release_owner(&self, master: &NodeId) {
        let mut owner = self.owner.write();
        if owner.as_ref() == Some(master) {
            *owner = None;
        }
    }

    /// Stores a record committed by a master, keeping its identifier.
    pub fn apply_add(&self, user: User, origin: Origin<'_>) -> Result<User> {
        let token = self.authorize(origin, "add")?;
        let stored = self
            .records
            .write()
            .insert_replicated(user, self.validator.as_ref())?;
        tracing::debug!(
            "Replica {} applied add of {:?} from master {}",
            self.id,
            stored.id,
            token.master()
        );
        Ok(stored)
    }

    pub fn apply_remove(&self, user: &User, origin: Origin<'_>) -> Result<bool> {
        let token = self.authorize(origin, "remove")?;
        let removed = self.records.write().remove(user).is_some();
        tracing::debug!(
            "Replica {} applied remove of {:?} from master {} (found={})",
            self.id,
            user.id,
            token.master(),
            removed
        );
        Ok(removed)
    }

    /// Replaces the replica's content with `records`, validating each one.
    /// On failure the previous content is kept.
    pub fn apply_resync(&self, records: &[User], token: &ReplayToken) -> Result<()> {
        self.authorize(Origin::Master(token), "resync")?;
        let mut rebuilt = RecordSet::new();
        for user in records {
            rebuilt.insert_replicated(user.clone(), self.validator.as_ref())?;
        }
        *self.records.write() = rebuilt;
        tracing::info!(
            "Replica {} re-synced {} records from master {}",
            self.id,
            records.len(),
            token.master()
        );
        Ok(())
    }

    fn authorize<'a>(&self, origin: Origin<'a>, operation: &'static str) -> Result<&'a ReplayToken> {
        match origin {
            Origin::Master(token) if self.owner.read().as_ref() == Some(token.master()) => {
                Ok(token)
            }
            Origin::Master(token) => {
                tracing::warn!(
                    "Replica {} refused {} replayed by foreign master {}",
                    self.id,
                    operation,
                    token.master()
                );
                Err(StorageError::OperationNotSupported {
                    role: NodeRole::Replica,
                    operation,
                })
            }
            Origin::External => {
                tracing::warn!("Replica {} refused external {}", self.id, operation);
                Err(StorageError::OperationNotSupported {
                    role: NodeRole::Replica,
                    operation,
                })
            }
        }
    }
}

impl Default for ReplicaStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStorage for ReplicaStorage {
    fn role(&self) -> NodeRole {
        NodeRole::Replica
    }

    fn count(&self) -> usize {
        self.records.read().len()
    }

    fn add(&self, user: User) -> Result<User> {
        self.apply_add(user, Origin::External)
    }

    fn remove(&self, user: &User) -> Result<bool> {
        self.apply_remove(user, Origin::External)
    }

    fn search(&self, query: &UserQuery) -> Result<SearchResults> {
        self.records.read().search(query)
    }
}
