//! Shared handle for serving one governor to concurrent callers.
//!
//! Mutations are serialized behind the write lock; read-only queries share
//! the read lock and may run concurrently.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tally_types::{Address, ChainTime, SignatureVerifier};

use crate::error::GovernanceError;
use crate::governor::Governor;
use crate::proposal::{Proposal, ProposalState, Receipt};

pub struct SharedGovernor<V> {
    inner: Arc<RwLock<Governor<V>>>,
}

impl<V> Clone for SharedGovernor<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: SignatureVerifier> SharedGovernor<V> {
    pub fn new(governor: Governor<V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(governor)),
        }
    }

    /// Run a mutating operation under the write lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut Governor<V>) -> R) -> R {
        f(&mut *self.write_guard())
    }

    /// Run a query under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Governor<V>) -> R) -> R {
        f(&*self.read_guard())
    }

    pub fn state(&self, id: u64, now: ChainTime) -> Result<ProposalState, GovernanceError> {
        self.read(|g| g.state(id, now))
    }

    pub fn proposal(&self, id: u64) -> Result<Proposal, GovernanceError> {
        self.read(|g| g.proposal(id).cloned())
    }

    pub fn receipt(&self, id: u64, voter: &Address) -> Option<Receipt> {
        self.read(|g| g.receipt(id, voter).copied())
    }

    // Poison is ignored: a mutation commits only after every check passed.
    fn read_guard(&self) -> RwLockReadGuard<'_, Governor<V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Governor<V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
