//! Mutual exclusion for balance mutations.
//!
//! Waiters are admitted strictly in the order they started waiting: the gate is a
//! [`tokio::sync::Mutex`], whose lock queue is first-in first-out. Holding a [`MutationPermit`] is
//! the only way to be inside the critical section, and dropping it hands the gate to the next
//! waiter on every exit path.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::config::GateMode;

/// Scoped ownership of the gate
///
/// The gate is released when the permit is dropped.
#[derive(Debug)]
pub struct MutationPermit {
    _guard: OwnedMutexGuard<()>,
}

#[derive(Debug, thiserror::Error)]
#[error("gate still held after waiting {0:?}")]
pub struct Busy(pub Duration);

#[derive(Debug)]
enum Scope {
    Global(Arc<Mutex<()>>),
    PerUser(DashMap<Uuid, Arc<Mutex<()>>>),
}

/// FIFO gate admitting one mutation at a time
///
/// The gate is not reentrant: acquiring it again while holding a permit for the same scope never
/// completes (or fails with [`Busy`] when a timeout is set).
#[derive(Debug)]
pub struct MutationGate {
    scope: Scope,
    timeout: Option<Duration>,
}

impl MutationGate {
    pub fn new(mode: GateMode, timeout: Option<Duration>) -> Self {
        let scope = match mode {
            GateMode::Global => Scope::Global(Arc::default()),
            GateMode::PerUser => Scope::PerUser(DashMap::new()),
        };

        Self { scope, timeout }
    }

    /// Gate shared by every user
    pub fn global() -> Self {
        Self::new(GateMode::Global, None)
    }

    /// Wait until the caller is the sole holder for `user_id`
    ///
    /// In global mode `user_id` is ignored and every caller queues on the same gate.
    pub async fn acquire(&self, user_id: Uuid) -> Result<MutationPermit, Busy> {
        let mutex = match &self.scope {
            Scope::Global(mutex) => mutex.clone(),
            // The map shard lock is released before waiting on the user gate
            Scope::PerUser(gates) => gates.entry(user_id).or_default().value().clone(),
        };

        let guard = match self.timeout {
            None => mutex.lock_owned().await,
            Some(timeout) => tokio::time::timeout(timeout, mutex.lock_owned())
                .await
                .map_err(|_| Busy(timeout))?,
        };
        tracing::trace!(%user_id, "mutation gate acquired");

        Ok(MutationPermit { _guard: guard })
    }
}

impl Default for MutationGate {
    fn default() -> Self {
        Self::global()
    }
}
