pub mod admin;
pub mod auth;
pub mod channels;
pub mod dms;
pub mod messages;
pub mod notifications;
pub mod persist;
pub mod scheduler;
pub mod search;
pub mod snapshot;
pub mod standups;
pub mod stats;
pub mod users;

use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use loft_types::{LoftError, Result};

use crate::persist::{MemoryBackend, SnapshotBackend};
use crate::scheduler::Scheduler;
use crate::snapshot::Workspace;

/// Single source of truth for the whole workspace. One lock makes each
/// logical operation atomic; the full snapshot is persisted after every
/// successful mutation.
pub struct Store {
    state: Mutex<Workspace>,
    backend: Box<dyn SnapshotBackend>,
    scheduler: Scheduler,
}

impl Store {
    /// Load the snapshot from the backend, or start empty.
    pub fn open(backend: Box<dyn SnapshotBackend>) -> anyhow::Result<Self> {
        let state = match backend.load()? {
            Some(ws) => {
                tracing::info!(
                    users = ws.users.len(),
                    channels = ws.channels.len(),
                    dms = ws.dms.len(),
                    "Loaded workspace snapshot"
                );
                ws
            }
            None => Workspace::new(now()),
        };

        Ok(Self {
            state: Mutex::new(state),
            backend,
            scheduler: Scheduler::new(),
        })
    }

    /// Fresh store with a throwaway backend. Used by tests.
    pub fn open_in_memory() -> Self {
        Self {
            state: Mutex::new(Workspace::new(now())),
            backend: Box::new(MemoryBackend::default()),
            scheduler: Scheduler::new(),
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    fn lock(&self) -> Result<MutexGuard<'_, Workspace>> {
        self.state
            .lock()
            .map_err(|e| LoftError::Internal(anyhow!("store lock poisoned: {e}")))
    }

    /// Run a read-only operation under the store lock.
    pub(crate) fn read<T>(&self, f: impl FnOnce(&Workspace) -> Result<T>) -> Result<T> {
        let ws = self.lock()?;
        f(&ws)
    }

    /// Run a mutation under the store lock and persist the snapshot on
    /// success. If the save fails the in-memory mutation stands.
    pub(crate) fn write<T>(&self, f: impl FnOnce(&mut Workspace) -> Result<T>) -> Result<T> {
        let mut ws = self.lock()?;
        let out = f(&mut ws)?;
        self.backend.save(&ws)?;
        Ok(out)
    }
}

/// Current wall-clock time in unix seconds.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
