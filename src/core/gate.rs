//! Per-repository serialization of mutating git commands.
//!
//! git takes `index.lock` for most writes, so two overlapping `git add` calls on the
//! same repository can fail with "Unable to create index.lock". The gate hands out one
//! async lock per repository path; read-only refreshes do not take it.

use crate::core::state::RepositoryHandle;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Held for the duration of one mutating sequence.
pub type GatePermit = OwnedMutexGuard<()>;

#[derive(Debug, Default)]
pub struct MutationGate {
    enabled: bool,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl MutationGate {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            locks: Mutex::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Wait for exclusive access to `repo`. Returns `None` when the gate is disabled.
    pub async fn acquire(&self, repo: &RepositoryHandle) -> Option<GatePermit> {
        if !self.enabled {
            return None;
        }

        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(
                locks
                    .entry(repo.path().to_path_buf())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };

        log::debug!("Waiting for mutation gate of {repo}");
        Some(lock.lock_owned().await)
    }
}
