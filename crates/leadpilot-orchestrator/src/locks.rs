// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-contact async mutexes.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Entry count above which [`ContactLocks::lock`] prunes idle entries first.
const DEFAULT_PRUNE_THRESHOLD: usize = 1024;

/// Serializes read-modify-write sequences on one contact's agent state.
///
/// Different contacts never contend. Entries are created on first use and
/// removed by [`ContactLocks::prune`] once nobody holds or waits on them.
/// `lock` also prunes on its own once the map grows past a threshold, so a
/// long-lived orchestrator keeps roughly one entry per contact in flight.
#[derive(Debug)]
pub struct ContactLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
    prune_threshold: usize,
}

impl Default for ContactLocks {
    fn default() -> Self {
        Self::with_prune_threshold(DEFAULT_PRUNE_THRESHOLD)
    }
}

impl ContactLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prune_threshold(prune_threshold: usize) -> Self {
        Self {
            locks: DashMap::new(),
            prune_threshold,
        }
    }

    /// Waits for and returns the contact's lock guard.
    pub async fn lock(&self, contact_id: &str) -> OwnedMutexGuard<()> {
        if self.locks.len() >= self.prune_threshold {
            self.prune();
        }
        // Clone the Arc out so the shard lock is released before awaiting.
        let mutex = self
            .locks
            .entry(contact_id.to_string())
            .or_default()
            .value()
            .clone();
        mutex.lock_owned().await
    }

    /// Drops lock entries nobody is using.
    pub fn prune(&self) {
        self.locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
