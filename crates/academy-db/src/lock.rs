//! # Store Locks
//!
//! Per-store reader/writer locks held for the life of a transaction.
//!
//! ## Lock Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Who Waits For Whom                             │
//! │                                                                         │
//! │                   │ RO on S held    │ RW on S held                      │
//! │  ─────────────────┼─────────────────┼─────────────────                  │
//! │  new RO on S      │ runs            │ waits                             │
//! │  new RW on S      │ waits           │ waits                             │
//! │                                                                         │
//! │  1. Store locks are taken in name order (no lock cycles)               │
//! │  2. RW transactions then take the database writer slot:                │
//! │     SQLite has one writer per file, and a second writer that had       │
//! │     already read would fail with BUSY instead of waiting               │
//! │  3. Everything is released when the transaction ends                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use crate::schema::{Schema, StoreDef};
use crate::transaction::TxMode;

/// One lock per registered store plus the writer slot.
#[derive(Debug)]
pub(crate) struct LockManager {
    stores: HashMap<&'static str, Arc<RwLock<()>>>,
    writer: Arc<Mutex<()>>,
}

/// Guards held by one transaction. Dropping releases them.
#[derive(Debug, Default)]
pub(crate) struct ScopeLocks {
    _shared: Vec<OwnedRwLockReadGuard<()>>,
    _exclusive: Vec<OwnedRwLockWriteGuard<()>>,
    _writer: Option<OwnedMutexGuard<()>>,
}

impl LockManager {
    pub(crate) fn new(schema: &'static Schema) -> Self {
        LockManager {
            stores: schema
                .stores
                .iter()
                .map(|s| (s.name, Arc::new(RwLock::new(()))))
                .collect(),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Waits for every lock the scope needs.
    ///
    /// `scope` must be sorted by name and free of duplicates.
    pub(crate) async fn acquire(&self, scope: &[&'static StoreDef], mode: TxMode) -> ScopeLocks {
        let mut held = ScopeLocks::default();

        for store in scope {
            // Every registered store has a lock; scope comes from the same registry.
            let Some(lock) = self.stores.get(store.name) else {
                continue;
            };
            match mode {
                TxMode::ReadOnly => held._shared.push(lock.clone().read_owned().await),
                TxMode::ReadWrite => held._exclusive.push(lock.clone().write_owned().await),
            }
        }

        if mode == TxMode::ReadWrite {
            held._writer = Some(self.writer.clone().lock_owned().await);
        }

        held
    }
}
