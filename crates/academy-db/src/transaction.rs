//! # Transactions
//!
//! A transaction is the unit of isolation and the unit of failure: it is
//! opened over a named set of stores, every operation on it applies in
//! issue order, and either all of them become visible at `commit` or none.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  db.transaction(&["articles", "settings"], TxMode::ReadWrite)           │
//! │       │                                                                 │
//! │       ├── validate store names against the registry                    │
//! │       ├── acquire store locks (+ writer slot for ReadWrite)            │
//! │       └── BEGIN                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tx.count / get / get_all / get_from_index / put / delete ...          │
//! │       │                                                                 │
//! │       ├── tx.commit()  ──► COMMIT, locks released                      │
//! │       ├── tx.abort()   ──► ROLLBACK, locks released                    │
//! │       └── drop(tx)     ──► ROLLBACK, locks released                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! `get_all` and the index lookups return records by ascending key;
//! `get_from_index` returns the first of those.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::Sqlite;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::lock::ScopeLocks;
use crate::schema::{StoreDef, SCHEMA};

/// Transaction access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Reads only. Runs alongside other readers of the same stores.
    ReadOnly,
    /// Reads and writes. Exclusive over its stores.
    ReadWrite,
}

/// An open transaction over a fixed set of stores.
///
/// Field order matters: the SQLite transaction is dropped (rolled back)
/// before the locks are released.
pub struct Transaction {
    tx: sqlx::Transaction<'static, Sqlite>,
    scope: Vec<&'static StoreDef>,
    mode: TxMode,
    _locks: ScopeLocks,
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("stores", &self.store_names())
            .field("mode", &self.mode)
            .finish()
    }
}

impl Transaction {
    pub(crate) fn new(
        tx: sqlx::Transaction<'static, Sqlite>,
        scope: Vec<&'static StoreDef>,
        mode: TxMode,
        locks: ScopeLocks,
    ) -> Self {
        Transaction {
            tx,
            scope,
            mode,
            _locks: locks,
        }
    }

    /// Names of the stores this transaction covers, sorted.
    pub fn store_names(&self) -> Vec<&'static str> {
        self.scope.iter().map(|s| s.name).collect()
    }

    // =========================================================================
    // Scope Checks
    // =========================================================================

    fn store(&self, name: &str) -> DbResult<&'static StoreDef> {
        let def = SCHEMA.store(name)?;
        if self.scope.iter().any(|s| s.name == def.name) {
            Ok(def)
        } else {
            Err(DbError::StoreNotInScope {
                store: name.to_string(),
            })
        }
    }

    fn writable_store(&self, name: &str) -> DbResult<&'static StoreDef> {
        let def = self.store(name)?;
        if self.mode == TxMode::ReadOnly {
            return Err(DbError::ReadOnlyTransaction {
                store: name.to_string(),
            });
        }
        Ok(def)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Point lookup by primary key. `None` when absent.
    pub async fn get<T: DeserializeOwned>(&mut self, store: &str, key: &str) -> DbResult<Option<T>> {
        let def = self.store(store)?;
        let sql = format!("SELECT doc FROM {} WHERE pk = ?1", def.table());

        let doc: Option<String> = sqlx::query_scalar(&sql)
            .bind(key)
            .fetch_optional(&mut *self.tx)
            .await?;

        doc.map(|d| decode(def, &d)).transpose()
    }

    /// Every record in the store.
    pub async fn get_all<T: DeserializeOwned>(&mut self, store: &str) -> DbResult<Vec<T>> {
        let def = self.store(store)?;
        let sql = format!("SELECT doc FROM {} ORDER BY pk", def.table());

        let docs: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&mut *self.tx).await?;
        docs.iter().map(|d| decode(def, d)).collect()
    }

    /// First record whose index value equals `value`.
    ///
    /// Only meaningful for unique indexes; on a non-unique index this is
    /// the match with the smallest key.
    pub async fn get_from_index<T: DeserializeOwned>(
        &mut self,
        store: &str,
        index: &str,
        value: &str,
    ) -> DbResult<Option<T>> {
        let def = self.store(store)?;
        let column = def.index(index)?.column();
        let sql = format!(
            "SELECT doc FROM {} WHERE {column} = ?1 ORDER BY pk LIMIT 1",
            def.table()
        );

        let doc: Option<String> = sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_optional(&mut *self.tx)
            .await?;

        doc.map(|d| decode(def, &d)).transpose()
    }

    /// Every record whose index value equals `value`.
    pub async fn get_all_from_index<T: DeserializeOwned>(
        &mut self,
        store: &str,
        index: &str,
        value: &str,
    ) -> DbResult<Vec<T>> {
        let def = self.store(store)?;
        let column = def.index(index)?.column();
        let sql = format!("SELECT doc FROM {} WHERE {column} = ?1 ORDER BY pk", def.table());

        let docs: Vec<String> = sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_all(&mut *self.tx)
            .await?;
        docs.iter().map(|d| decode(def, d)).collect()
    }

    /// Primary keys of every record whose index value equals `value`.
    pub async fn get_all_keys_from_index(
        &mut self,
        store: &str,
        index: &str,
        value: &str,
    ) -> DbResult<Vec<String>> {
        let def = self.store(store)?;
        let column = def.index(index)?.column();
        let sql = format!("SELECT pk FROM {} WHERE {column} = ?1 ORDER BY pk", def.table());

        Ok(sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_all(&mut *self.tx)
            .await?)
    }

    /// Number of records in the store.
    pub async fn count(&mut self, store: &str) -> DbResult<u64> {
        let def = self.store(store)?;
        let sql = format!("SELECT COUNT(*) FROM {}", def.table());

        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *self.tx).await?;
        Ok(count.max(0) as u64)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts the record, or fully replaces the one with the same key.
    ///
    /// Returns the key written.
    ///
    /// ## Errors
    /// - `MissingKey` when the record has no string key
    /// - `UniqueViolation` when another record already holds a value of
    ///   a unique index; the other record is left untouched
    pub async fn put<T: Serialize + ?Sized>(&mut self, store: &str, record: &T) -> DbResult<String> {
        let def = self.writable_store(store)?;
        let doc = serde_json::to_value(record)?;
        let key = def.key_of(&doc)?;
        let index_values = def.index_values(&doc);
        let body = serde_json::to_string(&doc)?;

        let sql = def.upsert_sql();
        let mut query = sqlx::query(&sql).bind(key.as_str()).bind(body.as_str());
        for value in &index_values {
            query = query.bind(value.as_deref());
        }

        query
            .execute(&mut *self.tx)
            .await
            .map_err(|e| unique_violation(def, e, &index_values))?;

        debug!(store = def.name, key = %key, "put");
        Ok(key)
    }

    /// Removes the record if present. Returns whether one was removed.
    pub async fn delete(&mut self, store: &str, key: &str) -> DbResult<bool> {
        let def = self.writable_store(store)?;
        let sql = format!("DELETE FROM {} WHERE pk = ?1", def.table());

        let result = sqlx::query(&sql).bind(key).execute(&mut *self.tx).await?;
        debug!(store = def.name, key = %key, removed = result.rows_affected(), "delete");
        Ok(result.rows_affected() > 0)
    }

    /// Removes every record in the store. Returns how many were removed.
    pub async fn clear(&mut self, store: &str) -> DbResult<u64> {
        let def = self.writable_store(store)?;
        let sql = format!("DELETE FROM {}", def.table());

        let result = sqlx::query(&sql).execute(&mut *self.tx).await?;
        debug!(store = def.name, removed = result.rows_affected(), "clear");
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Publishes every write atomically and releases the locks.
    pub async fn commit(self) -> DbResult<()> {
        let stores = self.store_names();
        let Transaction { tx, mode, _locks, .. } = self;

        tx.commit().await.map_err(|e| {
            warn!(?stores, error = %e, "Commit failed");
            DbError::TransactionFailed(e.to_string())
        })?;

        debug!(?stores, ?mode, "Transaction committed");
        Ok(())
    }

    /// Discards every write and releases the locks.
    pub async fn abort(self) -> DbResult<()> {
        let stores = self.store_names();
        let Transaction { tx, _locks, .. } = self;

        tx.rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(?stores, "Transaction aborted");
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(def: &StoreDef, doc: &str) -> DbResult<T> {
    serde_json::from_str(doc)
        .map_err(|e| DbError::Serialization(format!("{}: {e}", def.name)))
}

/// Names the index and value behind a unique constraint failure.
fn unique_violation(def: &StoreDef, err: sqlx::Error, index_values: &[Option<String>]) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { index: column, .. } => match def.index_for_column(&column) {
            Some((pos, index)) => DbError::duplicate(
                def.name,
                index.name,
                index_values[pos].clone().unwrap_or_default(),
            ),
            None => DbError::duplicate(def.name, column, "unknown"),
        },
        other => other,
    }
}
