//! # Storage Engine
//!
//! Opening the database, the shared handle, and the open-once cell.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Opening the Database                            │
//! │                                                                         │
//! │  page A ──┐                                                             │
//! │  page B ──┼──► DatabaseCell::open() ──► one in-flight Database::open    │
//! │  seeder ──┘          │                        │                         │
//! │                      │                        ├── SqlitePool (WAL)      │
//! │                      │                        └── apply_schema          │
//! │                      ▼                                                  │
//! │           every caller gets a clone of the same Database                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │  Database (Arc<Inner>, cheap to clone)  │                           │
//! │  │  ├── SqlitePool                          │                           │
//! │  │  └── LockManager (one RwLock per store) │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ├── transaction(stores, mode)                                    │
//! │       ├── get / put / delete / count ... (one-store transactions)      │
//! │       └── articles() / leads() / settings() ... (repositories)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File databases run in WAL mode so read-only transactions on other
//! connections keep reading while a writer works.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::error::{DbError, DbResult};
use crate::lock::LockManager;
use crate::migrations;
use crate::repository::{
    ArticleRepository, LeadRepository, PodcastRepository, SettingsRepository, VideoRepository,
};
use crate::schema::{stores, SCHEMA};
use crate::transaction::{Transaction, TxMode};

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/academy.db")
///     .max_connections(4)
///     .busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `None` for in-memory.
    pub database_path: Option<PathBuf>,

    /// Maximum number of connections in the pool.
    /// Default: 4
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a free connection.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// How long SQLite retries when the file is locked by another process.
    /// Default: 5 seconds
    pub busy_timeout: Duration,
}

impl DbConfig {
    /// Creates a configuration for a database file.
    ///
    /// The file is created if missing; its directory must exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: Some(path.into()),
            max_connections: 4,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Creates a configuration for an in-memory database (for testing).
    ///
    /// ## Note
    /// Each open gets its own named shared-cache database, so the pool's
    /// connections all see the same data and readers run side by side.
    /// The data is lost when the last connection closes, so the pool never
    /// retires its connections.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: None,
            max_connections: 4,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            busy_timeout: Duration::from_secs(5),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.is_none()
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the idle timeout.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets the SQLite busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}

// =============================================================================
// Database
// =============================================================================

#[derive(Debug)]
struct Inner {
    pool: SqlitePool,
    locks: LockManager,
}

/// Shared handle to the open database.
///
/// Clones share one pool and one set of store locks. There is no explicit
/// teardown; the pool closes when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

/// Per-store record counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentCounts {
    pub articles: u64,
    pub podcasts: u64,
    pub videos: u64,
    pub leads: u64,
}

impl Database {
    /// Opens (creating if needed) the database and applies the schema.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite: WAL, NORMAL synchronous, busy timeout
    /// 3. Creates the connection pool
    /// 4. Creates every store and index from the schema registry
    ///
    /// ## Errors
    /// - `VersionMismatch` when the file has a newer schema revision
    /// - `StorageUnavailable` for anything else that stops the open
    ///
    /// Most callers should go through [`DatabaseCell::open`] instead.
    pub async fn open(config: DbConfig) -> DbResult<Self> {
        match Self::connect(&config).await {
            Ok(db) => Ok(db),
            Err(e @ DbError::VersionMismatch { .. }) => {
                error!(error = %e, "Refusing to open database");
                Err(e)
            }
            Err(e) => {
                error!(error = %e, "Database initialization failed");
                Err(DbError::StorageUnavailable(e.to_string()))
            }
        }
    }

    async fn connect(config: &DbConfig) -> DbResult<Self> {
        info!(
            database = SCHEMA.name,
            path = ?config.database_path,
            "Opening database"
        );

        let connect_options = match &config.database_path {
            Some(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                // Readers don't block the writer and vice versa
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal),
            None => SqliteConnectOptions::from_str(&next_memory_url())
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?,
        }
        .busy_timeout(config.busy_timeout);

        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout);

        pool_options = if config.is_in_memory() {
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.idle_timeout(Some(config.idle_timeout))
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "Database pool created");

        migrations::apply_schema(&pool, &SCHEMA).await?;

        Ok(Database {
            inner: Arc::new(Inner {
                pool,
                locks: LockManager::new(&SCHEMA),
            }),
        })
    }

    /// True when both handles share the same underlying database.
    pub fn ptr_eq(&self, other: &Database) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns a reference to the connection pool.
    ///
    /// Bypasses store locks; prefer transactions.
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// The schema revision stamped in the file.
    pub async fn schema_version(&self) -> DbResult<i64> {
        migrations::schema_version(&self.inner.pool).await
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.inner.pool)
            .await
            .is_ok()
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Opens a transaction over `stores`.
    ///
    /// Waits for the store locks first (see [`crate::lock`]), then begins
    /// the SQLite transaction. Duplicate names are ignored.
    ///
    /// ## Errors
    /// - `UnknownStore` for a name not in the registry
    /// - `StoreNotInScope` when `stores` is empty
    pub async fn transaction(&self, stores: &[&str], mode: TxMode) -> DbResult<Transaction> {
        if stores.is_empty() {
            return Err(DbError::StoreNotInScope {
                store: String::new(),
            });
        }

        let mut scope = stores
            .iter()
            .map(|name| SCHEMA.store(name))
            .collect::<DbResult<Vec<_>>>()?;
        scope.sort_by_key(|s| s.name);
        scope.dedup_by_key(|s| s.name);

        let locks = self.inner.locks.acquire(&scope, mode).await;
        let tx = self.inner.pool.begin().await?;

        debug!(stores = ?stores, ?mode, "Transaction started");
        Ok(Transaction::new(tx, scope, mode, locks))
    }

    // =========================================================================
    // One-Store Operations
    // =========================================================================
    // Each call runs in its own transaction over that one store.

    /// Point lookup by primary key.
    pub async fn get<T: DeserializeOwned>(&self, store: &str, key: &str) -> DbResult<Option<T>> {
        let mut tx = self.transaction(&[store], TxMode::ReadOnly).await?;
        let record = tx.get(store, key).await?;
        tx.commit().await?;
        Ok(record)
    }

    /// Every record in the store, by ascending key.
    pub async fn get_all<T: DeserializeOwned>(&self, store: &str) -> DbResult<Vec<T>> {
        let mut tx = self.transaction(&[store], TxMode::ReadOnly).await?;
        let records = tx.get_all(store).await?;
        tx.commit().await?;
        Ok(records)
    }

    /// First record whose index value equals `value`.
    pub async fn get_from_index<T: DeserializeOwned>(
        &self,
        store: &str,
        index: &str,
        value: &str,
    ) -> DbResult<Option<T>> {
        let mut tx = self.transaction(&[store], TxMode::ReadOnly).await?;
        let record = tx.get_from_index(store, index, value).await?;
        tx.commit().await?;
        Ok(record)
    }

    /// Every record whose index value equals `value`.
    pub async fn get_all_from_index<T: DeserializeOwned>(
        &self,
        store: &str,
        index: &str,
        value: &str,
    ) -> DbResult<Vec<T>> {
        let mut tx = self.transaction(&[store], TxMode::ReadOnly).await?;
        let records = tx.get_all_from_index(store, index, value).await?;
        tx.commit().await?;
        Ok(records)
    }

    /// Upsert keyed by the record's primary key.
    pub async fn put<T: Serialize + ?Sized>(&self, store: &str, record: &T) -> DbResult<String> {
        let mut tx = self.transaction(&[store], TxMode::ReadWrite).await?;
        let key = tx.put(store, record).await?;
        tx.commit().await?;
        Ok(key)
    }

    /// Removes the record if present.
    pub async fn delete(&self, store: &str, key: &str) -> DbResult<bool> {
        let mut tx = self.transaction(&[store], TxMode::ReadWrite).await?;
        let removed = tx.delete(store, key).await?;
        tx.commit().await?;
        Ok(removed)
    }

    /// Number of records in the store.
    pub async fn count(&self, store: &str) -> DbResult<u64> {
        let mut tx = self.transaction(&[store], TxMode::ReadOnly).await?;
        let count = tx.count(store).await?;
        tx.commit().await?;
        Ok(count)
    }

    /// Dashboard counts, read in one consistent snapshot.
    pub async fn content_counts(&self) -> DbResult<ContentCounts> {
        let mut tx = self
            .transaction(
                &[stores::ARTICLES, stores::PODCASTS, stores::VIDEOS, stores::LEADS],
                TxMode::ReadOnly,
            )
            .await?;

        let counts = ContentCounts {
            articles: tx.count(stores::ARTICLES).await?,
            podcasts: tx.count(stores::PODCASTS).await?,
            videos: tx.count(stores::VIDEOS).await?,
            leads: tx.count(stores::LEADS).await?,
        };
        tx.commit().await?;
        Ok(counts)
    }

    // =========================================================================
    // Repositories
    // =========================================================================

    /// Returns the article repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let latest = db.articles().latest_published(3).await?;
    /// ```
    pub fn articles(&self) -> ArticleRepository {
        ArticleRepository::new(self.clone())
    }

    /// Returns the podcast episode repository.
    pub fn podcasts(&self) -> PodcastRepository {
        PodcastRepository::new(self.clone())
    }

    /// Returns the video repository.
    pub fn videos(&self) -> VideoRepository {
        VideoRepository::new(self.clone())
    }

    /// Returns the lead repository.
    pub fn leads(&self) -> LeadRepository {
        LeadRepository::new(self.clone())
    }

    /// Returns the site settings repository.
    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.clone())
    }
}

/// A fresh shared-cache URL, one database per call.
fn next_memory_url() -> String {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    format!("sqlite:file:academy-mem-{n}?mode=memory&cache=shared")
}

// =============================================================================
// Open-Once Cell
// =============================================================================

/// Opens the database at most once and hands the same handle to everyone.
///
/// ## Concurrent Open
/// ```text
/// open() ─┐
/// open() ─┼─► first caller runs Database::open, the rest wait on it
/// open() ─┘          │
///                    ├── Ok  → every caller gets a clone of that handle
///                    └── Err → that caller gets StorageUnavailable, the cell
///                              stays empty and the next waiter tries again
/// ```
///
/// Owned by whoever starts the process and passed to consumers; there is
/// no global instance.
#[derive(Debug)]
pub struct DatabaseCell {
    config: DbConfig,
    cell: OnceCell<Database>,
}

impl DatabaseCell {
    pub fn new(config: DbConfig) -> Self {
        DatabaseCell {
            config,
            cell: OnceCell::new(),
        }
    }

    /// Returns the shared handle, opening the database on first use.
    pub async fn open(&self) -> DbResult<Database> {
        self.cell
            .get_or_try_init(|| Database::open(self.config.clone()))
            .await
            .cloned()
    }

    /// The handle, if a previous `open` succeeded.
    pub fn get(&self) -> Option<Database> {
        self.cell.get().cloned()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert_eq!(db.schema_version().await.unwrap(), SCHEMA.version);
    }

    #[tokio::test]
    async fn test_in_memory_readers_run_side_by_side() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        db.put(stores::ARTICLES, &json!({ "id": "a1", "slug": "a1", "pillar": "x", "status": "draft" }))
            .await
            .unwrap();

        let mut first = db.transaction(&[stores::ARTICLES], TxMode::ReadOnly).await.unwrap();
        let mut second = tokio::time::timeout(
            Duration::from_secs(2),
            db.transaction(&[stores::ARTICLES], TxMode::ReadOnly),
        )
        .await
        .expect("second reader waited on the first")
        .unwrap();

        assert_eq!(first.count(stores::ARTICLES).await.unwrap(), 1);
        assert_eq!(second.count(stores::ARTICLES).await.unwrap(), 1);

        // A one-store read through the handle is not blocked either.
        let read = tokio::time::timeout(Duration::from_secs(2), db.count(stores::ARTICLES)).await;
        assert_eq!(read.unwrap().unwrap(), 1);

        first.commit().await.unwrap();
        second.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_separate() {
        let a = Database::open(DbConfig::in_memory()).await.unwrap();
        let b = Database::open(DbConfig::in_memory()).await.unwrap();

        a.put(stores::LEADS, &json!({ "id": "l1", "email": "s@x.io", "createdAt": 1 }))
            .await
            .unwrap();
        assert_eq!(a.count(stores::LEADS).await.unwrap(), 1);
        assert_eq!(b.count(stores::LEADS).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/academy.db")
            .max_connections(10)
            .min_connections(2)
            .busy_timeout(Duration::from_secs(1));

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_cell_returns_same_handle() {
        let cell = DatabaseCell::new(DbConfig::in_memory());
        assert!(cell.get().is_none());

        let a = cell.open().await.unwrap();
        let b = cell.open().await.unwrap();
        assert!(a.ptr_eq(&b));
        assert!(cell.get().unwrap().ptr_eq(&a));
    }

    #[tokio::test]
    async fn test_one_store_operations() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let lead = json!({ "id": "l1", "name": "Sara", "email": "s@x.io", "source": "contact_form", "createdAt": 1 });

        assert_eq!(db.put(stores::LEADS, &lead).await.unwrap(), "l1");
        assert_eq!(db.count(stores::LEADS).await.unwrap(), 1);
        assert_eq!(db.get::<Value>(stores::LEADS, "l1").await.unwrap(), Some(lead));
        assert!(db.delete(stores::LEADS, "l1").await.unwrap());
        assert!(!db.delete(stores::LEADS, "l1").await.unwrap());
        assert_eq!(db.count(stores::LEADS).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transaction_scope_errors() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();

        assert!(matches!(
            db.transaction(&["comments"], TxMode::ReadOnly).await,
            Err(DbError::UnknownStore(_))
        ));
        assert!(matches!(
            db.transaction(&[], TxMode::ReadOnly).await,
            Err(DbError::StoreNotInScope { .. })
        ));

        let mut tx = db.transaction(&[stores::ARTICLES], TxMode::ReadOnly).await.unwrap();
        assert!(matches!(
            tx.count(stores::VIDEOS).await,
            Err(DbError::StoreNotInScope { .. })
        ));
        assert!(matches!(
            tx.put(stores::ARTICLES, &json!({ "id": "a1" })).await,
            Err(DbError::ReadOnlyTransaction { .. })
        ));
        assert!(matches!(
            tx.get_all_from_index::<Value>(stores::ARTICLES, "by-author", "x").await,
            Err(DbError::UnknownIndex { .. })
        ));
        tx.abort().await.unwrap();
    }

    #[tokio::test]
    async fn test_content_counts() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        db.put(stores::VIDEOS, &json!({ "id": "v1", "slug": "v1", "status": "draft" }))
            .await
            .unwrap();

        let counts = db.content_counts().await.unwrap();
        assert_eq!(
            counts,
            ContentCounts {
                videos: 1,
                ..ContentCounts::default()
            }
        );
    }
}
