//! # Storage Error Types
//!
//! Error types for the storage engine and the repository boundary.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)      serde_json::Error                      │
//! │       │                               │                                 │
//! │       ▼                               ▼                                 │
//! │  DbError (this module) ← Adds store/index context                      │
//! │       │                                                                 │
//! │       │        ValidationError (academy-core)                          │
//! │       │               │                                                 │
//! │       ▼               ▼                                                 │
//! │  RepoError ← what pages and forms receive                              │
//! │       │                                                                 │
//! │       ├── is_user_fixable() → show the message next to the form        │
//! │       └── is_retryable()    → offer "try again"                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Not-found is never an error here: lookups return `Option`.

use academy_core::ValidationError;
use thiserror::Error;

/// Storage engine errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database could not be opened or created.
    ///
    /// ## When This Occurs
    /// - Parent directory missing or not writable
    /// - File locked or corrupt
    /// - Schema creation failed on first open
    ///
    /// Only the caller that ran the failed open receives this error. The
    /// open-once cell stays empty, so the next caller tries again.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The file was written by a newer schema revision.
    #[error("Database schema version {found} is newer than supported version {supported}")]
    VersionMismatch { found: i64, supported: i64 },

    /// No store with this name is registered.
    #[error("Unknown store: {0}")]
    UnknownStore(String),

    /// The store exists but declares no such index.
    #[error("Store '{store}' has no index '{index}'")]
    UnknownIndex { store: String, index: String },

    /// A transaction touched a store it was not opened over.
    #[error("Store '{store}' is not in this transaction's scope")]
    StoreNotInScope { store: String },

    /// A write was issued on a read-only transaction.
    #[error("Cannot write to '{store}' in a read-only transaction")]
    ReadOnlyTransaction { store: String },

    /// A record has no usable primary key.
    #[error("Record for '{store}' has no string '{key_path}' field")]
    MissingKey { store: String, key_path: String },

    /// Unique index violation.
    ///
    /// ## When This Occurs
    /// ```text
    /// put(articles, { id: "b", slug: "x" })
    ///      │
    ///      ▼
    /// row "a" already holds slug "x" in articles.by-slug (unique)
    ///      │
    ///      ▼
    /// UniqueViolation { store: "articles", index: "by-slug", value: "x" }
    ///      │
    ///      ▼
    /// transaction aborts, row "a" is untouched
    /// ```
    #[error("Duplicate {index} in '{store}': '{value}' already exists")]
    UniqueViolation {
        store: String,
        index: String,
        value: String,
    },

    /// A stored document could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Schema creation or upgrade failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Commit or rollback failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a UniqueViolation error.
    pub fn duplicate(
        store: impl Into<String>,
        index: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        DbError::UniqueViolation {
            store: store.into(),
            index: index.into(),
            value: value.into(),
        }
    }

    /// True for faults that may clear up on a second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DbError::StorageUnavailable(_)
                | DbError::QueryFailed(_)
                | DbError::TransactionFailed(_)
                | DbError::PoolExhausted
                | DbError::ConnectionFailed(_)
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database (unique)  → DbError::UniqueViolation (store/column only)
/// sqlx::Error::Database (other)   → DbError::QueryFailed
/// sqlx::Error::PoolTimedOut       → DbError::PoolExhausted
/// sqlx::Error::PoolClosed         → DbError::ConnectionFailed
/// Other                           → DbError::Internal
/// ```
///
/// Writes that know the offending record refine the unique case with
/// the index name and value (see `transaction.rs`).
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if db_err.is_unique_violation() {
                    // "UNIQUE constraint failed: <table>.<column>"
                    let target = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown");
                    let (store, column) = target.split_once('.').unwrap_or((target, "unknown"));
                    DbError::UniqueViolation {
                        store: store.to_string(),
                        index: column.to_string(),
                        value: "unknown".to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

/// Result type for storage operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Repository Error
// =============================================================================

/// Error returned by repositories.
///
/// Splits failures the editor or visitor can fix from storage faults.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] DbError),
}

impl RepoError {
    /// Machine-readable code for the page layer.
    pub fn code(&self) -> &'static str {
        match self {
            RepoError::Validation(ValidationError::Duplicate { .. })
            | RepoError::Storage(DbError::UniqueViolation { .. }) => "DUPLICATE",
            RepoError::Validation(_) => "VALIDATION_ERROR",
            RepoError::Storage(DbError::StorageUnavailable(_)) => "STORAGE_UNAVAILABLE",
            RepoError::Storage(_) => "DATABASE_ERROR",
        }
    }

    /// True when changing the input would make the call succeed.
    pub fn is_user_fixable(&self) -> bool {
        matches!(
            self,
            RepoError::Validation(_) | RepoError::Storage(DbError::UniqueViolation { .. })
        )
    }

    /// True when the same call may succeed later.
    pub fn is_retryable(&self) -> bool {
        match self {
            RepoError::Validation(_) => false,
            RepoError::Storage(e) => e.is_retryable(),
        }
    }
}

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_error_classification() {
        let dup: RepoError = ValidationError::duplicate("slug", "x").into();
        assert!(dup.is_user_fixable());
        assert!(!dup.is_retryable());
        assert_eq!(dup.code(), "DUPLICATE");

        let down: RepoError = DbError::StorageUnavailable("disk".to_string()).into();
        assert!(!down.is_user_fixable());
        assert!(down.is_retryable());
        assert_eq!(down.code(), "STORAGE_UNAVAILABLE");

        let scope: RepoError = DbError::StoreNotInScope {
            store: "videos".to_string(),
        }
        .into();
        assert!(!scope.is_user_fixable());
        assert!(!scope.is_retryable());
        assert_eq!(scope.code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_messages() {
        let err = DbError::duplicate("articles", "by-slug", "x");
        assert_eq!(
            err.to_string(),
            "Duplicate by-slug in 'articles': 'x' already exists"
        );
        let err = DbError::VersionMismatch {
            found: 3,
            supported: 1,
        };
        assert!(err.to_string().contains("newer"));
    }
}
