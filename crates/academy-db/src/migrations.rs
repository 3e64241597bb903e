//! # Schema Migrations
//!
//! Materializes the [schema registry](crate::schema) in SQLite.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Migration Process                                  │
//! │                                                                         │
//! │  Database::open                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PRAGMA user_version ──► found                                         │
//! │       │                                                                 │
//! │       ├── found > SCHEMA_VERSION ──► VersionMismatch (refuse)          │
//! │       ├── found == SCHEMA_VERSION ──► nothing to do                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │    CREATE TABLE / INDEX IF NOT EXISTS  (every store in the registry)   │
//! │    PRAGMA user_version = SCHEMA_VERSION                                │
//! │  COMMIT                                                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything runs in one transaction, so a crash mid-way leaves the
//! file at its previous revision.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::schema::Schema;

/// Creates any missing stores and indexes and stamps the revision.
///
/// Idempotent: safe to run on every open.
pub async fn apply_schema(pool: &SqlitePool, schema: &Schema) -> DbResult<()> {
    let found = schema_version(pool).await?;

    if found > schema.version {
        return Err(DbError::VersionMismatch {
            found,
            supported: schema.version,
        });
    }

    if found == schema.version {
        debug!(version = found, "Schema up to date");
        return Ok(());
    }

    info!(
        database = schema.name,
        from = found,
        to = schema.version,
        "Applying schema"
    );

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| DbError::MigrationFailed(e.to_string()))?;

    for store in schema.stores {
        for statement in store.ddl() {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| DbError::MigrationFailed(format!("{}: {e}", store.name)))?;
        }
        debug!(store = store.name, indexes = store.indexes.len(), "Store ready");
    }

    // PRAGMA does not take bound parameters.
    sqlx::query(&format!("PRAGMA user_version = {}", schema.version))
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::MigrationFailed(e.to_string()))?;

    tx.commit()
        .await
        .map_err(|e| DbError::MigrationFailed(e.to_string()))?;

    info!(version = schema.version, "Schema applied");
    Ok(())
}

/// Returns the revision stamped in the file (0 for a new file).
pub async fn schema_version(pool: &SqlitePool) -> DbResult<i64> {
    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SCHEMA;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_apply_schema_creates_stores() {
        let pool = memory_pool().await;
        assert_eq!(schema_version(&pool).await.unwrap(), 0);

        apply_schema(&pool, &SCHEMA).await.unwrap();
        assert_eq!(schema_version(&pool).await.unwrap(), SCHEMA.version);

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables, vec!["articles", "leads", "podcasts", "settings", "videos"]);

        let unique: i64 = sqlx::query_scalar(
            "SELECT \"unique\" FROM pragma_index_list('articles') WHERE name = 'articles__by-slug'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(unique, 1);
    }

    #[tokio::test]
    async fn test_apply_schema_is_idempotent() {
        let pool = memory_pool().await;
        apply_schema(&pool, &SCHEMA).await.unwrap();
        apply_schema(&pool, &SCHEMA).await.unwrap();
        assert_eq!(schema_version(&pool).await.unwrap(), SCHEMA.version);
    }

    #[tokio::test]
    async fn test_newer_file_is_refused() {
        let pool = memory_pool().await;
        sqlx::query("PRAGMA user_version = 99")
            .execute(&pool)
            .await
            .unwrap();

        let err = apply_schema(&pool, &SCHEMA).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::VersionMismatch { found: 99, supported } if supported == SCHEMA.version
        ));
    }
}
