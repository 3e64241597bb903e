//! # Seeder
//!
//! Fills a fresh database with the sample content, exactly once.
//!
//! ## Seeding Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  BEGIN (ReadWrite: articles, podcasts, settings, videos)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  count(articles) > 0 ? ── yes ──► ROLLBACK ──► AlreadySeeded           │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  put every article, podcast, video                                     │
//! │  put settings (only if no settings row exists)                         │
//! │       │                                                                 │
//! │       ├── any put fails ──► ROLLBACK, nothing written                  │
//! │       ▼                                                                 │
//! │  COMMIT ──► Seeded { articles, podcasts, videos }                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The population check runs under the same exclusive locks as the
//! writes, so two seeders racing each other write the data once.
//!
//! ## Startup
//! [`start`] opens the shared handle and runs the seeder according to
//! [`SeedMode`]. In `Background` mode pages can read before the seed has
//! committed and see empty stores.

use academy_core::{Article, Podcast, SiteSettings, Timestamp, Video, SETTINGS_ID};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::SeedMode;
use crate::error::DbResult;
use crate::pool::{Database, DatabaseCell};
use crate::record::Record;
use crate::sample::SampleData;
use crate::transaction::TxMode;

/// What a seeding run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Articles already existed; nothing was written.
    AlreadySeeded,
    /// The dataset was written.
    Seeded {
        articles: usize,
        podcasts: usize,
        videos: usize,
    },
}

impl SeedOutcome {
    pub fn wrote_data(&self) -> bool {
        matches!(self, SeedOutcome::Seeded { .. })
    }
}

/// Seeds `db` with the built-in sample content, dated from now.
pub async fn seed_database(db: &Database) -> DbResult<SeedOutcome> {
    let data = SampleData::standard(Timestamp::now())?;
    seed_with(db, &data).await
}

/// Seeds `db` with `data` unless the article store already has records.
///
/// All writes share one transaction: on error nothing is written.
pub async fn seed_with(db: &Database, data: &SampleData) -> DbResult<SeedOutcome> {
    let mut tx = db
        .transaction(
            &[Article::STORE, Podcast::STORE, Video::STORE, SiteSettings::STORE],
            TxMode::ReadWrite,
        )
        .await?;

    let existing = tx.count(Article::STORE).await?;
    if existing > 0 {
        tx.abort().await?;
        debug!(existing, "Articles present, skipping seed");
        return Ok(SeedOutcome::AlreadySeeded);
    }

    for article in &data.articles {
        tx.put(Article::STORE, article).await?;
    }
    for podcast in &data.podcasts {
        tx.put(Podcast::STORE, podcast).await?;
    }
    for video in &data.videos {
        tx.put(Video::STORE, video).await?;
    }

    if tx
        .get::<SiteSettings>(SiteSettings::STORE, SETTINGS_ID)
        .await?
        .is_none()
    {
        tx.put(SiteSettings::STORE, &data.settings).await?;
    }

    tx.commit().await?;

    let outcome = SeedOutcome::Seeded {
        articles: data.articles.len(),
        podcasts: data.podcasts.len(),
        videos: data.videos.len(),
    };
    info!(?outcome, "Database seeded");
    Ok(outcome)
}

// =============================================================================
// Startup
// =============================================================================

/// The shared handle plus the seeding task, if one was spawned.
#[derive(Debug)]
pub struct Startup {
    pub db: Database,
    /// Present in `Background` mode.
    pub seeding: Option<JoinHandle<DbResult<SeedOutcome>>>,
}

/// Opens the shared handle and seeds according to `mode`.
///
/// ## Errors
/// - Any open error from [`DatabaseCell::open`]
/// - In `Await` mode, a seeding error
///
/// In `Background` mode seeding errors are logged and returned through
/// the join handle only.
pub async fn start(cell: &DatabaseCell, mode: SeedMode) -> DbResult<Startup> {
    let db = cell.open().await?;

    let seeding = match mode {
        SeedMode::Off => {
            debug!("Seeding disabled");
            None
        }
        SeedMode::Await => {
            seed_database(&db).await?;
            None
        }
        SeedMode::Background => {
            let task_db = db.clone();
            Some(tokio::spawn(async move {
                let result = seed_database(&task_db).await;
                if let Err(e) = &result {
                    error!(error = %e, "Background seeding failed");
                }
                result
            }))
        }
    };

    info!(%mode, "Database ready");
    Ok(Startup { db, seeding })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::DbConfig;

    async fn db() -> Database {
        Database::open(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_seed_then_skip() {
        let db = db().await;

        let first = seed_database(&db).await.unwrap();
        assert_eq!(
            first,
            SeedOutcome::Seeded {
                articles: 10,
                podcasts: 3,
                videos: 2
            }
        );
        assert!(first.wrote_data());

        assert_eq!(seed_database(&db).await.unwrap(), SeedOutcome::AlreadySeeded);
        assert_eq!(db.articles().count().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_existing_settings_kept() {
        let db = db().await;
        let custom = SiteSettings {
            primary_color: "#ff0000".to_string(),
            ..SiteSettings::default()
        };
        db.settings().update(custom.clone()).await.unwrap();

        seed_database(&db).await.unwrap();
        assert_eq!(db.settings().get().await.unwrap(), Some(custom));
    }

    #[tokio::test]
    async fn test_failed_seed_writes_nothing() {
        let db = db().await;
        let mut data = SampleData::standard(Timestamp::from_millis(1_000_000_000)).unwrap();
        data.videos[1].slug = data.videos[0].slug.clone();

        let err = seed_with(&db, &data).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let counts = db.content_counts().await.unwrap();
        assert_eq!(counts.articles, 0);
        assert_eq!(counts.podcasts, 0);
        assert_eq!(counts.videos, 0);
        assert_eq!(db.settings().get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_start_await_mode() {
        let cell = DatabaseCell::new(DbConfig::in_memory());
        let startup = start(&cell, SeedMode::Await).await.unwrap();

        assert!(startup.seeding.is_none());
        assert_eq!(startup.db.podcasts().count().await.unwrap(), 3);
        assert!(startup.db.ptr_eq(&cell.open().await.unwrap()));
    }

    #[tokio::test]
    async fn test_start_background_mode() {
        let cell = DatabaseCell::new(DbConfig::in_memory());
        let startup = start(&cell, SeedMode::Background).await.unwrap();

        let outcome = startup.seeding.unwrap().await.unwrap().unwrap();
        assert!(outcome.wrote_data());
        assert_eq!(startup.db.videos().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_start_off_mode() {
        let cell = DatabaseCell::new(DbConfig::in_memory());
        let startup = start(&cell, SeedMode::Off).await.unwrap();

        assert!(startup.seeding.is_none());
        assert_eq!(startup.db.articles().count().await.unwrap(), 0);
    }
}
