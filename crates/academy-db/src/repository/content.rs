//! # Content Repository
//!
//! Shared operations for articles, podcast episodes and videos, plus the
//! article-only pillar queries and editor save.
//!
//! ## Saving Content
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       save(record)                                      │
//! │                                                                         │
//! │  record.fill_defaults()   (blank featuredImage → placeholder)           │
//! │  record.validate()  ──── fails ──► RepoError::Validation                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN (ReadWrite over the record's store)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  by-slug index: who owns record.slug?                                   │
//! │       ├── nobody / record.id ──► put(record) ──► COMMIT                 │
//! │       └── another id ──► ROLLBACK ──► ValidationError::Duplicate        │
//! │                                                                         │
//! │  The check and the write share one transaction, so no other writer     │
//! │  can take the slug in between.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::marker::PhantomData;

use academy_core::draft::ArticleDraft;
use academy_core::query::{sort_newest_first, ArticleQuery};
use academy_core::{Article, Content, ContentStatus, Podcast, Timestamp, Validate, ValidationError, Video};
use tracing::{debug, info};

use crate::error::{DbResult, RepoResult};
use crate::pool::Database;
use crate::record::Record;
use crate::schema::indexes;
use crate::transaction::TxMode;

/// How many related articles the article page shows.
pub const DEFAULT_RELATED_LIMIT: usize = 3;

/// Repository for one content store.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.podcasts();
///
/// // Public list, newest first
/// let episodes = repo.list_published().await?;
///
/// // Detail page
/// let episode = repo.get_by_slug("ep1-entrepreneur-mindset").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ContentRepository<T> {
    db: Database,
    _record: PhantomData<fn() -> T>,
}

pub type ArticleRepository = ContentRepository<Article>;
pub type PodcastRepository = ContentRepository<Podcast>;
pub type VideoRepository = ContentRepository<Video>;

impl<T> ContentRepository<T>
where
    T: Content + Record + Validate + Clone,
{
    /// Creates a new repository over `db`.
    pub fn new(db: Database) -> Self {
        ContentRepository {
            db,
            _record: PhantomData,
        }
    }

    /// Gets a record by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<T>> {
        debug!(kind = T::KIND, id = %id, "Getting by id");
        self.db.get(T::STORE, id).await
    }

    /// Gets a record by slug (detail pages).
    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<T>> {
        debug!(kind = T::KIND, slug = %slug, "Getting by slug");
        self.db.get_from_index(T::STORE, indexes::BY_SLUG, slug).await
    }

    /// Every record regardless of status, newest first (admin lists).
    pub async fn list_all(&self) -> DbResult<Vec<T>> {
        let mut items: Vec<T> = self.db.get_all(T::STORE).await?;
        sort_newest_first(&mut items);
        Ok(items)
    }

    /// Published records, newest first (public lists).
    pub async fn list_published(&self) -> DbResult<Vec<T>> {
        let mut items: Vec<T> = self
            .db
            .get_all_from_index(T::STORE, indexes::BY_STATUS, ContentStatus::Published.as_str())
            .await?;
        sort_newest_first(&mut items);

        debug!(kind = T::KIND, count = items.len(), "Listed published");
        Ok(items)
    }

    /// The `limit` most recent published records (home page).
    pub async fn latest_published(&self, limit: usize) -> DbResult<Vec<T>> {
        let mut items = self.list_published().await?;
        items.truncate(limit);
        Ok(items)
    }

    /// Number of records, any status.
    pub async fn count(&self) -> DbResult<u64> {
        self.db.count(T::STORE).await
    }

    /// Deletes a record. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let removed = self.db.delete(T::STORE, id).await?;
        info!(kind = T::KIND, id = %id, removed, "Deleted");
        Ok(removed)
    }

    /// Fills defaults, validates and upserts a record.
    ///
    /// Returns the record as stored.
    ///
    /// ## Errors
    /// - `Validation(..)` when a field rule fails, or when another record
    ///   already uses the slug (`Duplicate { field: "slug" }`)
    /// - `Storage(..)` when the write itself fails
    pub async fn save(&self, record: &T) -> RepoResult<T> {
        let mut record = record.clone();
        record.fill_defaults();
        record.validate()?;

        let mut tx = self.db.transaction(&[T::STORE], TxMode::ReadWrite).await?;

        let owners = tx
            .get_all_keys_from_index(T::STORE, indexes::BY_SLUG, record.slug())
            .await?;
        if owners.iter().any(|owner| owner != record.id()) {
            tx.abort().await?;
            debug!(kind = T::KIND, slug = %record.slug(), "Slug taken");
            return Err(ValidationError::duplicate("slug", record.slug()).into());
        }

        tx.put(T::STORE, &record).await?;
        tx.commit().await?;

        info!(
            kind = T::KIND,
            id = %record.id(),
            slug = %record.slug(),
            status = %record.status(),
            "Saved"
        );
        Ok(record)
    }
}

// =============================================================================
// Article-Only Operations
// =============================================================================

impl ContentRepository<Article> {
    /// Articles in one pillar, any status, newest first.
    pub async fn list_by_pillar(&self, pillar: &str) -> DbResult<Vec<Article>> {
        let mut items: Vec<Article> = self
            .db
            .get_all_from_index(Article::STORE, indexes::BY_PILLAR, pillar)
            .await?;
        sort_newest_first(&mut items);
        Ok(items)
    }

    /// Published articles sharing `article`'s pillar, excluding itself.
    pub async fn related(&self, article: &Article, limit: usize) -> DbResult<Vec<Article>> {
        let related: Vec<Article> = self
            .list_by_pillar(&article.pillar)
            .await?
            .into_iter()
            .filter(|a| a.id != article.id && a.is_published())
            .take(limit)
            .collect();

        debug!(id = %article.id, count = related.len(), "Related articles");
        Ok(related)
    }

    /// Published articles narrowed by the blog hub filter, newest first.
    pub async fn browse(&self, query: &ArticleQuery) -> DbResult<Vec<Article>> {
        Ok(query.apply(self.list_published().await?))
    }

    /// Finalizes editor input and saves it.
    ///
    /// `existing_id` is the article being edited, `None` to create one.
    /// Returns the stored article (with its new id when created).
    pub async fn save_draft(
        &self,
        draft: ArticleDraft,
        existing_id: Option<&str>,
    ) -> RepoResult<Article> {
        let article = draft.finalize(existing_id, Timestamp::now())?;
        Ok(self.save(&article).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
