//! # Repository Module
//!
//! Typed accessors pages and admin forms call instead of naming stores.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    What Each Page Calls                                 │
//! │                                                                         │
//! │  Home           db.articles().latest_published(3)                      │
//! │                 db.podcasts().latest_published(2)                      │
//! │                 db.settings().get_or_default()                         │
//! │  Blog hub       db.articles().browse(&ArticleQuery)                    │
//! │  Article page   db.articles().get_by_slug(slug) + related(&a, 3)       │
//! │  Admin editor   db.articles().save_draft(draft, Some(id))              │
//! │  Newsletter     db.leads().capture(NewLead::newsletter(email))         │
//! │  Dashboard      db.content_counts()                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Repository ──► Database::transaction / get / put ...                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (one table per store)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ContentRepository`] - Articles, podcast episodes, videos
//! - [`LeadRepository`] - Lead capture and the admin lead list
//! - [`SettingsRepository`] - The single site settings row
//!
//! Reads return [`DbResult`](crate::DbResult); writes that validate input
//! return [`RepoResult`](crate::RepoResult).

pub mod content;
pub mod lead;
pub mod settings;

pub use content::{
    ArticleRepository, ContentRepository, PodcastRepository, VideoRepository,
    DEFAULT_RELATED_LIMIT,
};
pub use lead::LeadRepository;
pub use settings::SettingsRepository;
