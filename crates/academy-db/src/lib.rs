//! # academy-db: Storage Layer for the Academy Site
//!
//! An embedded, schema-defined, indexed record store that every page reads
//! from and every admin form writes to, plus the one-time seeder that
//! fills it with sample content.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Academy Data Flow                               │
//! │                                                                         │
//! │  Page / admin form / lead form          Process start                  │
//! │       │                                      │                          │
//! │       │                                      ▼                          │
//! │       │                              seed::start(cell, mode)            │
//! │       ▼                                      │                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   academy-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌───────────────┐    │   │
//! │  │   │  Repositories │   │   Database    │   │    Schema     │    │   │
//! │  │   │ (repository/) │──►│   (pool.rs)   │◄──│  (schema.rs)  │    │   │
//! │  │   │               │   │               │   │               │    │   │
//! │  │   │ Articles      │   │ Transactions  │   │ 5 stores      │    │   │
//! │  │   │ Podcasts      │   │ Store locks   │   │ key paths     │    │   │
//! │  │   │ Videos, Leads │   │ Open-once     │   │ indexes       │    │   │
//! │  │   │ Settings      │   │ cell          │   │               │    │   │
//! │  │   └───────────────┘   └───────────────┘   └───────────────┘    │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   one table per store: pk, JSON doc, one column per index       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`schema`] - Store and index declarations, generated SQL
//! - [`migrations`] - Applying the schema at open time
//! - [`pool`] - Opening the database, the shared handle, the open-once cell
//! - [`transaction`] - Store-scoped transactions
//! - [`repository`] - Typed repositories pages call
//! - [`sample`] / [`seed`] - Sample dataset and the Seeder
//! - [`config`] - File and environment configuration
//! - [`error`] - Storage and repository error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use academy_db::{seed, AppConfig, DatabaseCell};
//!
//! let config = AppConfig::load(None)?;
//! let cell = DatabaseCell::new(config.db_config()?);
//! let startup = seed::start(&cell, config.seed_mode()).await?;
//!
//! let latest = startup.db.articles().latest_published(3).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
mod lock;
pub mod migrations;
pub mod pool;
pub mod record;
pub mod repository;
pub mod sample;
pub mod schema;
pub mod seed;
pub mod transaction;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, ConfigError, SeedMode};
pub use error::{DbError, DbResult, RepoError, RepoResult};
pub use pool::{ContentCounts, Database, DatabaseCell, DbConfig};
pub use record::Record;
pub use sample::SampleData;
pub use schema::{indexes, stores, SCHEMA};
pub use seed::{seed_database, seed_with, SeedOutcome, Startup};
pub use transaction::{Transaction, TxMode};

// Repository re-exports for convenience
pub use repository::{
    ArticleRepository, ContentRepository, LeadRepository, PodcastRepository, SettingsRepository,
    VideoRepository,
};
