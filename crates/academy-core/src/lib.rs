//! # academy-core: Pure Domain Logic for the Academy Site
//!
//! This crate holds the content model of the Academy site (articles,
//! podcast episodes, videos, leads, site settings) and every rule that can
//! be checked without touching storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Academy Site Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Pages and Admin Forms (UI)                      │   │
//! │  │   Home ──► Blog Hub ──► Article ──► Admin Editor ──► Leads      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ typed repository calls                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ academy-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   draft   │  │   query   │  │ validation│  │   │
//! │  │   │  Article  │  │  editor   │  │  filters  │  │   rules   │  │   │
//! │  │   │   Lead    │  │  defaults │  │  sorting  │  │   slug    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  academy-db (Storage Layer)                     │   │
//! │  │       schema registry, transactions, repositories, seeder       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities, [`ContentStatus`], [`Timestamp`], the [`Content`] trait
//! - [`draft`] - Editor input finalized into records with defaults applied
//! - [`query`] - In-memory filtering and ordering used by list pages
//! - [`slug`] - Slug generation from titles
//! - [`validation`] - Record rules and the [`Validate`](validation::Validate) trait
//! - [`error`] - [`ValidationError`]
//!
//! ## Example Usage
//!
//! ```rust
//! use academy_core::draft::ArticleDraft;
//! use academy_core::{Timestamp, DEFAULT_AUTHOR};
//!
//! let draft = ArticleDraft {
//!     title: "Lean Canvas Guide".to_string(),
//!     content: "## Step 1".to_string(),
//!     ..ArticleDraft::default()
//! };
//!
//! let article = draft.finalize(None, Timestamp::from_millis(0)).unwrap();
//! assert_eq!(article.slug, "lean-canvas-guide");
//! assert_eq!(article.author, DEFAULT_AUTHOR);
//! assert!(article.id.starts_with("art_"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod draft;
pub mod error;
pub mod query;
pub mod slug;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ValidationError, ValidationResult};
pub use types::*;
pub use validation::Validate;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Primary key of the single [`SiteSettings`] row.
pub const SETTINGS_ID: &str = "global";

/// Author written on articles saved without one.
pub const DEFAULT_AUTHOR: &str = "تیم آکادمی";

/// Featured image used when an editor leaves the field blank.
pub const DEFAULT_FEATURED_IMAGE: &str = "https://picsum.photos/seed/placeholder/800/600";

/// Lead source tag for the newsletter page.
pub const LEAD_SOURCE_NEWSLETTER: &str = "newsletter_page";

/// Lead source tag for the contact form.
pub const LEAD_SOURCE_CONTACT: &str = "contact_form";

/// Name recorded for newsletter subscribers (the form only asks for email).
pub const NEWSLETTER_LEAD_NAME: &str = "کاربر خبرنامه";

/// The four content pillars, in display order.
///
/// ## Stored Values
/// Articles store the label itself in `pillar`, and the `by-pillar` index
/// is keyed on it. The third label is spelled with an Arabic yeh (`ي`)
/// in existing data; keep it byte-for-byte or index lookups miss.
pub const PILLARS: [&str; 4] = [
    "طراحی مدل کسب‌وکار",
    "سیستم‌های رشد و بازاریابی",
    "مقياس‌پذیری و سیستم‌سازی",
    "رهبری و تصمیم‌گیری استراتژیک",
];

/// URL keys for the blog hub filter, parallel to [`PILLARS`].
pub const PILLAR_KEYS: [&str; 4] = ["business-model", "marketing", "systemization", "leadership"];

/// Resolves a blog hub URL key to its pillar label.
///
/// ```rust
/// use academy_core::{pillar_for_key, PILLARS};
///
/// assert_eq!(pillar_for_key("marketing"), Some(PILLARS[1]));
/// assert_eq!(pillar_for_key("cooking"), None);
/// ```
pub fn pillar_for_key(key: &str) -> Option<&'static str> {
    PILLAR_KEYS
        .iter()
        .position(|k| *k == key)
        .map(|i| PILLARS[i])
}
