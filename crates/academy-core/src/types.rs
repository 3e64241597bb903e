//! # Domain Types
//!
//! Core domain types used throughout the Academy site.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Article      │   │    Podcast      │   │     Video       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (key)       │   │  id (key)       │   │  id (key)       │       │
//! │  │  slug (unique)  │   │  slug (unique)  │   │  slug (unique)  │       │
//! │  │  pillar, tags   │   │  audioUrl       │   │  videoUrl       │       │
//! │  │  status         │   │  status         │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │           └──────────── impl Content ──────────────┘                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Lead       │   │  SiteSettings   │   │ ContentStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (key)       │   │  id = "global"  │   │  Draft          │       │
//! │  │  email, source  │   │  hero, colours  │   │  Published      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persisted Layout
//! Field names serialize in camelCase (`publishedAt`, `featuredImage`, ...)
//! and timestamps as integer milliseconds. Existing stored documents decode
//! unchanged, so do not rename fields here without a schema revision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::{DEFAULT_FEATURED_IMAGE, SETTINGS_ID};

// =============================================================================
// Timestamp
// =============================================================================

/// A point in time as milliseconds since the Unix epoch.
///
/// Stored as a plain integer so a record read back is bit-for-bit the
/// record that was written. Only used for ordering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from epoch milliseconds.
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// The current wall-clock time, truncated to milliseconds.
    pub fn now() -> Self {
        Timestamp(Utc::now().timestamp_millis())
    }

    /// Returns the epoch milliseconds.
    #[inline]
    pub const fn millis(&self) -> i64 {
        self.0
    }

    /// Returns a timestamp `millis` earlier than this one.
    #[inline]
    pub const fn minus_millis(self, millis: i64) -> Self {
        Timestamp(self.0.saturating_sub(millis))
    }

    /// Converts to a chrono `DateTime` (None if out of chrono's range).
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp(dt.timestamp_millis())
    }
}

// =============================================================================
// Content Status
// =============================================================================

/// Publication state of an article, podcast episode or video.
///
/// Exactly two values exist; anything else is rejected on parse and on
/// deserialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    /// Visible in the admin console only.
    #[default]
    Draft,
    /// Visible on the public site.
    Published,
}

impl ContentStatus {
    /// The stored string form, also the `by-status` index value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ContentStatus::Draft),
            "published" => Ok(ContentStatus::Published),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec!["draft".to_string(), "published".to_string()],
            }),
        }
    }
}

// =============================================================================
// Article
// =============================================================================

/// A long-form article, grouped by pillar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Primary key (`a1` for samples, `art_<uuid>` for editor-created rows).
    pub id: String,
    pub title: String,
    /// URL segment; unique across articles.
    pub slug: String,
    /// Markdown body.
    pub content: String,
    pub excerpt: String,
    /// Content category, one of [`crate::PILLARS`].
    pub pillar: String,
    /// Ordered tag list.
    pub tags: Vec<String>,
    pub author: String,
    #[ts(type = "number")]
    pub published_at: Timestamp,
    pub status: ContentStatus,
    pub featured_image: String,
    pub seo_title: String,
    pub seo_description: String,
}

// =============================================================================
// Podcast
// =============================================================================

/// A podcast episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Podcast {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub audio_url: String,
    /// Display duration, e.g. `"45:20"`.
    pub duration: String,
    #[ts(type = "number")]
    pub published_at: Timestamp,
    pub status: ContentStatus,
    pub featured_image: String,
}

// =============================================================================
// Video
// =============================================================================

/// A video lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub video_url: String,
    #[ts(type = "number")]
    pub published_at: Timestamp,
    pub status: ContentStatus,
    pub featured_image: String,
}

// =============================================================================
// Lead
// =============================================================================

/// A visitor captured by the newsletter or contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Capture origin, e.g. [`crate::LEAD_SOURCE_NEWSLETTER`].
    pub source: String,
    #[ts(type = "number")]
    pub created_at: Timestamp,
}

// =============================================================================
// Site Settings
// =============================================================================

/// The single site-wide settings row, always keyed by [`SETTINGS_ID`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub id: String,
    /// CSS hex colour, e.g. `#0f172a`.
    pub primary_color: String,
    pub font_family: String,
    pub hero_title: String,
    pub hero_subtitle: String,
    pub show_testimonials: bool,
    #[serde(rename = "showFAQ")]
    pub show_faq: bool,
}

impl Default for SiteSettings {
    /// The row written by the seeder on first run.
    fn default() -> Self {
        SiteSettings {
            id: SETTINGS_ID.to_string(),
            primary_color: "#0f172a".to_string(),
            font_family: "Inter".to_string(),
            hero_title: "از ایده تا رشد پایدار در ۱۲ ماه".to_string(),
            hero_subtitle: "آکادمی توسعه کسب‌وکار با رویکرد داده‌محور و چارچوب‌های اجرایی برای کارآفرینان و مدیران.".to_string(),
            show_testimonials: true,
            show_faq: true,
        }
    }
}

// =============================================================================
// Content Trait
// =============================================================================

/// What articles, podcast episodes and videos have in common.
///
/// Repositories use this to share slug checks and recency ordering
/// across the three content stores.
pub trait Content {
    /// Lower-case entity name for logs and messages.
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn slug(&self) -> &str;
    fn status(&self) -> ContentStatus;
    fn published_at(&self) -> Timestamp;
    fn featured_image_mut(&mut self) -> &mut String;

    fn is_published(&self) -> bool {
        self.status() == ContentStatus::Published
    }

    /// Fills defaults for fields a form may leave blank.
    ///
    /// A blank `featuredImage` becomes [`DEFAULT_FEATURED_IMAGE`].
    fn fill_defaults(&mut self) {
        let image = self.featured_image_mut();
        if image.trim().is_empty() {
            *image = DEFAULT_FEATURED_IMAGE.to_string();
        }
    }
}

impl Content for Article {
    const KIND: &'static str = "article";

    fn id(&self) -> &str {
        &self.id
    }
    fn slug(&self) -> &str {
        &self.slug
    }
    fn status(&self) -> ContentStatus {
        self.status
    }
    fn published_at(&self) -> Timestamp {
        self.published_at
    }
    fn featured_image_mut(&mut self) -> &mut String {
        &mut self.featured_image
    }
}

impl Content for Podcast {
    const KIND: &'static str = "podcast";

    fn id(&self) -> &str {
        &self.id
    }
    fn slug(&self) -> &str {
        &self.slug
    }
    fn status(&self) -> ContentStatus {
        self.status
    }
    fn published_at(&self) -> Timestamp {
        self.published_at
    }
    fn featured_image_mut(&mut self) -> &mut String {
        &mut self.featured_image
    }
}

impl Content for Video {
    const KIND: &'static str = "video";

    fn id(&self) -> &str {
        &self.id
    }
    fn slug(&self) -> &str {
        &self.slug
    }
    fn status(&self) -> ContentStatus {
        self.status
    }
    fn published_at(&self) -> Timestamp {
        self.published_at
    }
    fn featured_image_mut(&mut self) -> &mut String {
        &mut self.featured_image
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
