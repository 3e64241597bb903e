//! # Drafts
//!
//! Raw form input and the rules that turn it into a storable record.
//!
//! ## Article Editor Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ArticleDraft (what the editor typed, blanks allowed)                   │
//! │        │                                                                │
//! │        │ finalize(existing_id, now)                                     │
//! │        ▼                                                                │
//! │  ┌──────────────────────┬──────────────────────────────────────────┐   │
//! │  │ field blank          │ becomes                                  │   │
//! │  ├──────────────────────┼──────────────────────────────────────────┤   │
//! │  │ id (new article)     │ art_<uuid>                               │   │
//! │  │ slug                 │ generate_slug(title)                     │   │
//! │  │ pillar               │ PILLARS[0]                               │   │
//! │  │ author               │ DEFAULT_AUTHOR                           │   │
//! │  │ published_at         │ now                                      │   │
//! │  │ featured_image       │ DEFAULT_FEATURED_IMAGE                   │   │
//! │  │ seo_title            │ title                                    │   │
//! │  │ seo_description      │ excerpt                                  │   │
//! │  │ tags_input           │ "a, b,,c " → ["a", "b", "c"]             │   │
//! │  └──────────────────────┴──────────────────────────────────────────┘   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Article (complete, still needs Validate + slug uniqueness check)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Deserialize;
use uuid::Uuid;

use crate::error::ValidationResult;
use crate::slug::generate_slug;
use crate::types::{Article, ContentStatus, Lead, Timestamp};
use crate::validation::validate_required;
use crate::{
    DEFAULT_AUTHOR, DEFAULT_FEATURED_IMAGE, LEAD_SOURCE_CONTACT, LEAD_SOURCE_NEWSLETTER,
    NEWSLETTER_LEAD_NAME, PILLARS,
};

// =============================================================================
// Id Generation
// =============================================================================

/// New primary key for an editor-created article.
pub fn new_article_id() -> String {
    format!("art_{}", Uuid::new_v4().simple())
}

/// New primary key for a captured lead.
pub fn new_lead_id() -> String {
    format!("lead_{}", Uuid::new_v4().simple())
}

/// Splits a comma-separated tag field, trimming and dropping empties.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Article Draft
// =============================================================================

/// The article editor's form state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticleDraft {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub pillar: String,
    /// Comma-separated, as typed.
    pub tags_input: String,
    pub author: String,
    /// Kept when editing so re-saving does not bump the article.
    pub published_at: Option<Timestamp>,
    pub status: ContentStatus,
    pub featured_image: String,
    pub seo_title: String,
    pub seo_description: String,
}

impl ArticleDraft {
    /// Loads an existing article into the editor.
    pub fn from_article(article: &Article) -> Self {
        ArticleDraft {
            title: article.title.clone(),
            slug: article.slug.clone(),
            content: article.content.clone(),
            excerpt: article.excerpt.clone(),
            pillar: article.pillar.clone(),
            tags_input: article.tags.join(", "),
            author: article.author.clone(),
            published_at: Some(article.published_at),
            status: article.status,
            featured_image: article.featured_image.clone(),
            seo_title: article.seo_title.clone(),
            seo_description: article.seo_description.clone(),
        }
    }

    /// Builds the record to store.
    ///
    /// `existing_id` is the id being edited, or `None` for a new article.
    ///
    /// ## Errors
    /// `Required` when the title or content is blank. Nothing else is
    /// checked here; the repository validates the finished record.
    pub fn finalize(self, existing_id: Option<&str>, now: Timestamp) -> ValidationResult<Article> {
        validate_required("title", &self.title)?;
        validate_required("content", &self.content)?;

        let id = match existing_id {
            Some(id) => id.to_string(),
            None => new_article_id(),
        };
        let slug = or_else(self.slug, || generate_slug(&self.title));
        let seo_title = or_else(self.seo_title, || self.title.clone());
        let seo_description = or_else(self.seo_description, || self.excerpt.clone());

        Ok(Article {
            id,
            slug,
            tags: parse_tags(&self.tags_input),
            pillar: or_else(self.pillar, || PILLARS[0].to_string()),
            author: or_else(self.author, || DEFAULT_AUTHOR.to_string()),
            published_at: self.published_at.unwrap_or(now),
            status: self.status,
            featured_image: or_else(self.featured_image, || DEFAULT_FEATURED_IMAGE.to_string()),
            seo_title,
            seo_description,
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
        })
    }
}

fn or_else(value: String, fallback: impl FnOnce() -> String) -> String {
    if value.trim().is_empty() {
        fallback()
    } else {
        value
    }
}

// =============================================================================
// New Lead
// =============================================================================

/// A lead as submitted by a public form, before it gets an id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub source: String,
}

impl NewLead {
    /// Newsletter signup: only the email is asked for.
    pub fn newsletter(email: impl Into<String>) -> Self {
        NewLead {
            name: NEWSLETTER_LEAD_NAME.to_string(),
            email: email.into(),
            source: LEAD_SOURCE_NEWSLETTER.to_string(),
        }
    }

    /// Contact form submission.
    pub fn contact(name: impl Into<String>, email: impl Into<String>) -> Self {
        NewLead {
            name: name.into(),
            email: email.into(),
            source: LEAD_SOURCE_CONTACT.to_string(),
        }
    }

    /// Assigns an id and capture time. Name and email are trimmed.
    pub fn into_lead(self, now: Timestamp) -> Lead {
        Lead {
            id: new_lead_id(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            source: self.source,
            created_at: now,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationError;

    fn draft() -> ArticleDraft {
        ArticleDraft {
            title: "Lean Canvas Guide".to_string(),
            content: "## Step 1".to_string(),
            excerpt: "Nine boxes".to_string(),
            tags_input: " lean, canvas ,, strategy ".to_string(),
            ..ArticleDraft::default()
        }
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_tags(" , ").is_empty());
    }

    #[test]
    fn test_finalize_new_applies_defaults() {
        let now = Timestamp::from_millis(42);
        let a = draft().finalize(None, now).unwrap();

        assert!(a.id.starts_with("art_"));
        assert_eq!(a.slug, "lean-canvas-guide");
        assert_eq!(a.pillar, PILLARS[0]);
        assert_eq!(a.author, DEFAULT_AUTHOR);
        assert_eq!(a.published_at, now);
        assert_eq!(a.status, ContentStatus::Draft);
        assert_eq!(a.featured_image, DEFAULT_FEATURED_IMAGE);
        assert_eq!(a.seo_title, "Lean Canvas Guide");
        assert_eq!(a.seo_description, "Nine boxes");
        assert_eq!(a.tags, vec!["lean", "canvas", "strategy"]);
    }

    #[test]
    fn test_finalize_new_ids_differ() {
        let now = Timestamp::from_millis(1);
        let a = draft().finalize(None, now).unwrap();
        let b = draft().finalize(None, now).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_finalize_edit_keeps_id_and_date() {
        let original = draft().finalize(Some("a3"), Timestamp::from_millis(5)).unwrap();
        let mut edited = ArticleDraft::from_article(&original);
        edited.status = ContentStatus::Published;

        let a = edited.finalize(Some("a3"), Timestamp::from_millis(999)).unwrap();
        assert_eq!(a.id, "a3");
        assert_eq!(a.published_at, Timestamp::from_millis(5));
        assert_eq!(a.status, ContentStatus::Published);
        assert_eq!(a.tags, original.tags);
    }

    #[test]
    fn test_finalize_requires_title_and_content() {
        let mut d = draft();
        d.title = " ".to_string();
        assert_eq!(
            d.finalize(None, Timestamp::from_millis(0)),
            Err(ValidationError::required("title"))
        );

        let mut d = draft();
        d.content = String::new();
        assert_eq!(
            d.finalize(None, Timestamp::from_millis(0)),
            Err(ValidationError::required("content"))
        );
    }

    #[test]
    fn test_new_lead_constructors() {
        let lead = NewLead::newsletter(" reader@example.com ").into_lead(Timestamp::from_millis(7));
        assert!(lead.id.starts_with("lead_"));
        assert_eq!(lead.name, NEWSLETTER_LEAD_NAME);
        assert_eq!(lead.email, "reader@example.com");
        assert_eq!(lead.source, LEAD_SOURCE_NEWSLETTER);
        assert_eq!(lead.created_at, Timestamp::from_millis(7));

        let lead = NewLead::contact("Sara", "sara@example.com").into_lead(Timestamp::from_millis(8));
        assert_eq!(lead.source, LEAD_SOURCE_CONTACT);
    }
}
