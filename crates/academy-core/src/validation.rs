//! # Validation Module
//!
//! Input validation for records coming from admin forms and public forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (page layer)                                            │
//! │  ├── Basic checks (empty fields)                                       │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (record rules, no I/O)                           │
//! │  ├── Required fields, slug / email / colour formats                    │
//! │  └── Pillar must be a known pillar                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Repository (academy-db)                                      │
//! │  └── Slug uniqueness against the by-slug index, before the write       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use academy_core::validation::{validate_email, validate_slug};
//!
//! validate_slug("lean-canvas-guide").unwrap();
//! validate_email("reader@example.com").unwrap();
//! assert!(validate_slug("has space").is_err());
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::{Article, Lead, Podcast, SiteSettings, Video};
use crate::{PILLARS, SETTINGS_ID};

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 200;

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 300;

/// Maximum email length (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

// =============================================================================
// Validate Trait
// =============================================================================

/// A record that can check itself before it is written.
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

impl Validate for Article {
    fn validate(&self) -> ValidationResult<()> {
        validate_id(&self.id)?;
        validate_title(&self.title)?;
        validate_required("content", &self.content)?;
        validate_slug(&self.slug)?;
        validate_pillar(&self.pillar)
    }
}

impl Validate for Podcast {
    fn validate(&self) -> ValidationResult<()> {
        validate_id(&self.id)?;
        validate_title(&self.title)?;
        validate_slug(&self.slug)?;
        validate_required("audioUrl", &self.audio_url)
    }
}

impl Validate for Video {
    fn validate(&self) -> ValidationResult<()> {
        validate_id(&self.id)?;
        validate_title(&self.title)?;
        validate_slug(&self.slug)?;
        validate_required("videoUrl", &self.video_url)
    }
}

impl Validate for Lead {
    fn validate(&self) -> ValidationResult<()> {
        validate_id(&self.id)?;
        validate_required("name", &self.name)?;
        validate_email(&self.email)?;
        validate_required("source", &self.source)
    }
}

impl Validate for SiteSettings {
    fn validate(&self) -> ValidationResult<()> {
        if self.id != SETTINGS_ID {
            return Err(ValidationError::NotAllowed {
                field: "id".to_string(),
                allowed: vec![SETTINGS_ID.to_string()],
            });
        }
        validate_hex_color(&self.primary_color)?;
        validate_required("fontFamily", &self.font_family)
    }
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a field is not blank.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Validates a primary key.
pub fn validate_id(id: &str) -> ValidationResult<()> {
    validate_required("id", id)
}

/// Validates a title.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_TITLE_LEN`] characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    validate_required("title", title)?;

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: MAX_TITLE_LEN,
        });
    }

    Ok(())
}

/// Validates a slug (URL segment).
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_SLUG_LEN`] characters
/// - No whitespace and none of `/ ? # %`
///
/// Uniqueness is checked by the repository, not here.
///
/// ## Example
/// ```rust
/// use academy_core::validation::validate_slug;
///
/// assert!(validate_slug("ep1-entrepreneur-mindset").is_ok());
/// assert!(validate_slug("").is_err());
/// assert!(validate_slug("a/b").is_err());
/// ```
pub fn validate_slug(slug: &str) -> ValidationResult<()> {
    if slug.is_empty() {
        return Err(ValidationError::required("slug"));
    }

    if slug.chars().count() > MAX_SLUG_LEN {
        return Err(ValidationError::TooLong {
            field: "slug".to_string(),
            max: MAX_SLUG_LEN,
        });
    }

    if slug
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%'))
    {
        return Err(ValidationError::invalid(
            "slug",
            "must not contain whitespace or any of / ? # %",
        ));
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot and does not start or end with one
/// - No whitespace, at most [`MAX_EMAIL_LEN`] characters
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    let invalid = || ValidationError::invalid("email", "must look like name@example.com");

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a CSS hex colour (`#rgb` or `#rrggbb`).
pub fn validate_hex_color(color: &str) -> ValidationResult<()> {
    let hex = color
        .strip_prefix('#')
        .ok_or_else(|| ValidationError::invalid("primaryColor", "must start with #"))?;

    if !matches!(hex.len(), 3 | 6) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::invalid(
            "primaryColor",
            "must be #rgb or #rrggbb",
        ));
    }

    Ok(())
}

/// Validates that a pillar is one of the four site pillars.
pub fn validate_pillar(pillar: &str) -> ValidationResult<()> {
    if PILLARS.contains(&pillar) {
        return Ok(());
    }

    Err(ValidationError::NotAllowed {
        field: "pillar".to_string(),
        allowed: PILLARS.iter().map(|p| p.to_string()).collect(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentStatus, Timestamp};

    fn article() -> Article {
        Article {
            id: "a1".to_string(),
            title: "Lean Canvas".to_string(),
            slug: "lean-canvas-guide".to_string(),
            content: "## Intro".to_string(),
            excerpt: "short".to_string(),
            pillar: PILLARS[0].to_string(),
            tags: vec!["lean".to_string()],
            author: "Team".to_string(),
            published_at: Timestamp::from_millis(1),
            status: ContentStatus::Draft,
            featured_image: "https://example.com/x.jpg".to_string(),
            seo_title: "Lean Canvas".to_string(),
            seo_description: "short".to_string(),
        }
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("startup-kpis").is_ok());
        assert!(validate_slug("سیستمسازی-کسبوکار").is_ok());
        assert!(matches!(
            validate_slug(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_slug("two words").is_err());
        assert!(validate_slug("a?b").is_err());
        assert!(matches!(
            validate_slug(&"a".repeat(MAX_SLUG_LEN + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("reader@example.com").is_ok());
        assert!(validate_email("  reader@example.com ").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("reader").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("reader@localhost").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("re ader@example.com").is_err());
    }

    #[test]
    fn test_validate_hex_color() {
        assert!(validate_hex_color("#0f172a").is_ok());
        assert!(validate_hex_color("#FFF").is_ok());
        assert!(validate_hex_color("0f172a").is_err());
        assert!(validate_hex_color("#12345").is_err());
        assert!(validate_hex_color("#zzzzzz").is_err());
    }

    #[test]
    fn test_validate_pillar() {
        for pillar in PILLARS {
            assert!(validate_pillar(pillar).is_ok());
        }
        assert!(matches!(
            validate_pillar("Cooking"),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_article_rules() {
        assert!(article().validate().is_ok());

        let mut a = article();
        a.content = "   ".to_string();
        assert_eq!(a.validate(), Err(ValidationError::required("content")));

        let mut a = article();
        a.pillar = "Other".to_string();
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_settings_rules() {
        assert!(SiteSettings::default().validate().is_ok());

        let mut s = SiteSettings::default();
        s.id = "other".to_string();
        assert!(s.validate().is_err());

        let mut s = SiteSettings::default();
        s.primary_color = "blue".to_string();
        assert!(s.validate().is_err());
    }
}
