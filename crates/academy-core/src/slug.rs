//! # Slug Generation
//!
//! Turns an editor-typed title into a URL segment.
//!
//! ```text
//! "Lean Canvas: A Guide"   →  "lean-canvas-a-guide"
//! "سیستم‌سازی کسب‌وکار"     →  "سیستمسازی-کسبوکار"
//! ```
//!
//! Letters and digits of any script are kept (lower-cased where the script
//! has case). Zero-width joiners are dropped so Persian compound words stay
//! one segment. Every other run of characters becomes a single hyphen.

const ZERO_WIDTH_NON_JOINER: char = '\u{200C}';
const ZERO_WIDTH_JOINER: char = '\u{200D}';

/// Generates a slug from a title.
///
/// Returns an empty string when the title has no letters or digits;
/// callers treat that as a missing slug.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c == ZERO_WIDTH_NON_JOINER || c == ZERO_WIDTH_JOINER {
            continue;
        }

        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_title() {
        assert_eq!(generate_slug("Lean Canvas: A Guide"), "lean-canvas-a-guide");
        assert_eq!(generate_slug("  B2B  Marketing -- 2024 "), "b2b-marketing-2024");
    }

    #[test]
    fn test_persian_title_keeps_letters() {
        assert_eq!(generate_slug("سیستم‌سازی کسب‌وکار"), "سیستمسازی-کسبوکار");
        assert_eq!(generate_slug("اپیزود ۱: ذهنیت"), "اپیزود-۱-ذهنیت");
    }

    #[test]
    fn test_no_letters_gives_empty() {
        assert_eq!(generate_slug("?!  --"), "");
        assert_eq!(generate_slug(""), "");
    }
}
