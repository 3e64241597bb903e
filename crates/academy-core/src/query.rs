//! # List Queries
//!
//! In-memory filtering and ordering for list pages. Pages fetch a whole
//! store (or one index bucket) and narrow it here; there is no paging.

use crate::types::{Article, Content, Lead};

/// Sorts content newest first. Ties are broken by id for stable output.
pub fn sort_newest_first<T: Content>(items: &mut [T]) {
    items.sort_by(|a, b| {
        b.published_at()
            .cmp(&a.published_at())
            .then_with(|| a.id().cmp(b.id()))
    });
}

/// Sorts leads by capture time, newest first.
pub fn sort_leads_newest_first(leads: &mut [Lead]) {
    leads.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

fn contains_folded(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Lower-cases a search box value; an empty box means "no filter".
///
/// Whitespace is kept as typed, so `"  "` only matches text containing
/// two spaces.
fn normalize_term(term: &str) -> Option<String> {
    (!term.is_empty()).then(|| term.to_lowercase())
}

// =============================================================================
// Public Blog Filter
// =============================================================================

/// The blog hub's pillar dropdown plus search box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleQuery {
    /// Exact pillar label; `None` shows every pillar.
    pub pillar: Option<String>,
    /// Case-insensitive match on title, excerpt or any tag.
    pub term: Option<String>,
}

impl ArticleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pillar(mut self, pillar: impl Into<String>) -> Self {
        self.pillar = Some(pillar.into());
        self
    }

    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn matches(&self, article: &Article) -> bool {
        if let Some(pillar) = &self.pillar {
            if &article.pillar != pillar {
                return false;
            }
        }

        match self.term.as_deref().and_then(normalize_term) {
            Some(term) => {
                contains_folded(&article.title, &term)
                    || contains_folded(&article.excerpt, &term)
                    || article.tags.iter().any(|t| contains_folded(t, &term))
            }
            None => true,
        }
    }

    /// Keeps matching articles, preserving input order.
    pub fn apply(&self, articles: Vec<Article>) -> Vec<Article> {
        articles.into_iter().filter(|a| self.matches(a)).collect()
    }
}

// =============================================================================
// Admin Search
// =============================================================================

/// Admin article list search: title or pillar.
pub fn search_articles<'a>(articles: &'a [Article], term: &str) -> Vec<&'a Article> {
    let Some(term) = normalize_term(term) else {
        return articles.iter().collect();
    };
    articles
        .iter()
        .filter(|a| contains_folded(&a.title, &term) || contains_folded(&a.pillar, &term))
        .collect()
}

/// Admin lead list search: name, email or source.
pub fn search_leads(leads: Vec<Lead>, term: &str) -> Vec<Lead> {
    let Some(term) = normalize_term(term) else {
        return leads;
    };
    leads
        .into_iter()
        .filter(|l| {
            contains_folded(&l.name, &term)
                || contains_folded(&l.email, &term)
                || contains_folded(&l.source, &term)
        })
        .collect()
}
