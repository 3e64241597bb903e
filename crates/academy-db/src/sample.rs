//! # Sample Dataset
//!
//! The fixed content a fresh site starts with: 10 articles, 3 podcast
//! episodes, 2 videos and the default settings row.
//!
//! The records live in `data/sample.json`, compiled into the binary.
//! Instead of a `publishedAt` each entry carries an `ageMs`, and the
//! timestamp is computed relative to the moment the dataset is built, so
//! a freshly seeded site always shows recent content.
//!
//! ```text
//! { "id": "a1", ..., "ageMs": 10000000 }
//!              │
//!              ▼  now - ageMs
//! Article { id: "a1", ..., published_at: now - 10_000_000 }
//! ```

use academy_core::{Article, Podcast, SiteSettings, Timestamp, Video};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{DbError, DbResult};

const SAMPLE_JSON: &str = include_str!("../data/sample.json");

/// A complete set of records for the Seeder to write.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleData {
    pub articles: Vec<Article>,
    pub podcasts: Vec<Podcast>,
    pub videos: Vec<Video>,
    pub settings: SiteSettings,
}

#[derive(Deserialize)]
struct RawSample {
    articles: Vec<Value>,
    podcasts: Vec<Value>,
    videos: Vec<Value>,
    settings: SiteSettings,
}

impl SampleData {
    /// The built-in dataset, dated relative to `now`.
    pub fn standard(now: Timestamp) -> DbResult<SampleData> {
        let raw: RawSample = serde_json::from_str(SAMPLE_JSON)?;

        Ok(SampleData {
            articles: dated(raw.articles, now)?,
            podcasts: dated(raw.podcasts, now)?,
            videos: dated(raw.videos, now)?,
            settings: raw.settings,
        })
    }
}

/// Replaces each entry's `ageMs` with a `publishedAt` of `now - ageMs`.
fn dated<T: DeserializeOwned>(entries: Vec<Value>, now: Timestamp) -> DbResult<Vec<T>> {
    entries
        .into_iter()
        .map(|mut entry| {
            let object = entry
                .as_object_mut()
                .ok_or_else(|| DbError::Serialization("sample entry is not an object".to_string()))?;
            let age = object
                .remove("ageMs")
                .and_then(|v| v.as_i64())
                .ok_or_else(|| DbError::Serialization("sample entry has no ageMs".to_string()))?;
            object.insert(
                "publishedAt".to_string(),
                Value::from(now.minus_millis(age).millis()),
            );
            Ok(serde_json::from_value(entry)?)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::{Content, Validate, PILLARS, SETTINGS_ID};
    use std::collections::HashSet;

    const NOW: Timestamp = Timestamp::from_millis(1_700_000_000_000);

    #[test]
    fn test_standard_counts() {
        let data = SampleData::standard(NOW).unwrap();
        assert_eq!(data.articles.len(), 10);
        assert_eq!(data.podcasts.len(), 3);
        assert_eq!(data.videos.len(), 2);
        assert_eq!(data.settings.id, SETTINGS_ID);
    }

    #[test]
    fn test_ids_and_slugs() {
        let data = SampleData::standard(NOW).unwrap();
        let ids: Vec<_> = data.articles.iter().map(|a| a.id.as_str()).collect();
        let expected: Vec<String> = (1..=10).map(|n| format!("a{n}")).collect();
        assert_eq!(ids, expected);

        let podcast_ids: Vec<_> = data.podcasts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(podcast_ids, vec!["p1", "p2", "p3"]);

        let slugs: HashSet<_> = data.articles.iter().map(|a| a.slug()).collect();
        assert_eq!(slugs.len(), 10);
    }

    #[test]
    fn test_every_record_validates() {
        let data = SampleData::standard(NOW).unwrap();
        for a in &data.articles {
            a.validate().unwrap();
            assert!(PILLARS.contains(&a.pillar.as_str()));
        }
        for p in &data.podcasts {
            p.validate().unwrap();
        }
        for v in &data.videos {
            v.validate().unwrap();
        }
        data.settings.validate().unwrap();
    }

    #[test]
    fn test_dates_are_relative_to_now() {
        let data = SampleData::standard(NOW).unwrap();
        assert_eq!(data.articles[0].published_at, NOW.minus_millis(10_000_000));
        assert!(data.articles.iter().all(|a| a.published_at < NOW));
        assert!(data.videos.iter().all(|v| v.published_at < NOW));
    }

    #[test]
    fn test_settings_match_defaults() {
        let data = SampleData::standard(NOW).unwrap();
        assert_eq!(data.settings, SiteSettings::default());
    }
}
