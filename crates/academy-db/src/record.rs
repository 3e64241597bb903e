//! # Typed Records
//!
//! Binds each entity type to the store it lives in, so repositories can
//! write `tx.get::<Article>(Article::STORE, id)` without repeating names.

use academy_core::{Article, Lead, Podcast, SiteSettings, Video};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::schema::stores;

/// An entity stored as one record in one store.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name of the store holding this entity.
    const STORE: &'static str;
}

impl Record for Article {
    const STORE: &'static str = stores::ARTICLES;
}

impl Record for Podcast {
    const STORE: &'static str = stores::PODCASTS;
}

impl Record for Video {
    const STORE: &'static str = stores::VIDEOS;
}

impl Record for Lead {
    const STORE: &'static str = stores::LEADS;
}

impl Record for SiteSettings {
    const STORE: &'static str = stores::SETTINGS;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SCHEMA;

    #[test]
    fn test_every_record_store_is_registered() {
        for store in [
            Article::STORE,
            Podcast::STORE,
            Video::STORE,
            Lead::STORE,
            SiteSettings::STORE,
        ] {
            assert!(SCHEMA.store(store).is_ok(), "{store} not registered");
        }
    }
}
