//! The single site settings row.
//!
//! There is exactly one settings record, keyed `"global"`. It can be read
//! and replaced but never deleted.

use academy_core::{SiteSettings, Validate, SETTINGS_ID};
use tracing::{debug, info};

use crate::error::{DbResult, RepoResult};
use crate::pool::Database;
use crate::record::Record;

/// Repository for the site settings row.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    db: Database,
}

impl SettingsRepository {
    pub fn new(db: Database) -> Self {
        SettingsRepository { db }
    }

    /// The stored settings, `None` before the first seed or save.
    pub async fn get(&self) -> DbResult<Option<SiteSettings>> {
        self.db.get(SiteSettings::STORE, SETTINGS_ID).await
    }

    /// The stored settings, or the built-in defaults when none are stored.
    pub async fn get_or_default(&self) -> DbResult<SiteSettings> {
        match self.get().await? {
            Some(settings) => Ok(settings),
            None => {
                debug!("No settings stored, using defaults");
                Ok(SiteSettings::default())
            }
        }
    }

    /// Replaces the settings row.
    ///
    /// The id is always forced to `"global"`, whatever the form sent.
    pub async fn update(&self, mut settings: SiteSettings) -> RepoResult<SiteSettings> {
        settings.id = SETTINGS_ID.to_string();
        settings.validate()?;

        self.db.put(SiteSettings::STORE, &settings).await?;

        info!(
            primary_color = %settings.primary_color,
            font_family = %settings.font_family,
            "Site settings updated"
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;
    use crate::pool::DbConfig;

    async fn repo() -> SettingsRepository {
        Database::open(DbConfig::in_memory()).await.unwrap().settings()
    }

    #[tokio::test]
    async fn test_defaults_when_empty() {
        let repo = repo().await;
        assert_eq!(repo.get().await.unwrap(), None);
        assert_eq!(repo.get_or_default().await.unwrap(), SiteSettings::default());
    }

    #[tokio::test]
    async fn test_update_forces_global_id() {
        let repo = repo().await;
        let settings = SiteSettings {
            id: "other".to_string(),
            primary_color: "#123456".to_string(),
            show_faq: false,
            ..SiteSettings::default()
        };

        let stored = repo.update(settings).await.unwrap();
        assert_eq!(stored.id, SETTINGS_ID);
        assert_eq!(repo.get().await.unwrap(), Some(stored));
        assert_eq!(repo.db.count(SiteSettings::STORE).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_rejects_bad_colour() {
        let repo = repo().await;
        let settings = SiteSettings {
            primary_color: "blue".to_string(),
            ..SiteSettings::default()
        };

        assert!(matches!(repo.update(settings).await, Err(RepoError::Validation(_))));
        assert_eq!(repo.get().await.unwrap(), None);
    }
}
