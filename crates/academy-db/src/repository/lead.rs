//! Lead capture and the admin lead list.

use academy_core::draft::NewLead;
use academy_core::query::{search_leads, sort_leads_newest_first};
use academy_core::{Lead, Timestamp, Validate};
use tracing::{debug, info};

use crate::error::{DbResult, RepoResult};
use crate::pool::Database;
use crate::record::Record;

/// Repository for captured leads.
#[derive(Debug, Clone)]
pub struct LeadRepository {
    db: Database,
}

impl LeadRepository {
    /// Creates a new repository over `db`.
    pub fn new(db: Database) -> Self {
        LeadRepository { db }
    }

    /// Stores a form submission as a new lead.
    ///
    /// Every submission gets a fresh id, so the same email signing up
    /// twice produces two leads.
    ///
    /// ## Errors
    /// `Validation(..)` for a blank name or a malformed email; nothing is
    /// written in that case.
    pub async fn capture(&self, submission: NewLead) -> RepoResult<Lead> {
        let lead = submission.into_lead(Timestamp::now());
        lead.validate()?;

        self.db.put(Lead::STORE, &lead).await?;

        info!(id = %lead.id, source = %lead.source, "Lead captured");
        Ok(lead)
    }

    /// Gets a lead by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Lead>> {
        self.db.get(Lead::STORE, id).await
    }

    /// Every lead, most recent first.
    pub async fn list_recent(&self) -> DbResult<Vec<Lead>> {
        let mut leads: Vec<Lead> = self.db.get_all(Lead::STORE).await?;
        sort_leads_newest_first(&mut leads);
        Ok(leads)
    }

    /// Leads whose name, email or source contains `term`, most recent
    /// first. An empty term returns every lead.
    pub async fn search(&self, term: &str) -> DbResult<Vec<Lead>> {
        let found = search_leads(self.list_recent().await?, term);
        debug!(term = %term, count = found.len(), "Lead search");
        Ok(found)
    }

    /// Deletes a lead. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let removed = self.db.delete(Lead::STORE, id).await?;
        info!(id = %id, removed, "Lead deleted");
        Ok(removed)
    }

    pub async fn count(&self) -> DbResult<u64> {
        self.db.count(Lead::STORE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;
    use crate::pool::DbConfig;
    use academy_core::{ValidationError, LEAD_SOURCE_CONTACT, LEAD_SOURCE_NEWSLETTER, NEWSLETTER_LEAD_NAME};

    async fn repo() -> LeadRepository {
        Database::open(DbConfig::in_memory()).await.unwrap().leads()
    }

    fn lead(id: &str, name: &str, email: &str, at: i64) -> Lead {
        Lead {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            source: LEAD_SOURCE_CONTACT.to_string(),
            created_at: Timestamp::from_millis(at),
        }
    }

    #[tokio::test]
    async fn test_capture_newsletter() {
        let repo = repo().await;
        let captured = repo
            .capture(NewLead::newsletter("  reader@example.com "))
            .await
            .unwrap();

        assert!(captured.id.starts_with("lead_"));
        assert_eq!(captured.email, "reader@example.com");
        assert_eq!(captured.name, NEWSLETTER_LEAD_NAME);
        assert_eq!(captured.source, LEAD_SOURCE_NEWSLETTER);
        assert_eq!(repo.get_by_id(&captured.id).await.unwrap(), Some(captured));
    }

    #[tokio::test]
    async fn test_same_email_twice_gives_two_leads() {
        let repo = repo().await;
        repo.capture(NewLead::newsletter("a@b.co")).await.unwrap();
        repo.capture(NewLead::newsletter("a@b.co")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_capture_rejects_bad_email() {
        let repo = repo().await;
        let err = repo
            .capture(NewLead::contact("Sara", "not-an-email"))
            .await
            .unwrap_err();

        assert!(matches!(err, RepoError::Validation(ValidationError::InvalidFormat { .. })));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_capture_rejects_blank_name() {
        let repo = repo().await;
        let err = repo.capture(NewLead::contact("   ", "a@b.co")).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(ValidationError::Required { .. })));
    }

    #[tokio::test]
    async fn test_list_recent_and_search() {
        let repo = repo().await;
        let db = repo.db.clone();
        db.put(Lead::STORE, &lead("l1", "Sara", "sara@example.com", 10)).await.unwrap();
        db.put(Lead::STORE, &lead("l2", "Reza", "reza@example.com", 30)).await.unwrap();
        db.put(Lead::STORE, &lead("l3", "Mina", "mina@shop.ir", 20)).await.unwrap();

        let ids = |v: Vec<Lead>| v.into_iter().map(|l| l.id).collect::<Vec<_>>();
        assert_eq!(ids(repo.list_recent().await.unwrap()), vec!["l2", "l3", "l1"]);
        assert_eq!(ids(repo.search("EXAMPLE").await.unwrap()), vec!["l2", "l1"]);
        assert_eq!(ids(repo.search("").await.unwrap()).len(), 3);
        assert!(repo.search("  ").await.unwrap().is_empty());
        assert!(repo.search("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let captured = repo.capture(NewLead::contact("Sara", "s@x.io")).await.unwrap();

        assert!(repo.delete(&captured.id).await.unwrap());
        assert!(!repo.delete(&captured.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
