//! Comment and guestbook service
//!
//! Posting and deleting comments (on pieces) and guestbook entries (on
//! exhibitions). Both families run through the same rules:
//! - posting requires a signed-in viewer and an existing target
//! - a request without content is not a submission and just goes back to
//!   the target page
//! - only the author may delete

use std::sync::Arc;

use anyhow::Context;

use crate::db::repositories::EntryRepository;
use crate::models::{CanonicalUrl, Entry, EntryKind};

use super::{assert_owner, LedgerError, Redirect, TargetDirectory, Viewer};

/// Comment and guestbook operations
pub struct EntryService {
    entries: Arc<dyn EntryRepository>,
    targets: TargetDirectory,
}

impl EntryService {
    /// Create a new entry service
    pub fn new(entries: Arc<dyn EntryRepository>, targets: TargetDirectory) -> Self {
        Self { entries, targets }
    }

    /// Post a comment or guestbook entry.
    ///
    /// `content` is `None` when the request carried no content field; that
    /// redirects to the target page without inserting. Blank content that
    /// was submitted is a validation failure.
    pub async fn create(
        &self,
        kind: EntryKind,
        target_id: i64,
        viewer: &Viewer,
        content: Option<String>,
    ) -> Result<Redirect, LedgerError> {
        let user_id = viewer.require_user()?;
        let target_kind = kind.target_kind();
        self.targets.require(target_kind, target_id).await?;

        let Some(content) = content else {
            return Ok(Redirect::to(target_kind.url(target_id)));
        };

        let content = content.trim();
        if content.is_empty() {
            return Err(LedgerError::Validation(format!("The {} cannot be empty", kind)));
        }

        let entry = self
            .entries
            .create(&Entry::new(kind, target_id, user_id, content.to_string()))
            .await
            .with_context(|| format!("Failed to create {}", kind))?;

        tracing::info!(kind = %kind, id = entry.id, target_id, user_id, "Entry posted");

        Ok(Redirect::to(entry.canonical_url()).with_flash(kind.posted_message()))
    }

    /// Delete an entry owned by the viewer
    pub async fn delete(&self, kind: EntryKind, id: i64, viewer: &Viewer) -> Result<Redirect, LedgerError> {
        let entry = self
            .entries
            .get_by_id(kind, id)
            .await
            .with_context(|| format!("Failed to look up {}", kind))?
            .ok_or_else(|| LedgerError::not_found(kind, id))?;

        assert_owner(&entry, viewer)?;

        self.entries
            .delete(kind, id)
            .await
            .with_context(|| format!("Failed to delete {}", kind))?;

        tracing::info!(kind = %kind, id, "Entry deleted");

        Ok(Redirect::to(entry.parent_url()).with_flash(kind.deleted_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::seed_user;
    use crate::services::test_support::Ledger;

    #[tokio::test]
    async fn test_create_comment_inserts_one_and_redirects_to_it() {
        let ledger = Ledger::new().await;
        let viewer = Viewer::user(ledger.seeded.user_id);

        let redirect = ledger
            .entries
            .create(EntryKind::Comment, ledger.seeded.piece_id, &viewer, Some("Lovely".to_string()))
            .await
            .expect("Failed to post comment");

        let listed = ledger
            .entry_repo
            .list_for_target(EntryKind::Comment, ledger.seeded.piece_id)
            .await
            .expect("Failed to list");
        assert_eq!(listed.len(), 1);

        let id = listed[0].entry.id;
        assert_eq!(
            redirect.to,
            format!("/pieces/{}#comment-{}", ledger.seeded.piece_id, id)
        );
        assert_eq!(redirect.flash.as_deref(), Some("Comment posted."));
    }

    #[tokio::test]
    async fn test_create_guestbook_entry() {
        let ledger = Ledger::new().await;
        let viewer = Viewer::user(ledger.seeded.user_id);

        let redirect = ledger
            .entries
            .create(EntryKind::Guestbook, ledger.seeded.exhibition_id, &viewer, Some("Hi".to_string()))
            .await
            .expect("Failed to sign guestbook");

        assert!(redirect
            .to
            .starts_with(&format!("/exhibitions/{}#guestbook-", ledger.seeded.exhibition_id)));
        assert_eq!(redirect.flash.as_deref(), Some("Guestbook entry posted."));
    }

    #[tokio::test]
    async fn test_create_requires_authentication() {
        let ledger = Ledger::new().await;

        let result = ledger
            .entries
            .create(EntryKind::Comment, ledger.seeded.piece_id, &Viewer::anonymous(), Some("x".to_string()))
            .await;

        assert!(matches!(result, Err(LedgerError::Unauthenticated)));
        assert_eq!(
            ledger
                .entry_repo
                .count_for_target(EntryKind::Comment, ledger.seeded.piece_id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_create_on_missing_target_is_not_found() {
        let ledger = Ledger::new().await;
        let viewer = Viewer::user(ledger.seeded.user_id);

        let result = ledger
            .entries
            .create(EntryKind::Comment, 999, &viewer, Some("x".to_string()))
            .await;
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_non_submission_redirects_to_target_without_insert() {
        let ledger = Ledger::new().await;
        let viewer = Viewer::user(ledger.seeded.user_id);

        let redirect = ledger
            .entries
            .create(EntryKind::Comment, ledger.seeded.piece_id, &viewer, None)
            .await
            .expect("Non-submission should redirect");

        assert_eq!(redirect, Redirect::to(format!("/pieces/{}", ledger.seeded.piece_id)));
        assert_eq!(
            ledger
                .entry_repo
                .count_for_target(EntryKind::Comment, ledger.seeded.piece_id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_blank_content_is_rejected() {
        let ledger = Ledger::new().await;
        let viewer = Viewer::user(ledger.seeded.user_id);

        let result = ledger
            .entries
            .create(EntryKind::Guestbook, ledger.seeded.exhibition_id, &viewer, Some("   ".to_string()))
            .await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_by_author() {
        let ledger = Ledger::new().await;
        let viewer = Viewer::user(ledger.seeded.user_id);
        ledger
            .entries
            .create(EntryKind::Comment, ledger.seeded.piece_id, &viewer, Some("x".to_string()))
            .await
            .expect("Failed to post");
        let id = ledger
            .entry_repo
            .list_for_target(EntryKind::Comment, ledger.seeded.piece_id)
            .await
            .unwrap()[0]
            .entry
            .id;

        let redirect = ledger
            .entries
            .delete(EntryKind::Comment, id, &viewer)
            .await
            .expect("Failed to delete");

        assert_eq!(redirect.to, format!("/pieces/{}", ledger.seeded.piece_id));
        assert_eq!(redirect.flash.as_deref(), Some("Comment deleted."));
        assert!(ledger
            .entry_repo
            .get_by_id(EntryKind::Comment, id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_by_non_author_is_forbidden_and_keeps_entry() {
        let ledger = Ledger::new().await;
        let author = Viewer::user(ledger.seeded.user_id);
        let intruder = Viewer::user(seed_user(&ledger.seeded.pool, "intruder").await);
        ledger
            .entries
            .create(EntryKind::Guestbook, ledger.seeded.exhibition_id, &author, Some("mine".to_string()))
            .await
            .expect("Failed to post");
        let id = ledger
            .entry_repo
            .list_for_target(EntryKind::Guestbook, ledger.seeded.exhibition_id)
            .await
            .unwrap()[0]
            .entry
            .id;

        let result = ledger.entries.delete(EntryKind::Guestbook, id, &intruder).await;
        assert!(matches!(result, Err(LedgerError::Forbidden(_))));

        let anonymous = ledger.entries.delete(EntryKind::Guestbook, id, &Viewer::anonymous()).await;
        assert!(matches!(anonymous, Err(LedgerError::Unauthenticated)));

        assert!(ledger
            .entry_repo
            .get_by_id(EntryKind::Guestbook, id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let ledger = Ledger::new().await;
        let result = ledger
            .entries
            .delete(EntryKind::Comment, 404, &Viewer::user(ledger.seeded.user_id))
            .await;
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }
}
