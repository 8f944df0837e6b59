//! Share service

use std::sync::Arc;

use anyhow::Context;

use crate::db::repositories::ShareRepository;
use crate::models::TargetKind;

use super::{LedgerError, Redirect, TargetDirectory, Viewer};

/// Share operations. There is no unshare.
pub struct ShareService {
    shares: Arc<dyn ShareRepository>,
    targets: TargetDirectory,
}

impl ShareService {
    /// Create a new share service
    pub fn new(shares: Arc<dyn ShareRepository>, targets: TargetDirectory) -> Self {
        Self { shares, targets }
    }

    /// Record a share and go back to the target. Every call inserts.
    pub async fn share(&self, kind: TargetKind, target_id: i64, viewer: &Viewer) -> Result<Redirect, LedgerError> {
        let user_id = viewer.require_user()?;
        self.targets.require(kind, target_id).await?;

        let share = self
            .shares
            .create(kind, target_id, user_id)
            .await
            .with_context(|| format!("Failed to share {}", kind))?;

        tracing::info!(kind = %kind, id = share.id, target_id, user_id, "Shared");

        Ok(Redirect::to(kind.url(target_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::Ledger;

    #[tokio::test]
    async fn test_share_n_times_creates_n_records() {
        let ledger = Ledger::new().await;
        let viewer = Viewer::user(ledger.seeded.user_id);

        for _ in 0..4 {
            let redirect = ledger
                .shares
                .share(TargetKind::Piece, ledger.seeded.piece_id, &viewer)
                .await
                .expect("Failed to share");
            assert_eq!(redirect.to, format!("/pieces/{}", ledger.seeded.piece_id));
        }

        assert_eq!(
            ledger
                .share_repo
                .count_for_target(TargetKind::Piece, ledger.seeded.piece_id)
                .await
                .unwrap(),
            4
        );
    }

    #[tokio::test]
    async fn test_share_guards() {
        let ledger = Ledger::new().await;

        let anonymous = ledger
            .shares
            .share(TargetKind::Exhibition, ledger.seeded.exhibition_id, &Viewer::anonymous())
            .await;
        assert!(matches!(anonymous, Err(LedgerError::Unauthenticated)));

        let missing = ledger
            .shares
            .share(TargetKind::Exhibition, 77, &Viewer::user(ledger.seeded.user_id))
            .await;
        assert!(matches!(missing, Err(LedgerError::NotFound(_))));

        assert_eq!(
            ledger
                .share_repo
                .count_for_target(TargetKind::Exhibition, ledger.seeded.exhibition_id)
                .await
                .unwrap(),
            0
        );
    }
}
