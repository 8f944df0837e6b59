//! Like service
//!
//! Likes on exhibitions and pieces. Liking is idempotent: a second like on
//! the same target is a no-op redirect back to the target.

use std::sync::Arc;

use anyhow::Context;

use crate::db::repositories::LikeRepository;
use crate::models::{CanonicalUrl, TargetKind};

use super::{assert_owner, LedgerError, Redirect, TargetDirectory, Viewer};

/// Like and dislike operations
pub struct LikeService {
    likes: Arc<dyn LikeRepository>,
    targets: TargetDirectory,
}

impl LikeService {
    /// Create a new like service
    pub fn new(likes: Arc<dyn LikeRepository>, targets: TargetDirectory) -> Self {
        Self { likes, targets }
    }

    /// Like a target.
    ///
    /// Redirects to the new like's page, or to the target page when the viewer
    /// already liked it.
    pub async fn like(&self, kind: TargetKind, target_id: i64, viewer: &Viewer) -> Result<Redirect, LedgerError> {
        let user_id = viewer.require_user()?;
        self.targets.require(kind, target_id).await?;

        let inserted = self
            .likes
            .insert_if_absent(kind, target_id, user_id)
            .await
            .with_context(|| format!("Failed to like {}", kind))?;

        match inserted {
            Some(like) => {
                tracing::info!(kind = %kind, id = like.id, target_id, user_id, "Like added");
                Ok(Redirect::to(like.canonical_url()))
            }
            None => {
                tracing::debug!(kind = %kind, target_id, user_id, "Already liked");
                Ok(Redirect::to(kind.url(target_id)))
            }
        }
    }

    /// Remove a like owned by the viewer and go back to the liked target
    pub async fn dislike(&self, kind: TargetKind, like_id: i64, viewer: &Viewer) -> Result<Redirect, LedgerError> {
        let like = self
            .likes
            .get_by_id(kind, like_id)
            .await
            .with_context(|| format!("Failed to look up {} like", kind))?
            .ok_or_else(|| LedgerError::not_found(format!("{} like", kind), like_id))?;

        assert_owner(&like, viewer)?;

        self.likes
            .delete(kind, like_id)
            .await
            .with_context(|| format!("Failed to delete {} like", kind))?;

        tracing::info!(kind = %kind, id = like_id, "Like removed");

        Ok(Redirect::to(like.parent_url()))
    }
}
