//! Click repository
//!
//! One row per detail-page view. Anonymous views are stored with a NULL user.

use crate::db::{with_backend, DynDatabasePool};
use crate::models::TargetKind;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::count_by;

/// Click repository trait
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Record a view of a target
    async fn record(&self, kind: TargetKind, target_id: i64, user_id: Option<i64>) -> Result<()>;

    /// Number of views of a target
    async fn count_for_target(&self, kind: TargetKind, target_id: i64) -> Result<i64>;
}

/// SQLx-based click repository implementation
pub struct SqlxClickRepository {
    pool: DynDatabasePool,
}

impl SqlxClickRepository {
    /// Create a new SQLx click repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ClickRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ClickRepository for SqlxClickRepository {
    async fn record(&self, kind: TargetKind, target_id: i64, user_id: Option<i64>) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} ({}, user_id, created_at) VALUES (?, ?, ?)",
            kind.click_table(),
            kind.column()
        );
        let now = Utc::now();
        with_backend!(self.pool, |conn| {
            sqlx::query(&sql)
                .bind(target_id)
                .bind(user_id)
                .bind(now)
                .execute(conn)
                .await
                .map(|_| ())
        })
        .with_context(|| format!("Failed to record {} click", kind))?;
        Ok(())
    }

    async fn count_for_target(&self, kind: TargetKind, target_id: i64) -> Result<i64> {
        count_by(&self.pool, kind.click_table(), kind.column(), target_id)
            .await
            .with_context(|| format!("Failed to count {} clicks", kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::Seeded;

    #[tokio::test]
    async fn test_record_and_count() {
        let seeded = Seeded::new().await;
        let repo = SqlxClickRepository::new(seeded.pool.clone());

        repo.record(TargetKind::Piece, seeded.piece_id, None)
            .await
            .expect("Failed to record anonymous click");
        repo.record(TargetKind::Piece, seeded.piece_id, Some(seeded.user_id))
            .await
            .expect("Failed to record click");

        assert_eq!(
            repo.count_for_target(TargetKind::Piece, seeded.piece_id)
                .await
                .expect("Failed to count"),
            2
        );
    }
}
