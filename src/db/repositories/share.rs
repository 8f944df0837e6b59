//! Share repository
//!
//! Shares are append-only: every call inserts a row.

use crate::db::{Backend, DynDatabasePool};
use crate::models::{Share, TargetKind};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::count_by;

/// Share repository trait
#[async_trait]
pub trait ShareRepository: Send + Sync {
    /// Record a share
    async fn create(&self, kind: TargetKind, target_id: i64, user_id: i64) -> Result<Share>;

    /// Number of shares on a target
    async fn count_for_target(&self, kind: TargetKind, target_id: i64) -> Result<i64>;
}

/// SQLx-based share repository implementation
pub struct SqlxShareRepository {
    pool: DynDatabasePool,
}

impl SqlxShareRepository {
    /// Create a new SQLx share repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ShareRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ShareRepository for SqlxShareRepository {
    async fn create(&self, kind: TargetKind, target_id: i64, user_id: i64) -> Result<Share> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO {} ({}, user_id, created_at) VALUES (?, ?, ?)",
            kind.share_table(),
            kind.column()
        );

        let id = match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query(&sql)
                .bind(target_id)
                .bind(user_id)
                .bind(now)
                .execute(pool)
                .await
                .map(|result| result.last_insert_rowid()),
            Backend::Mysql(pool) => sqlx::query(&sql)
                .bind(target_id)
                .bind(user_id)
                .bind(now)
                .execute(pool)
                .await
                .map(|result| result.last_insert_id() as i64),
        }
        .with_context(|| format!("Failed to share {}", kind))?;

        Ok(Share {
            id,
            kind,
            target_id,
            user_id,
            created_at: now,
        })
    }

    async fn count_for_target(&self, kind: TargetKind, target_id: i64) -> Result<i64> {
        count_by(&self.pool, kind.share_table(), kind.column(), target_id)
            .await
            .with_context(|| format!("Failed to count {} shares", kind))
    }
}
