//! Like repository
//!
//! Likes on exhibitions and pieces. Uniqueness of (target, user) lives in the
//! schema; [`LikeRepository::insert_if_absent`] leans on it with an
//! insert-or-ignore so concurrent duplicates collapse to one row.

use crate::db::{with_backend, Backend, DynDatabasePool};
use crate::models::{Like, LikedItem, ListParams, TargetKind};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::count_by;

/// Like repository trait
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Insert a like unless (target, user) already has one.
    ///
    /// Returns `None` when the row already existed.
    async fn insert_if_absent(&self, kind: TargetKind, target_id: i64, user_id: i64) -> Result<Option<Like>>;

    /// The like a user holds on a target, if any
    async fn find(&self, kind: TargetKind, target_id: i64, user_id: i64) -> Result<Option<Like>>;

    /// Get like by ID
    async fn get_by_id(&self, kind: TargetKind, id: i64) -> Result<Option<Like>>;

    /// Delete a like; returns whether a row was removed
    async fn delete(&self, kind: TargetKind, id: i64) -> Result<bool>;

    /// Number of likes on a target
    async fn count_for_target(&self, kind: TargetKind, target_id: i64) -> Result<i64>;

    /// A user's likes with the liked target's name, ordered by like ID
    async fn list_by_user(&self, kind: TargetKind, user_id: i64, params: &ListParams) -> Result<(Vec<LikedItem>, i64)>;
}

#[derive(sqlx::FromRow)]
struct LikeRow {
    id: i64,
    target_id: i64,
    user_id: i64,
    created_at: DateTime<Utc>,
}

impl LikeRow {
    fn into_like(self, kind: TargetKind) -> Like {
        Like {
            id: self.id,
            kind,
            target_id: self.target_id,
            user_id: self.user_id,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LikedItemRow {
    #[sqlx(flatten)]
    like: LikeRow,
    target_name: String,
}

/// SQLx-based like repository implementation
pub struct SqlxLikeRepository {
    pool: DynDatabasePool,
}

impl SqlxLikeRepository {
    /// Create a new SQLx like repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn LikeRepository> {
        Arc::new(Self::new(pool))
    }
}

fn select_sql(kind: TargetKind, filter: &str) -> String {
    format!(
        "SELECT id, {} AS target_id, user_id, created_at FROM {} WHERE {}",
        kind.column(),
        kind.like_table(),
        filter
    )
}

#[async_trait]
impl LikeRepository for SqlxLikeRepository {
    async fn insert_if_absent(&self, kind: TargetKind, target_id: i64, user_id: i64) -> Result<Option<Like>> {
        let now = Utc::now();
        let columns = format!("{} ({}, user_id, created_at) VALUES (?, ?, ?)", kind.like_table(), kind.column());

        let inserted = match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query(&format!("INSERT OR IGNORE INTO {}", columns))
                .bind(target_id)
                .bind(user_id)
                .bind(now)
                .execute(pool)
                .await
                .map(|result| (result.rows_affected() > 0).then(|| result.last_insert_rowid())),
            Backend::Mysql(pool) => sqlx::query(&format!("INSERT IGNORE INTO {}", columns))
                .bind(target_id)
                .bind(user_id)
                .bind(now)
                .execute(pool)
                .await
                .map(|result| (result.rows_affected() > 0).then(|| result.last_insert_id() as i64)),
        }
        .with_context(|| format!("Failed to insert {} like", kind))?;

        Ok(inserted.map(|id| Like {
            id,
            kind,
            target_id,
            user_id,
            created_at: now,
        }))
    }

    async fn find(&self, kind: TargetKind, target_id: i64, user_id: i64) -> Result<Option<Like>> {
        let sql = select_sql(kind, &format!("{} = ? AND user_id = ?", kind.column()));
        let row = with_backend!(self.pool, |conn| {
            sqlx::query_as::<_, LikeRow>(&sql)
                .bind(target_id)
                .bind(user_id)
                .fetch_optional(conn)
                .await
        })
        .with_context(|| format!("Failed to find {} like", kind))?;
        Ok(row.map(|row| row.into_like(kind)))
    }

    async fn get_by_id(&self, kind: TargetKind, id: i64) -> Result<Option<Like>> {
        let sql = select_sql(kind, "id = ?");
        let row = with_backend!(self.pool, |conn| {
            sqlx::query_as::<_, LikeRow>(&sql)
                .bind(id)
                .fetch_optional(conn)
                .await
        })
        .with_context(|| format!("Failed to get {} like by ID", kind))?;
        Ok(row.map(|row| row.into_like(kind)))
    }

    async fn delete(&self, kind: TargetKind, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", kind.like_table());
        let affected = with_backend!(self.pool, |conn| {
            sqlx::query(&sql)
                .bind(id)
                .execute(conn)
                .await
                .map(|result| result.rows_affected())
        })
        .with_context(|| format!("Failed to delete {} like", kind))?;
        Ok(affected > 0)
    }

    async fn count_for_target(&self, kind: TargetKind, target_id: i64) -> Result<i64> {
        count_by(&self.pool, kind.like_table(), kind.column(), target_id)
            .await
            .with_context(|| format!("Failed to count {} likes", kind))
    }

    async fn list_by_user(&self, kind: TargetKind, user_id: i64, params: &ListParams) -> Result<(Vec<LikedItem>, i64)> {
        let total = count_by(&self.pool, kind.like_table(), "user_id", user_id)
            .await
            .with_context(|| format!("Failed to count liked {}s", kind))?;

        let sql = format!(
            "SELECT l.id, l.{col} AS target_id, l.user_id, l.created_at, t.name AS target_name \
             FROM {likes} l JOIN {targets} t ON t.id = l.{col} \
             WHERE l.user_id = ? ORDER BY l.id LIMIT ? OFFSET ?",
            col = kind.column(),
            likes = kind.like_table(),
            targets = kind.table()
        );
        let rows = with_backend!(self.pool, |conn| {
            sqlx::query_as::<_, LikedItemRow>(&sql)
                .bind(user_id)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(conn)
                .await
        })
        .with_context(|| format!("Failed to list liked {}s", kind))?;

        let items = rows
            .into_iter()
            .map(|row| LikedItem {
                like: row.like.into_like(kind),
                target_name: row.target_name,
            })
            .collect();
        Ok((items, total))
    }
}
