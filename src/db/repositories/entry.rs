//! Entry repository
//!
//! Database operations for comments and guestbook entries. The two tables
//! share one shape and are selected by [`EntryKind`].

use crate::db::{with_backend, Backend, DynDatabasePool};
use crate::models::{Entry, EntryKind, EntryWithAuthor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Entry repository trait
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Insert a new entry
    async fn create(&self, entry: &Entry) -> Result<Entry>;

    /// Get entry by ID
    async fn get_by_id(&self, kind: EntryKind, id: i64) -> Result<Option<Entry>>;

    /// Delete an entry; returns whether a row was removed
    async fn delete(&self, kind: EntryKind, id: i64) -> Result<bool>;

    /// Entries on a target with their authors, oldest first
    async fn list_for_target(&self, kind: EntryKind, target_id: i64) -> Result<Vec<EntryWithAuthor>>;

    /// Number of entries on a target
    async fn count_for_target(&self, kind: EntryKind, target_id: i64) -> Result<i64>;
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: i64,
    target_id: i64,
    user_id: i64,
    content: String,
    created_at: DateTime<Utc>,
}

impl EntryRow {
    fn into_entry(self, kind: EntryKind) -> Entry {
        Entry {
            id: self.id,
            kind,
            target_id: self.target_id,
            user_id: self.user_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EntryAuthorRow {
    #[sqlx(flatten)]
    entry: EntryRow,
    author: String,
}

/// SQLx-based entry repository implementation
pub struct SqlxEntryRepository {
    pool: DynDatabasePool,
}

impl SqlxEntryRepository {
    /// Create a new SQLx entry repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn EntryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl EntryRepository for SqlxEntryRepository {
    async fn create(&self, entry: &Entry) -> Result<Entry> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO {} ({}, user_id, content, created_at) VALUES (?, ?, ?, ?)",
            entry.kind.table(),
            entry.kind.target_column()
        );

        let id = match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query(&sql)
                .bind(entry.target_id)
                .bind(entry.user_id)
                .bind(&entry.content)
                .bind(now)
                .execute(pool)
                .await
                .map(|result| result.last_insert_rowid()),
            Backend::Mysql(pool) => sqlx::query(&sql)
                .bind(entry.target_id)
                .bind(entry.user_id)
                .bind(&entry.content)
                .bind(now)
                .execute(pool)
                .await
                .map(|result| result.last_insert_id() as i64),
        }
        .with_context(|| format!("Failed to create {}", entry.kind))?;

        Ok(Entry {
            id,
            created_at: now,
            ..entry.clone()
        })
    }

    async fn get_by_id(&self, kind: EntryKind, id: i64) -> Result<Option<Entry>> {
        let sql = format!(
            "SELECT id, {} AS target_id, user_id, content, created_at FROM {} WHERE id = ?",
            kind.target_column(),
            kind.table()
        );
        let row = with_backend!(self.pool, |conn| {
            sqlx::query_as::<_, EntryRow>(&sql)
                .bind(id)
                .fetch_optional(conn)
                .await
        })
        .with_context(|| format!("Failed to get {} by ID", kind))?;
        Ok(row.map(|row| row.into_entry(kind)))
    }

    async fn delete(&self, kind: EntryKind, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", kind.table());
        let affected = with_backend!(self.pool, |conn| {
            sqlx::query(&sql)
                .bind(id)
                .execute(conn)
                .await
                .map(|result| result.rows_affected())
        })
        .with_context(|| format!("Failed to delete {}", kind))?;
        Ok(affected > 0)
    }

    async fn list_for_target(&self, kind: EntryKind, target_id: i64) -> Result<Vec<EntryWithAuthor>> {
        let sql = format!(
            "SELECT x.id, x.{col} AS target_id, x.user_id, x.content, x.created_at, u.username AS author \
             FROM {table} x JOIN users u ON u.id = x.user_id \
             WHERE x.{col} = ? ORDER BY x.id",
            col = kind.target_column(),
            table = kind.table()
        );
        let rows = with_backend!(self.pool, |conn| {
            sqlx::query_as::<_, EntryAuthorRow>(&sql)
                .bind(target_id)
                .fetch_all(conn)
                .await
        })
        .with_context(|| format!("Failed to list {} entries", kind))?;

        Ok(rows
            .into_iter()
            .map(|row| EntryWithAuthor {
                entry: row.entry.into_entry(kind),
                author: row.author,
            })
            .collect())
    }

    async fn count_for_target(&self, kind: EntryKind, target_id: i64) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?",
            kind.table(),
            kind.target_column()
        );
        let count: i64 = with_backend!(self.pool, |conn| {
            sqlx::query_scalar(&sql).bind(target_id).fetch_one(conn).await
        })
        .with_context(|| format!("Failed to count {} entries", kind))?;
        Ok(count)
    }
}
