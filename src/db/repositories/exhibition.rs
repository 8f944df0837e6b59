//! Exhibition repository
//!
//! Database operations for exhibitions, including the substring search used
//! by the exhibition search page.

use crate::db::{with_backend, Backend, DynDatabasePool};
use crate::models::{Exhibition, ListParams};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

const EXHIBITION_COLUMNS: &str = "e.id, e.name, e.description, e.category_id, e.curator_id, e.created_at";

/// Exhibition repository trait
#[async_trait]
pub trait ExhibitionRepository: Send + Sync {
    /// Create a new exhibition
    async fn create(&self, exhibition: &Exhibition) -> Result<Exhibition>;

    /// Get exhibition by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Exhibition>>;

    /// All exhibitions filed under a category, ordered by ID
    async fn list_by_category(&self, category_id: i64) -> Result<Vec<Exhibition>>;

    /// Distinct exhibitions whose name or description contains `query`
    /// (case-sensitive), ordered by ID. Returns the page and the total match count.
    async fn search(&self, query: &str, params: &ListParams) -> Result<(Vec<Exhibition>, i64)>;
}

/// SQLx-based exhibition repository implementation
pub struct SqlxExhibitionRepository {
    pool: DynDatabasePool,
}

impl SqlxExhibitionRepository {
    /// Create a new SQLx exhibition repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ExhibitionRepository> {
        Arc::new(Self::new(pool))
    }
}

/// Case-sensitive "contains" predicate for the given driver.
///
/// SQLite's `instr` is byte-wise already; MySQL needs `BINARY` to stop the
/// column collation from folding case.
fn search_predicate(backend: Backend<'_>) -> &'static str {
    match backend {
        Backend::Sqlite(_) => "(instr(e.name, ?) > 0 OR instr(e.description, ?) > 0)",
        Backend::Mysql(_) => "(INSTR(BINARY e.name, ?) > 0 OR INSTR(BINARY e.description, ?) > 0)",
    }
}

#[async_trait]
impl ExhibitionRepository for SqlxExhibitionRepository {
    async fn create(&self, exhibition: &Exhibition) -> Result<Exhibition> {
        let now = Utc::now();
        let sql = r#"
            INSERT INTO exhibitions (name, description, category_id, curator_id, created_at)
            VALUES (?, ?, ?, ?, ?)
        "#;

        let id = match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query(sql)
                .bind(&exhibition.name)
                .bind(&exhibition.description)
                .bind(exhibition.category_id)
                .bind(exhibition.curator_id)
                .bind(now)
                .execute(pool)
                .await
                .map(|result| result.last_insert_rowid()),
            Backend::Mysql(pool) => sqlx::query(sql)
                .bind(&exhibition.name)
                .bind(&exhibition.description)
                .bind(exhibition.category_id)
                .bind(exhibition.curator_id)
                .bind(now)
                .execute(pool)
                .await
                .map(|result| result.last_insert_id() as i64),
        }
        .context("Failed to create exhibition")?;

        Ok(Exhibition {
            id,
            created_at: now,
            ..exhibition.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Exhibition>> {
        let sql = format!("SELECT {} FROM exhibitions e WHERE e.id = ?", EXHIBITION_COLUMNS);
        let exhibition = with_backend!(self.pool, |conn| {
            sqlx::query_as::<_, Exhibition>(&sql)
                .bind(id)
                .fetch_optional(conn)
                .await
        })
        .context("Failed to get exhibition by ID")?;
        Ok(exhibition)
    }

    async fn list_by_category(&self, category_id: i64) -> Result<Vec<Exhibition>> {
        let sql = format!(
            "SELECT {} FROM exhibitions e WHERE e.category_id = ? ORDER BY e.id",
            EXHIBITION_COLUMNS
        );
        let exhibitions = with_backend!(self.pool, |conn| {
            sqlx::query_as::<_, Exhibition>(&sql)
                .bind(category_id)
                .fetch_all(conn)
                .await
        })
        .context("Failed to list exhibitions by category")?;
        Ok(exhibitions)
    }

    async fn search(&self, query: &str, params: &ListParams) -> Result<(Vec<Exhibition>, i64)> {
        let predicate = search_predicate(self.pool.backend());
        let count_sql = format!(
            "SELECT COUNT(DISTINCT e.id) FROM exhibitions e WHERE {}",
            predicate
        );
        let page_sql = format!(
            "SELECT DISTINCT {} FROM exhibitions e WHERE {} ORDER BY e.id LIMIT ? OFFSET ?",
            EXHIBITION_COLUMNS, predicate
        );

        let total: i64 = with_backend!(self.pool, |conn| {
            sqlx::query_scalar(&count_sql)
                .bind(query)
                .bind(query)
                .fetch_one(conn)
                .await
        })
        .context("Failed to count exhibition search results")?;

        let items = with_backend!(self.pool, |conn| {
            sqlx::query_as::<_, Exhibition>(&page_sql)
                .bind(query)
                .bind(query)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(conn)
                .await
        })
        .context("Failed to search exhibitions")?;

        Ok((items, total))
    }
}
