//! Taxonomy repository
//!
//! Database operations for categories and materials. Both tables share one
//! shape, so a single repository serves them, keyed by [`TaxonomyKind`].

use crate::db::{with_backend, Backend, DynDatabasePool};
use crate::models::{TaxonomyKind, Term};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// Taxonomy repository trait
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// Create a new term
    async fn create(&self, kind: TaxonomyKind, term: &Term) -> Result<Term>;

    /// Get term by ID
    async fn get_by_id(&self, kind: TaxonomyKind, id: i64) -> Result<Option<Term>>;

    /// Get term by exact slug
    async fn get_by_slug(&self, kind: TaxonomyKind, slug: &str) -> Result<Option<Term>>;

    /// List every term of a kind, ordered by name
    async fn list(&self, kind: TaxonomyKind) -> Result<Vec<Term>>;

    /// Check if a slug is already taken
    async fn exists_by_slug(&self, kind: TaxonomyKind, slug: &str) -> Result<bool>;
}

/// SQLx-based taxonomy repository implementation
pub struct SqlxTaxonomyRepository {
    pool: DynDatabasePool,
}

impl SqlxTaxonomyRepository {
    /// Create a new SQLx taxonomy repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TaxonomyRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TaxonomyRepository for SqlxTaxonomyRepository {
    async fn create(&self, kind: TaxonomyKind, term: &Term) -> Result<Term> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO {} (name, slug, created_at) VALUES (?, ?, ?)",
            kind.table()
        );

        let id = match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query(&sql)
                .bind(&term.name)
                .bind(&term.slug)
                .bind(now)
                .execute(pool)
                .await
                .map(|result| result.last_insert_rowid()),
            Backend::Mysql(pool) => sqlx::query(&sql)
                .bind(&term.name)
                .bind(&term.slug)
                .bind(now)
                .execute(pool)
                .await
                .map(|result| result.last_insert_id() as i64),
        }
        .with_context(|| format!("Failed to create {}", kind))?;

        Ok(Term {
            id,
            name: term.name.clone(),
            slug: term.slug.clone(),
            created_at: now,
        })
    }

    async fn get_by_id(&self, kind: TaxonomyKind, id: i64) -> Result<Option<Term>> {
        let sql = format!(
            "SELECT id, name, slug, created_at FROM {} WHERE id = ?",
            kind.table()
        );
        let term = with_backend!(self.pool, |conn| {
            sqlx::query_as::<_, Term>(&sql)
                .bind(id)
                .fetch_optional(conn)
                .await
        })
        .with_context(|| format!("Failed to get {} by ID", kind))?;
        Ok(term)
    }

    async fn get_by_slug(&self, kind: TaxonomyKind, slug: &str) -> Result<Option<Term>> {
        let sql = format!(
            "SELECT id, name, slug, created_at FROM {} WHERE slug = ?",
            kind.table()
        );
        let term = with_backend!(self.pool, |conn| {
            sqlx::query_as::<_, Term>(&sql)
                .bind(slug)
                .fetch_optional(conn)
                .await
        })
        .with_context(|| format!("Failed to get {} by slug", kind))?;
        Ok(term)
    }

    async fn list(&self, kind: TaxonomyKind) -> Result<Vec<Term>> {
        let sql = format!(
            "SELECT id, name, slug, created_at FROM {} ORDER BY name, id",
            kind.table()
        );
        let terms = with_backend!(self.pool, |conn| {
            sqlx::query_as::<_, Term>(&sql).fetch_all(conn).await
        })
        .with_context(|| format!("Failed to list {}", kind.table()))?;
        Ok(terms)
    }

    async fn exists_by_slug(&self, kind: TaxonomyKind, slug: &str) -> Result<bool> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE slug = ?", kind.table());
        let count: i64 = with_backend!(self.pool, |conn| {
            sqlx::query_scalar(&sql).bind(slug).fetch_one(conn).await
        })
        .with_context(|| format!("Failed to check {} slug", kind))?;
        Ok(count > 0)
    }
}
