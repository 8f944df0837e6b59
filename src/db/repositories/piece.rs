//! Piece repository
//!
//! Database operations for pieces. Piece search also matches on the name of
//! the piece's material, so those queries join `materials`.

use crate::db::{with_backend, Backend, DynDatabasePool};
use crate::models::{ListParams, Piece};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

const PIECE_COLUMNS: &str = "p.id, p.exhibition_id, p.name, p.author, p.material_id, p.created_at";

/// Piece repository trait
#[async_trait]
pub trait PieceRepository: Send + Sync {
    /// Create a new piece
    async fn create(&self, piece: &Piece) -> Result<Piece>;

    /// Get piece by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Piece>>;

    /// All pieces in an exhibition, ordered by ID
    async fn list_by_exhibition(&self, exhibition_id: i64) -> Result<Vec<Piece>>;

    /// All pieces made of a material, ordered by ID
    async fn list_by_material(&self, material_id: i64) -> Result<Vec<Piece>>;

    /// Distinct pieces whose name, author or material name contains `query`
    /// (case-sensitive), ordered by ID. Returns the page and the total match count.
    async fn search(&self, query: &str, params: &ListParams) -> Result<(Vec<Piece>, i64)>;
}

/// SQLx-based piece repository implementation
pub struct SqlxPieceRepository {
    pool: DynDatabasePool,
}

impl SqlxPieceRepository {
    /// Create a new SQLx piece repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PieceRepository> {
        Arc::new(Self::new(pool))
    }

    async fn list_where(&self, column: &str, value: i64) -> Result<Vec<Piece>> {
        let sql = format!(
            "SELECT {} FROM pieces p WHERE p.{} = ? ORDER BY p.id",
            PIECE_COLUMNS, column
        );
        let pieces = with_backend!(self.pool, |conn| {
            sqlx::query_as::<_, Piece>(&sql)
                .bind(value)
                .fetch_all(conn)
                .await
        })
        .with_context(|| format!("Failed to list pieces by {}", column))?;
        Ok(pieces)
    }
}

fn search_predicate(backend: Backend<'_>) -> &'static str {
    match backend {
        Backend::Sqlite(_) => {
            "(instr(p.name, ?) > 0 OR instr(p.author, ?) > 0 OR instr(m.name, ?) > 0)"
        }
        Backend::Mysql(_) => {
            "(INSTR(BINARY p.name, ?) > 0 OR INSTR(BINARY p.author, ?) > 0 OR INSTR(BINARY m.name, ?) > 0)"
        }
    }
}

#[async_trait]
impl PieceRepository for SqlxPieceRepository {
    async fn create(&self, piece: &Piece) -> Result<Piece> {
        let now = Utc::now();
        let sql = r#"
            INSERT INTO pieces (exhibition_id, name, author, material_id, created_at)
            VALUES (?, ?, ?, ?, ?)
        "#;

        let id = match self.pool.backend() {
            Backend::Sqlite(pool) => sqlx::query(sql)
                .bind(piece.exhibition_id)
                .bind(&piece.name)
                .bind(&piece.author)
                .bind(piece.material_id)
                .bind(now)
                .execute(pool)
                .await
                .map(|result| result.last_insert_rowid()),
            Backend::Mysql(pool) => sqlx::query(sql)
                .bind(piece.exhibition_id)
                .bind(&piece.name)
                .bind(&piece.author)
                .bind(piece.material_id)
                .bind(now)
                .execute(pool)
                .await
                .map(|result| result.last_insert_id() as i64),
        }
        .context("Failed to create piece")?;

        Ok(Piece {
            id,
            created_at: now,
            ..piece.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Piece>> {
        let sql = format!("SELECT {} FROM pieces p WHERE p.id = ?", PIECE_COLUMNS);
        let piece = with_backend!(self.pool, |conn| {
            sqlx::query_as::<_, Piece>(&sql)
                .bind(id)
                .fetch_optional(conn)
                .await
        })
        .context("Failed to get piece by ID")?;
        Ok(piece)
    }

    async fn list_by_exhibition(&self, exhibition_id: i64) -> Result<Vec<Piece>> {
        self.list_where("exhibition_id", exhibition_id).await
    }

    async fn list_by_material(&self, material_id: i64) -> Result<Vec<Piece>> {
        self.list_where("material_id", material_id).await
    }

    async fn search(&self, query: &str, params: &ListParams) -> Result<(Vec<Piece>, i64)> {
        let predicate = search_predicate(self.pool.backend());
        let count_sql = format!(
            "SELECT COUNT(DISTINCT p.id) FROM pieces p JOIN materials m ON m.id = p.material_id WHERE {}",
            predicate
        );
        let page_sql = format!(
            "SELECT DISTINCT {} FROM pieces p JOIN materials m ON m.id = p.material_id \
             WHERE {} ORDER BY p.id LIMIT ? OFFSET ?",
            PIECE_COLUMNS, predicate
        );

        let total: i64 = with_backend!(self.pool, |conn| {
            sqlx::query_scalar(&count_sql)
                .bind(query)
                .bind(query)
                .bind(query)
                .fetch_one(conn)
                .await
        })
        .context("Failed to count piece search results")?;

        let items = with_backend!(self.pool, |conn| {
            sqlx::query_as::<_, Piece>(&page_sql)
                .bind(query)
                .bind(query)
                .bind(query)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(conn)
                .await
        })
        .context("Failed to search pieces")?;

        Ok((items, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{seed_category, seed_exhibition, seed_material, seed_user};
    use crate::db::{create_test_pool, migrations};

    struct Fixture {
        repo: SqlxPieceRepository,
        exhibition_id: i64,
        oil: i64,
        bronze: i64,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let user_id = seed_user(&pool, "curator").await;
        let category_id = seed_category(&pool, "modern").await;
        let exhibition_id = seed_exhibition(&pool, "Show", category_id, user_id).await;
        let oil = seed_material(&pool, "Oil").await;
        let bronze = seed_material(&pool, "Bronze").await;
        Fixture {
            repo: SqlxPieceRepository::new(pool),
            exhibition_id,
            oil,
            bronze,
        }
    }

    async fn create(f: &Fixture, name: &str, author: &str, material_id: i64) -> Piece {
        f.repo
            .create(&Piece::new(
                f.exhibition_id,
                name.to_string(),
                author.to_string(),
                material_id,
            ))
            .await
            .expect("Failed to create piece")
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let f = setup().await;
        let created = create(&f, "Sunflowers", "Vincent", f.oil).await;

        let found = f
            .repo
            .get_by_id(created.id)
            .await
            .expect("Failed to query")
            .expect("Piece not found");
        assert_eq!(found.author, "Vincent");
        assert_eq!(found.exhibition_id, f.exhibition_id);
    }

    #[tokio::test]
    async fn test_list_by_exhibition_and_material() {
        let f = setup().await;
        create(&f, "A", "x", f.oil).await;
        create(&f, "B", "y", f.bronze).await;

        assert_eq!(
            f.repo
                .list_by_exhibition(f.exhibition_id)
                .await
                .expect("Failed to list")
                .len(),
            2
        );
        let oils = f.repo.list_by_material(f.oil).await.expect("Failed to list");
        assert_eq!(oils.len(), 1);
        assert_eq!(oils[0].name, "A");
    }

    #[tokio::test]
    async fn test_search_by_name_author_or_material() {
        let f = setup().await;
        let by_name = create(&f, "Oil Lamp", "Anon", f.bronze).await;
        let by_author = create(&f, "Portrait", "Oilsworth", f.bronze).await;
        let by_material = create(&f, "Landscape", "Anon", f.oil).await;
        create(&f, "Statue", "Anon", f.bronze).await;

        let (items, total) = f
            .repo
            .search("Oil", &ListParams::new(1, 8))
            .await
            .expect("Failed to search");

        assert_eq!(total, 3);
        let ids: Vec<i64> = items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![by_name.id, by_author.id, by_material.id]);
    }

    #[tokio::test]
    async fn test_search_matching_every_field_returns_piece_once() {
        let f = setup().await;
        create(&f, "Oil on Oil", "Oily", f.oil).await;

        let (items, total) = f
            .repo
            .search("Oil", &ListParams::new(1, 8))
            .await
            .expect("Failed to search");
        assert_eq!(total, 1);
        assert_eq!(items.len(), 1);
    }
}
