//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity family.

pub mod click;
pub mod entry;
pub mod exhibition;
pub mod like;
pub mod piece;
pub mod session;
pub mod share;
pub mod taxonomy;
pub mod user;

pub use click::{ClickRepository, SqlxClickRepository};
pub use entry::{EntryRepository, SqlxEntryRepository};
pub use exhibition::{ExhibitionRepository, SqlxExhibitionRepository};
pub use like::{LikeRepository, SqlxLikeRepository};
pub use piece::{PieceRepository, SqlxPieceRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use share::{ShareRepository, SqlxShareRepository};
pub use taxonomy::{SqlxTaxonomyRepository, TaxonomyRepository};
pub use user::{SqlxUserRepository, UserRepository};

use crate::db::{with_backend, DynDatabasePool};

/// Whether a repository error comes from a UNIQUE constraint in the store
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db)) => db.is_unique_violation(),
        _ => false,
    }
}

/// `SELECT COUNT(*) FROM table WHERE column = value`
///
/// `table` and `column` must come from the fixed names on the model kinds,
/// never from request input.
async fn count_by(
    pool: &DynDatabasePool,
    table: &str,
    column: &str,
    value: i64,
) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?", table, column);
    with_backend!(pool, |conn| {
        sqlx::query_scalar::<_, i64>(&sql).bind(value).fetch_one(conn).await
    })
}
