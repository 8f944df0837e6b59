//! Piece model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CanonicalUrl;

/// A single work shown in exactly one exhibition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Piece {
    /// Unique identifier
    pub id: i64,
    /// Parent exhibition
    pub exhibition_id: i64,
    /// Title of the work
    pub name: String,
    /// Artist
    pub author: String,
    /// Material reference
    pub material_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Piece {
    /// Create a new piece; the ID is assigned by the database.
    pub fn new(exhibition_id: i64, name: String, author: String, material_id: i64) -> Self {
        Self {
            id: 0,
            exhibition_id,
            name,
            author,
            material_id,
            created_at: Utc::now(),
        }
    }
}

impl CanonicalUrl for Piece {
    fn canonical_url(&self) -> String {
        piece_url(self.id)
    }
}

/// Canonical page of a piece
pub fn piece_url(id: i64) -> String {
    format!("/pieces/{}", id)
}

/// Input for adding a piece to an exhibition
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePieceInput {
    /// Title of the work
    pub name: String,
    /// Artist
    pub author: String,
    /// Material reference
    pub material_id: i64,
}
