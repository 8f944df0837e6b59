//! Exhibition model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CanonicalUrl;

/// An exhibition curated by one user and filed under one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Exhibition {
    /// Unique identifier
    pub id: i64,
    /// Exhibition title
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Category reference
    pub category_id: i64,
    /// Owning curator
    pub curator_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Exhibition {
    /// Create a new exhibition; the ID is assigned by the database.
    pub fn new(name: String, description: String, category_id: i64, curator_id: i64) -> Self {
        Self {
            id: 0,
            name,
            description,
            category_id,
            curator_id,
            created_at: Utc::now(),
        }
    }
}

impl CanonicalUrl for Exhibition {
    fn canonical_url(&self) -> String {
        exhibition_url(self.id)
    }
}

/// Canonical page of an exhibition
pub fn exhibition_url(id: i64) -> String {
    format!("/exhibitions/{}", id)
}

/// Input for creating an exhibition
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExhibitionInput {
    /// Exhibition title
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Category reference
    pub category_id: i64,
}
