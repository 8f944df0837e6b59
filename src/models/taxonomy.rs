//! Taxonomy model
//!
//! Categories classify exhibitions and materials classify pieces. Both are
//! flat lookup tables with the same shape, so they share one `Term` type and
//! are told apart by [`TaxonomyKind`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which lookup table a term lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomyKind {
    /// Exhibition category
    Category,
    /// Piece material
    Material,
}

impl TaxonomyKind {
    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            TaxonomyKind::Category => "categories",
            TaxonomyKind::Material => "materials",
        }
    }

    /// URL prefix of the term's listing page
    pub fn path_prefix(&self) -> &'static str {
        match self {
            TaxonomyKind::Category => "/categories",
            TaxonomyKind::Material => "/materials",
        }
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxonomyKind::Category => write!(f, "category"),
            TaxonomyKind::Material => write!(f, "material"),
        }
    }
}

impl FromStr for TaxonomyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "category" => Ok(TaxonomyKind::Category),
            "material" => Ok(TaxonomyKind::Material),
            _ => Err(anyhow::anyhow!("Invalid taxonomy kind: {}", s)),
        }
    }
}

/// A category or material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Term {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// URL-friendly slug (unique per kind)
    pub slug: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Term {
    /// Create a new term; the ID is assigned by the database.
    pub fn new(name: String, slug: String) -> Self {
        Self {
            id: 0,
            name,
            slug,
            created_at: Utc::now(),
        }
    }

    /// Listing page for this term
    pub fn url(&self, kind: TaxonomyKind) -> String {
        format!("{}/{}", kind.path_prefix(), self.slug)
    }
}

/// Input for creating a category or material
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTermInput {
    /// Display name
    pub name: String,
    /// Explicit slug; generated from the name when absent
    #[serde(default)]
    pub slug: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tables() {
        assert_eq!(TaxonomyKind::Category.table(), "categories");
        assert_eq!(TaxonomyKind::Material.table(), "materials");
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Category".parse::<TaxonomyKind>().unwrap(), TaxonomyKind::Category);
        assert_eq!("material".parse::<TaxonomyKind>().unwrap(), TaxonomyKind::Material);
        assert!("tag".parse::<TaxonomyKind>().is_err());
    }

    #[test]
    fn test_term_url() {
        let term = Term::new("Modern Art".to_string(), "modern-art".to_string());
        assert_eq!(term.url(TaxonomyKind::Category), "/categories/modern-art");
        assert_eq!(term.url(TaxonomyKind::Material), "/materials/modern-art");
    }
}
