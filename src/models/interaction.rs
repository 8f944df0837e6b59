//! Like, share and click models
//!
//! Exhibitions and pieces carry the same three kinds of visitor interaction.
//! [`TargetKind`] maps each interaction onto its per-target table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{exhibition_url, piece_url, CanonicalUrl, Owned};

/// What an interaction points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// An exhibition
    Exhibition,
    /// A piece
    Piece,
}

impl TargetKind {
    /// Table holding the targets themselves
    pub fn table(&self) -> &'static str {
        match self {
            TargetKind::Exhibition => "exhibitions",
            TargetKind::Piece => "pieces",
        }
    }

    /// Foreign-key column referencing the target
    pub fn column(&self) -> &'static str {
        match self {
            TargetKind::Exhibition => "exhibition_id",
            TargetKind::Piece => "piece_id",
        }
    }

    /// Table of likes on this kind of target
    pub fn like_table(&self) -> &'static str {
        match self {
            TargetKind::Exhibition => "exhibition_likes",
            TargetKind::Piece => "piece_likes",
        }
    }

    /// Table of shares on this kind of target
    pub fn share_table(&self) -> &'static str {
        match self {
            TargetKind::Exhibition => "exhibition_shares",
            TargetKind::Piece => "piece_shares",
        }
    }

    /// Table of clicks on this kind of target
    pub fn click_table(&self) -> &'static str {
        match self {
            TargetKind::Exhibition => "exhibition_clicks",
            TargetKind::Piece => "piece_clicks",
        }
    }

    /// Canonical page of the target with `id`
    pub fn url(&self, id: i64) -> String {
        match self {
            TargetKind::Exhibition => exhibition_url(id),
            TargetKind::Piece => piece_url(id),
        }
    }

    /// Label handed to listing templates
    pub fn label(&self) -> &'static str {
        match self {
            TargetKind::Exhibition => "exhibition",
            TargetKind::Piece => "piece",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A user's like on an exhibition or piece. At most one per (target, user).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Like {
    /// Unique identifier (per kind)
    pub id: i64,
    /// Exhibition or piece
    pub kind: TargetKind,
    /// Liked target
    pub target_id: i64,
    /// Owner of the like
    pub user_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Like {
    /// Canonical page of the liked target
    pub fn parent_url(&self) -> String {
        self.kind.url(self.target_id)
    }
}

impl CanonicalUrl for Like {
    fn canonical_url(&self) -> String {
        format!("{}#like-{}", self.parent_url(), self.id)
    }
}

impl Owned for Like {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// A like joined with the name of what was liked, for the "my likes" pages.
#[derive(Debug, Clone, Serialize)]
pub struct LikedItem {
    /// The like record
    #[serde(flatten)]
    pub like: Like,
    /// Name of the liked exhibition or piece
    pub target_name: String,
}

/// A share record. Unlike likes, a user may share the same target many times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Share {
    /// Unique identifier (per kind)
    pub id: i64,
    /// Exhibition or piece
    pub kind: TargetKind,
    /// Shared target
    pub target_id: i64,
    /// Sharing user
    pub user_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Interaction totals shown on a detail page.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct InteractionCounts {
    pub likes: i64,
    pub shares: i64,
    pub clicks: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn like(kind: TargetKind, id: i64, target_id: i64) -> Like {
        Like {
            id,
            kind,
            target_id,
            user_id: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_like_urls() {
        let piece_like = like(TargetKind::Piece, 4, 5);
        assert_eq!(piece_like.canonical_url(), "/pieces/5#like-4");
        assert_eq!(piece_like.parent_url(), "/pieces/5");

        let exhibition_like = like(TargetKind::Exhibition, 1, 2);
        assert_eq!(exhibition_like.canonical_url(), "/exhibitions/2#like-1");
    }

    #[test]
    fn test_target_tables() {
        assert_eq!(TargetKind::Exhibition.like_table(), "exhibition_likes");
        assert_eq!(TargetKind::Piece.share_table(), "piece_shares");
        assert_eq!(TargetKind::Piece.click_table(), "piece_clicks");
        assert_eq!(TargetKind::Piece.column(), "piece_id");
    }

    #[test]
    fn test_labels() {
        assert_eq!(TargetKind::Piece.label(), "piece");
        assert_eq!(TargetKind::Exhibition.to_string(), "exhibition");
    }
}
