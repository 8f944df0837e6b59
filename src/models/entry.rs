//! Comment and guestbook entry model
//!
//! Comments are left on pieces and guestbook entries on exhibitions. Apart
//! from their parent they behave identically: authored by one user, immutable
//! once posted, deletable only by their author.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CanonicalUrl, Owned, TargetKind};

/// Which family an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Comment on a piece
    Comment,
    /// Guestbook entry on an exhibition
    Guestbook,
}

impl EntryKind {
    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            EntryKind::Comment => "comments",
            EntryKind::Guestbook => "guestbook_entries",
        }
    }

    /// Column holding the parent reference
    pub fn target_column(&self) -> &'static str {
        self.target_kind().column()
    }

    /// Kind of the parent the entry is attached to
    pub fn target_kind(&self) -> TargetKind {
        match self {
            EntryKind::Comment => TargetKind::Piece,
            EntryKind::Guestbook => TargetKind::Exhibition,
        }
    }

    /// Flash shown after a successful post
    pub fn posted_message(&self) -> &'static str {
        match self {
            EntryKind::Comment => "Comment posted.",
            EntryKind::Guestbook => "Guestbook entry posted.",
        }
    }

    /// Flash shown after a successful delete
    pub fn deleted_message(&self) -> &'static str {
        match self {
            EntryKind::Comment => "Comment deleted.",
            EntryKind::Guestbook => "Guestbook entry deleted.",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Comment => write!(f, "comment"),
            EntryKind::Guestbook => write!(f, "guestbook"),
        }
    }
}

/// A posted comment or guestbook entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Unique identifier (per kind)
    pub id: i64,
    /// Comment or guestbook
    pub kind: EntryKind,
    /// Piece ID for comments, exhibition ID for guestbook entries
    pub target_id: i64,
    /// Author
    pub user_id: i64,
    /// Free-text content
    pub content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Create a new entry; the ID is assigned by the database.
    pub fn new(kind: EntryKind, target_id: i64, user_id: i64, content: String) -> Self {
        Self {
            id: 0,
            kind,
            target_id,
            user_id,
            content,
            created_at: Utc::now(),
        }
    }

    /// Canonical page of the parent piece or exhibition
    pub fn parent_url(&self) -> String {
        self.kind.target_kind().url(self.target_id)
    }
}

impl CanonicalUrl for Entry {
    fn canonical_url(&self) -> String {
        format!("{}#{}-{}", self.parent_url(), self.kind, self.id)
    }
}

impl Owned for Entry {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// An entry joined with its author's name, for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct EntryWithAuthor {
    /// The entry itself
    #[serde(flatten)]
    pub entry: Entry,
    /// Author's username
    pub author: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_urls() {
        let mut comment = Entry::new(EntryKind::Comment, 5, 1, "Nice".to_string());
        comment.id = 9;
        assert_eq!(comment.parent_url(), "/pieces/5");
        assert_eq!(comment.canonical_url(), "/pieces/5#comment-9");
    }

    #[test]
    fn test_guestbook_urls() {
        let mut entry = Entry::new(EntryKind::Guestbook, 2, 1, "Was here".to_string());
        entry.id = 3;
        assert_eq!(entry.parent_url(), "/exhibitions/2");
        assert_eq!(entry.canonical_url(), "/exhibitions/2#guestbook-3");
    }

    #[test]
    fn test_entry_kind_columns() {
        assert_eq!(EntryKind::Comment.table(), "comments");
        assert_eq!(EntryKind::Comment.target_column(), "piece_id");
        assert_eq!(EntryKind::Guestbook.table(), "guestbook_entries");
        assert_eq!(EntryKind::Guestbook.target_column(), "exhibition_id");
    }

    #[test]
    fn test_owner_is_author() {
        let entry = Entry::new(EntryKind::Comment, 1, 77, "x".to_string());
        assert_eq!(entry.owner_id(), 77);
    }
}
