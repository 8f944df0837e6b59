//! Data models
//!
//! This module contains all data structures used throughout the gallery.
//! Models represent:
//! - Database entities (User, Session, Term, Exhibition, Piece, Entry, Like, Share)
//! - API request/response types
//! - Internal data transfer objects

mod entry;
mod exhibition;
mod interaction;
mod paging;
mod piece;
mod session;
mod taxonomy;
mod user;

pub use entry::{Entry, EntryKind, EntryWithAuthor};
pub use exhibition::{exhibition_url, CreateExhibitionInput, Exhibition};
pub use interaction::{InteractionCounts, Like, LikedItem, Share, TargetKind};
pub use paging::{page_in_range, total_pages, ListParams, PagedResult};
pub use piece::{piece_url, CreatePieceInput, Piece};
pub use session::Session;
pub use taxonomy::{CreateTermInput, TaxonomyKind, Term};
pub use user::User;

/// Anything with an identifying page that redirects can point at.
pub trait CanonicalUrl {
    /// Path (plus fragment, for nested records) of the entity's page
    fn canonical_url(&self) -> String;
}

/// Records that belong to exactly one user.
pub trait Owned {
    /// ID of the owning user
    fn owner_id(&self) -> i64;
}

impl Owned for Exhibition {
    fn owner_id(&self) -> i64 {
        self.curator_id
    }
}
