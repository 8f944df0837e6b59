//! Services layer - Business logic
//!
//! This module contains the gallery's business rules. The interaction ledger
//! (comments, guestbook entries, likes, shares and the listing views) sits on
//! top of the catalog and account services. Services are responsible for:
//! - Guarding every mutation with authentication and ownership checks
//! - Coordinating between repositories
//! - Turning outcomes into redirect targets and listings

pub mod catalog;
pub mod entry;
pub mod error;
pub mod guard;
pub mod like;
pub mod listing;
pub mod outcome;
pub mod password;
pub mod share;
pub mod target;
pub mod user;

pub use catalog::{generate_slug, CatalogRepositories, CatalogService, ExhibitionDetail, PieceDetail};
pub use entry::EntryService;
pub use error::LedgerError;
pub use guard::{assert_owner, Viewer};
pub use like::LikeService;
pub use listing::{Listing, ListingService, TermPage, LISTING_PAGE_SIZE};
pub use outcome::Redirect;
pub use password::{hash_password, verify_password};
pub use share::ShareService;
pub use target::TargetDirectory;
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
