//! Listing and search service
//!
//! Read-only views: the viewer's liked pieces and exhibitions, substring
//! search over exhibitions and pieces, and the category and material pages.
//! Paginated views serve 8 items per page; asking for a page past the end is
//! `NotFound`, while page 1 of an empty listing is just empty.

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;

use crate::db::repositories::{ExhibitionRepository, LikeRepository, PieceRepository, TaxonomyRepository};
use crate::models::{
    page_in_range, Exhibition, LikedItem, ListParams, PagedResult, Piece, TargetKind, TaxonomyKind, Term,
};

use super::{LedgerError, Viewer};

/// Page size of every paginated listing
pub const LISTING_PAGE_SIZE: u32 = 8;

/// A paginated listing plus the label the template switches on
#[derive(Debug, Serialize)]
pub struct Listing<T> {
    /// "piece" or "exhibition"
    pub mode: &'static str,
    pub page: PagedResult<T>,
}

/// One category or material with everything filed under it
#[derive(Debug, Serialize)]
pub struct TermPage<T> {
    /// The requested term
    pub term: Term,
    /// Items referencing the term
    pub items: Vec<T>,
    /// Every term of the same kind, for navigation
    pub terms: Vec<Term>,
}

/// Listing and search operations
pub struct ListingService {
    likes: Arc<dyn LikeRepository>,
    exhibitions: Arc<dyn ExhibitionRepository>,
    pieces: Arc<dyn PieceRepository>,
    taxonomy: Arc<dyn TaxonomyRepository>,
}

impl ListingService {
    /// Create a new listing service
    pub fn new(
        likes: Arc<dyn LikeRepository>,
        exhibitions: Arc<dyn ExhibitionRepository>,
        pieces: Arc<dyn PieceRepository>,
        taxonomy: Arc<dyn TaxonomyRepository>,
    ) -> Self {
        Self {
            likes,
            exhibitions,
            pieces,
            taxonomy,
        }
    }

    /// The viewer's likes of one kind, ordered by like ID
    pub async fn liked(&self, kind: TargetKind, viewer: &Viewer, page: u32) -> Result<Listing<LikedItem>, LedgerError> {
        let user_id = viewer.require_user()?;
        let params = ListParams::new(page, LISTING_PAGE_SIZE);

        let (items, total) = self
            .likes
            .list_by_user(kind, user_id, &params)
            .await
            .with_context(|| format!("Failed to list liked {}s", kind))?;
        ensure_page(page, total)?;

        Ok(Listing {
            mode: kind.label(),
            page: PagedResult::new(items, total, &params),
        })
    }

    /// Exhibitions whose name or description contains `query`
    pub async fn search_exhibitions(&self, query: &str, page: u32) -> Result<PagedResult<Exhibition>, LedgerError> {
        let params = ListParams::new(page, LISTING_PAGE_SIZE);
        let (items, total) = self
            .exhibitions
            .search(query, &params)
            .await
            .context("Failed to search exhibitions")?;
        ensure_page(page, total)?;

        tracing::debug!(query, total, page, "Exhibition search");
        Ok(PagedResult::new(items, total, &params))
    }

    /// Pieces whose name, author or material name contains `query`
    pub async fn search_pieces(&self, query: &str, page: u32) -> Result<PagedResult<Piece>, LedgerError> {
        let params = ListParams::new(page, LISTING_PAGE_SIZE);
        let (items, total) = self
            .pieces
            .search(query, &params)
            .await
            .context("Failed to search pieces")?;
        ensure_page(page, total)?;

        tracing::debug!(query, total, page, "Piece search");
        Ok(PagedResult::new(items, total, &params))
    }

    /// Exhibitions in the category with `slug`
    pub async fn category_page(&self, slug: &str) -> Result<TermPage<Exhibition>, LedgerError> {
        let term = self.require_term(TaxonomyKind::Category, slug).await?;
        let items = self
            .exhibitions
            .list_by_category(term.id)
            .await
            .context("Failed to list exhibitions by category")?;
        let terms = self.all_terms(TaxonomyKind::Category).await?;
        Ok(TermPage { term, items, terms })
    }

    /// Pieces made of the material with `slug`
    pub async fn material_page(&self, slug: &str) -> Result<TermPage<Piece>, LedgerError> {
        let term = self.require_term(TaxonomyKind::Material, slug).await?;
        let items = self
            .pieces
            .list_by_material(term.id)
            .await
            .context("Failed to list pieces by material")?;
        let terms = self.all_terms(TaxonomyKind::Material).await?;
        Ok(TermPage { term, items, terms })
    }

    async fn require_term(&self, kind: TaxonomyKind, slug: &str) -> Result<Term, LedgerError> {
        self.taxonomy
            .get_by_slug(kind, slug)
            .await
            .with_context(|| format!("Failed to look up {}", kind))?
            .ok_or_else(|| LedgerError::not_found(kind, format!("'{}'", slug)))
    }

    async fn all_terms(&self, kind: TaxonomyKind) -> Result<Vec<Term>, LedgerError> {
        let terms = self
            .taxonomy
            .list(kind)
            .await
            .with_context(|| format!("Failed to list {}", kind.table()))?;
        Ok(terms)
    }
}

fn ensure_page(page: u32, total: i64) -> Result<(), LedgerError> {
    if page_in_range(page, total, LISTING_PAGE_SIZE) {
        Ok(())
    } else {
        Err(LedgerError::not_found("page", page))
    }
}
