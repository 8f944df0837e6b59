//! Catalog service
//!
//! Curators build the gallery: categories and materials, exhibitions, and the
//! pieces inside them. Visitors read it through the exhibition and piece
//! detail pages, which are also the canonical pages every ledger redirect
//! points at. Each detail view records a click.

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;

use crate::db::repositories::{
    is_unique_violation, ClickRepository, EntryRepository, ExhibitionRepository, LikeRepository, PieceRepository,
    ShareRepository, TaxonomyRepository,
};
use crate::models::{
    CreateExhibitionInput, CreatePieceInput, CreateTermInput, EntryKind, EntryWithAuthor, Exhibition,
    InteractionCounts, Like, Piece, TargetKind, TaxonomyKind, Term,
};

use super::{assert_owner, LedgerError, Viewer};

/// Everything the exhibition page shows
#[derive(Debug, Serialize)]
pub struct ExhibitionDetail {
    pub exhibition: Exhibition,
    pub category: Term,
    pub pieces: Vec<Piece>,
    pub guestbook: Vec<EntryWithAuthor>,
    pub counts: InteractionCounts,
    /// The viewer's own like, so the page can offer "unlike"
    pub viewer_like: Option<Like>,
}

/// Everything the piece page shows
#[derive(Debug, Serialize)]
pub struct PieceDetail {
    pub piece: Piece,
    pub exhibition: Exhibition,
    pub material: Term,
    pub comments: Vec<EntryWithAuthor>,
    pub counts: InteractionCounts,
    pub viewer_like: Option<Like>,
}

/// Repositories the catalog reads and writes
pub struct CatalogRepositories {
    pub taxonomy: Arc<dyn TaxonomyRepository>,
    pub exhibitions: Arc<dyn ExhibitionRepository>,
    pub pieces: Arc<dyn PieceRepository>,
    pub entries: Arc<dyn EntryRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub shares: Arc<dyn ShareRepository>,
    pub clicks: Arc<dyn ClickRepository>,
}

/// Catalog management and detail pages
pub struct CatalogService {
    repos: CatalogRepositories,
}

impl CatalogService {
    /// Create a new catalog service
    pub fn new(repos: CatalogRepositories) -> Self {
        Self { repos }
    }

    /// Create a category or material.
    ///
    /// The slug is generated from the name when not given and must be unique
    /// within its kind.
    pub async fn create_term(&self, kind: TaxonomyKind, viewer: &Viewer, input: CreateTermInput) -> Result<Term, LedgerError> {
        viewer.require_user()?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation(format!("The {} name cannot be empty", kind)));
        }

        let slug = match input.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => generate_slug(slug),
            _ => generate_slug(name),
        };
        if slug.is_empty() {
            return Err(LedgerError::Validation(format!("Cannot derive a slug from '{}'", name)));
        }

        let slug_taken = || LedgerError::Validation(format!("The {} slug '{}' is already taken", kind, slug));
        if self
            .repos
            .taxonomy
            .exists_by_slug(kind, &slug)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Err(slug_taken());
        }

        // A concurrent insert can still win the slug between check and insert
        let term = match self
            .repos
            .taxonomy
            .create(kind, &Term::new(name.to_string(), slug.clone()))
            .await
        {
            Ok(term) => term,
            Err(e) if is_unique_violation(&e) => return Err(slug_taken()),
            Err(e) => return Err(e.context(format!("Failed to create {}", kind)).into()),
        };

        tracing::info!(kind = %kind, id = term.id, slug = %term.slug, "Term created");
        Ok(term)
    }

    /// Every category or material
    pub async fn list_terms(&self, kind: TaxonomyKind) -> Result<Vec<Term>, LedgerError> {
        let terms = self
            .repos
            .taxonomy
            .list(kind)
            .await
            .with_context(|| format!("Failed to list {}", kind.table()))?;
        Ok(terms)
    }

    /// Open a new exhibition curated by the viewer
    pub async fn create_exhibition(&self, viewer: &Viewer, input: CreateExhibitionInput) -> Result<Exhibition, LedgerError> {
        let curator_id = viewer.require_user()?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("The exhibition name cannot be empty".to_string()));
        }
        self.require_term_id(TaxonomyKind::Category, input.category_id).await?;

        let exhibition = self
            .repos
            .exhibitions
            .create(&Exhibition::new(
                name.to_string(),
                input.description.trim().to_string(),
                input.category_id,
                curator_id,
            ))
            .await
            .context("Failed to create exhibition")?;

        tracing::info!(id = exhibition.id, curator_id, "Exhibition created");
        Ok(exhibition)
    }

    /// Add a piece to an exhibition the viewer curates
    pub async fn create_piece(&self, viewer: &Viewer, exhibition_id: i64, input: CreatePieceInput) -> Result<Piece, LedgerError> {
        viewer.require_user()?;
        let exhibition = self.require_exhibition(exhibition_id).await?;
        assert_owner(&exhibition, viewer)?;

        let name = input.name.trim();
        let author = input.author.trim();
        if name.is_empty() || author.is_empty() {
            return Err(LedgerError::Validation("A piece needs a name and an author".to_string()));
        }
        self.require_term_id(TaxonomyKind::Material, input.material_id).await?;

        let piece = self
            .repos
            .pieces
            .create(&Piece::new(
                exhibition_id,
                name.to_string(),
                author.to_string(),
                input.material_id,
            ))
            .await
            .context("Failed to create piece")?;

        tracing::info!(id = piece.id, exhibition_id, "Piece created");
        Ok(piece)
    }

    /// Exhibition page; records a click
    pub async fn exhibition_detail(&self, id: i64, viewer: &Viewer) -> Result<ExhibitionDetail, LedgerError> {
        let exhibition = self.require_exhibition(id).await?;
        let category = self
            .repos
            .taxonomy
            .get_by_id(TaxonomyKind::Category, exhibition.category_id)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| anyhow::anyhow!("Exhibition {} has a dangling category", id))?;

        self.record_click(TargetKind::Exhibition, id, viewer).await?;

        let pieces = self
            .repos
            .pieces
            .list_by_exhibition(id)
            .await
            .context("Failed to list pieces")?;
        let guestbook = self
            .repos
            .entries
            .list_for_target(EntryKind::Guestbook, id)
            .await
            .context("Failed to list guestbook")?;
        let counts = self.counts(TargetKind::Exhibition, id).await?;
        let viewer_like = self.viewer_like(TargetKind::Exhibition, id, viewer).await?;

        Ok(ExhibitionDetail {
            exhibition,
            category,
            pieces,
            guestbook,
            counts,
            viewer_like,
        })
    }

    /// Piece page; records a click
    pub async fn piece_detail(&self, id: i64, viewer: &Viewer) -> Result<PieceDetail, LedgerError> {
        let piece = self
            .repos
            .pieces
            .get_by_id(id)
            .await
            .context("Failed to get piece")?
            .ok_or_else(|| LedgerError::not_found("piece", id))?;
        let exhibition = self
            .repos
            .exhibitions
            .get_by_id(piece.exhibition_id)
            .await
            .context("Failed to get exhibition")?
            .ok_or_else(|| anyhow::anyhow!("Piece {} has a dangling exhibition", id))?;
        let material = self
            .repos
            .taxonomy
            .get_by_id(TaxonomyKind::Material, piece.material_id)
            .await
            .context("Failed to get material")?
            .ok_or_else(|| anyhow::anyhow!("Piece {} has a dangling material", id))?;

        self.record_click(TargetKind::Piece, id, viewer).await?;

        let comments = self
            .repos
            .entries
            .list_for_target(EntryKind::Comment, id)
            .await
            .context("Failed to list comments")?;
        let counts = self.counts(TargetKind::Piece, id).await?;
        let viewer_like = self.viewer_like(TargetKind::Piece, id, viewer).await?;

        Ok(PieceDetail {
            piece,
            exhibition,
            material,
            comments,
            counts,
            viewer_like,
        })
    }

    // ========================================================================
    // Private helper methods
    // ========================================================================

    async fn require_exhibition(&self, id: i64) -> Result<Exhibition, LedgerError> {
        self.repos
            .exhibitions
            .get_by_id(id)
            .await
            .context("Failed to get exhibition")?
            .ok_or_else(|| LedgerError::not_found("exhibition", id))
    }

    async fn require_term_id(&self, kind: TaxonomyKind, id: i64) -> Result<(), LedgerError> {
        let found = self
            .repos
            .taxonomy
            .get_by_id(kind, id)
            .await
            .with_context(|| format!("Failed to get {}", kind))?;
        match found {
            Some(_) => Ok(()),
            None => Err(LedgerError::Validation(format!("Unknown {} {}", kind, id))),
        }
    }

    async fn record_click(&self, kind: TargetKind, id: i64, viewer: &Viewer) -> Result<(), LedgerError> {
        self.repos
            .clicks
            .record(kind, id, viewer.user_id())
            .await
            .with_context(|| format!("Failed to record {} click", kind))?;
        Ok(())
    }

    async fn counts(&self, kind: TargetKind, id: i64) -> Result<InteractionCounts, LedgerError> {
        Ok(InteractionCounts {
            likes: self.repos.likes.count_for_target(kind, id).await?,
            shares: self.repos.shares.count_for_target(kind, id).await?,
            clicks: self.repos.clicks.count_for_target(kind, id).await?,
        })
    }

    async fn viewer_like(&self, kind: TargetKind, id: i64, viewer: &Viewer) -> Result<Option<Like>, LedgerError> {
        let Some(user_id) = viewer.user_id() else {
            return Ok(None);
        };
        let like = self
            .repos
            .likes
            .find(kind, id, user_id)
            .await
            .with_context(|| format!("Failed to find {} like", kind))?;
        Ok(like)
    }
}

/// Generate a URL-friendly slug from a name
///
/// Converts the name to lowercase, replaces spaces and special characters
/// with hyphens, and removes consecutive hyphens. Non-ASCII letters are kept.
pub fn generate_slug(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_hyphen = false;

    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || (!c.is_ascii() && c.is_alphanumeric()) {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen && !result.is_empty() {
            result.push('-');
            prev_hyphen = true;
        }
    }

    result.trim_end_matches('-').to_string()
}
