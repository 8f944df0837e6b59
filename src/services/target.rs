//! Lookup of like/share/comment targets
//!
//! Ledger operations only need to know that an exhibition or piece exists
//! (and occasionally its name), so they go through this one directory
//! instead of each holding both repositories.

use std::sync::Arc;

use anyhow::Context;

use crate::db::repositories::{ExhibitionRepository, PieceRepository};
use crate::models::TargetKind;

use super::LedgerError;

/// Resolves exhibitions and pieces by ID
#[derive(Clone)]
pub struct TargetDirectory {
    exhibitions: Arc<dyn ExhibitionRepository>,
    pieces: Arc<dyn PieceRepository>,
}

impl TargetDirectory {
    pub fn new(exhibitions: Arc<dyn ExhibitionRepository>, pieces: Arc<dyn PieceRepository>) -> Self {
        Self { exhibitions, pieces }
    }

    /// Name of the target, or `NotFound`
    pub async fn require(&self, kind: TargetKind, id: i64) -> Result<String, LedgerError> {
        let name = match kind {
            TargetKind::Exhibition => self
                .exhibitions
                .get_by_id(id)
                .await
                .context("Failed to look up exhibition")?
                .map(|e| e.name),
            TargetKind::Piece => self
                .pieces
                .get_by_id(id)
                .await
                .context("Failed to look up piece")?
                .map(|p| p.name),
        };
        name.ok_or_else(|| LedgerError::not_found(kind, id))
    }
}
