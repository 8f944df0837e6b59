//! Curator API endpoints
//!
//! Catalog management for signed-in curators (all routes require auth):
//! - GET|POST /api/v1/curator/categories
//! - GET|POST /api/v1/curator/materials
//! - POST /api/v1/curator/exhibitions
//! - POST /api/v1/curator/exhibitions/{id}/pieces - Exhibition's curator only

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{CreateExhibitionInput, CreatePieceInput, CreateTermInput, Exhibition, Piece, TaxonomyKind, Term};

/// Build the curator router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/materials", get(list_materials).post(create_material))
        .route("/exhibitions", post(create_exhibition))
        .route("/exhibitions/{id}/pieces", post(create_piece))
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Term>>, ApiError> {
    Ok(Json(state.catalog_service.list_terms(TaxonomyKind::Category).await?))
}

async fn list_materials(State(state): State<AppState>) -> Result<Json<Vec<Term>>, ApiError> {
    Ok(Json(state.catalog_service.list_terms(TaxonomyKind::Material).await?))
}

async fn create_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateTermInput>,
) -> Result<(StatusCode, Json<Term>), ApiError> {
    let term = state
        .catalog_service
        .create_term(TaxonomyKind::Category, &user.viewer(), body)
        .await?;
    Ok((StatusCode::CREATED, Json(term)))
}

async fn create_material(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateTermInput>,
) -> Result<(StatusCode, Json<Term>), ApiError> {
    let term = state
        .catalog_service
        .create_term(TaxonomyKind::Material, &user.viewer(), body)
        .await?;
    Ok((StatusCode::CREATED, Json(term)))
}

async fn create_exhibition(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateExhibitionInput>,
) -> Result<(StatusCode, Json<Exhibition>), ApiError> {
    let exhibition = state.catalog_service.create_exhibition(&user.viewer(), body).await?;
    Ok((StatusCode::CREATED, Json(exhibition)))
}

async fn create_piece(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: AuthenticatedUser,
    Json(body): Json<CreatePieceInput>,
) -> Result<(StatusCode, Json<Piece>), ApiError> {
    let piece = state.catalog_service.create_piece(&user.viewer(), id, body).await?;
    Ok((StatusCode::CREATED, Json(piece)))
}
