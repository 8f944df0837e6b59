//! Browser pages
//!
//! - GET /exhibitions/{id} - Exhibition detail (records a click)
//! - GET /pieces/{id} - Piece detail (records a click)
//! - GET /me/likes/exhibitions, /me/likes/pieces - The viewer's likes
//! - GET /search/exhibitions/{q}, /search/pieces/{q} - Substring search
//! - GET /categories/{slug}, /materials/{slug} - Taxonomy pages

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use tera::Context as TeraContext;

use crate::api::common::{PageNav, PageQuery};
use crate::api::middleware::AppState;
use crate::api::responses::Browser;
use crate::models::{TargetKind, TaxonomyKind};
use crate::services::LedgerError;

/// Build the page router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/exhibitions/{id}", get(exhibition_detail))
        .route("/pieces/{id}", get(piece_detail))
        .route("/me/likes/exhibitions", get(liked_exhibitions))
        .route("/me/likes/pieces", get(liked_pieces))
        .route("/search/exhibitions/{q}", get(search_exhibitions))
        .route("/search/pieces/{q}", get(search_pieces))
        .route("/categories/{slug}", get(category_page))
        .route("/materials/{slug}", get(material_page))
}

async fn exhibition_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    browser: Browser,
) -> Result<Response, Response> {
    let detail = state
        .catalog_service
        .exhibition_detail(id, &browser.viewer())
        .await
        .map_err(|e| browser.fail(&state, e))?;

    let mut context = TeraContext::new();
    context.insert("detail", &detail);
    Ok(browser.render(&state, "exhibition_detail.html", &context))
}

async fn piece_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    browser: Browser,
) -> Result<Response, Response> {
    let detail = state
        .catalog_service
        .piece_detail(id, &browser.viewer())
        .await
        .map_err(|e| browser.fail(&state, e))?;

    let mut context = TeraContext::new();
    context.insert("detail", &detail);
    Ok(browser.render(&state, "piece_detail.html", &context))
}

async fn liked_exhibitions(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    browser: Browser,
) -> Result<Response, Response> {
    liked(state, TargetKind::Exhibition, query.page, browser).await
}

async fn liked_pieces(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    browser: Browser,
) -> Result<Response, Response> {
    liked(state, TargetKind::Piece, query.page, browser).await
}

async fn liked(state: AppState, kind: TargetKind, page: u32, browser: Browser) -> Result<Response, Response> {
    let listing = state
        .listing_service
        .liked(kind, &browser.viewer(), page)
        .await
        .map_err(|e| browser.fail(&state, e))?;

    let mut context = TeraContext::new();
    PageNav::of(&listing.page).insert_into(&mut context);
    context.insert("mode", listing.mode);
    context.insert("page", &listing.page);
    Ok(browser.render(&state, "liked.html", &context))
}

async fn search_exhibitions(
    State(state): State<AppState>,
    Path(q): Path<String>,
    Query(query): Query<PageQuery>,
    browser: Browser,
) -> Result<Response, Response> {
    let results = state
        .listing_service
        .search_exhibitions(&q, query.page)
        .await
        .map_err(|e| browser.fail(&state, e))?;

    let mut context = TeraContext::new();
    PageNav::of(&results).insert_into(&mut context);
    context.insert("mode", TargetKind::Exhibition.label());
    context.insert("query", &q);
    context.insert("page", &results);
    Ok(browser.render(&state, "search.html", &context))
}

async fn search_pieces(
    State(state): State<AppState>,
    Path(q): Path<String>,
    Query(query): Query<PageQuery>,
    browser: Browser,
) -> Result<Response, Response> {
    let results = state
        .listing_service
        .search_pieces(&q, query.page)
        .await
        .map_err(|e| browser.fail(&state, e))?;

    let mut context = TeraContext::new();
    PageNav::of(&results).insert_into(&mut context);
    context.insert("mode", TargetKind::Piece.label());
    context.insert("query", &q);
    context.insert("page", &results);
    Ok(browser.render(&state, "search.html", &context))
}

async fn category_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    browser: Browser,
) -> Result<Response, Response> {
    let term_page = state
        .listing_service
        .category_page(&slug)
        .await
        .map_err(|e| browser.fail(&state, e))?;

    let mut context = TeraContext::new();
    context.insert("kind", &TaxonomyKind::Category.to_string());
    context.insert("path_prefix", TaxonomyKind::Category.path_prefix());
    context.insert("term_page", &term_page);
    Ok(browser.render(&state, "term.html", &context))
}

async fn material_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    browser: Browser,
) -> Result<Response, Response> {
    let term_page = state
        .listing_service
        .material_page(&slug)
        .await
        .map_err(|e| browser.fail(&state, e))?;

    let mut context = TeraContext::new();
    context.insert("kind", &TaxonomyKind::Material.to_string());
    context.insert("path_prefix", TaxonomyKind::Material.path_prefix());
    context.insert("term_page", &term_page);
    Ok(browser.render(&state, "term.html", &context))
}

/// Fallback for unknown paths
pub async fn not_found(State(state): State<AppState>, browser: Browser) -> Response {
    let path = browser.path.clone();
    browser.fail(&state, LedgerError::NotFound(format!("page {} not found", path)))
}
