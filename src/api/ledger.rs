//! Interaction ledger endpoints
//!
//! Every mutation answers with a 303 redirect (plus a flash cookie where the
//! ledger produced a confirmation) or an error page.
//!
//! - GET|POST /pieces/{id}/comments/new, POST /comments/{id}/delete
//! - GET|POST /exhibitions/{id}/guestbook/new, POST /guestbook/{id}/delete
//! - POST /exhibitions/{id}/like, POST /exhibition-likes/{id}/delete
//! - POST /pieces/{id}/like, POST /piece-likes/{id}/delete
//! - POST /exhibitions/{id}/share, POST /pieces/{id}/share

use axum::{
    extract::{rejection::FormRejection, Path, State},
    response::Response,
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use crate::api::middleware::AppState;
use crate::api::responses::{redirect, Browser};
use crate::models::{EntryKind, TargetKind};

/// Body of a comment or guestbook submission
#[derive(Debug, Deserialize)]
pub struct EntryForm {
    pub content: Option<String>,
}

/// Build the ledger router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pieces/{id}/comments/new", get(show_comment_form).post(post_comment))
        .route("/comments/{id}/delete", post(delete_comment))
        .route(
            "/exhibitions/{id}/guestbook/new",
            get(show_guestbook_form).post(post_guestbook),
        )
        .route("/guestbook/{id}/delete", post(delete_guestbook))
        .route("/exhibitions/{id}/like", post(like_exhibition))
        .route("/exhibition-likes/{id}/delete", post(dislike_exhibition))
        .route("/pieces/{id}/like", post(like_piece))
        .route("/piece-likes/{id}/delete", post(dislike_piece))
        .route("/exhibitions/{id}/share", post(share_exhibition))
        .route("/pieces/{id}/share", post(share_piece))
}

fn submitted_content(form: Result<Form<EntryForm>, FormRejection>) -> Option<String> {
    form.ok().and_then(|Form(body)| body.content)
}

async fn create_entry(
    state: &AppState,
    browser: &Browser,
    kind: EntryKind,
    target_id: i64,
    content: Option<String>,
) -> Result<Response, Response> {
    let outcome = state
        .entry_service
        .create(kind, target_id, &browser.viewer(), content)
        .await
        .map_err(|e| browser.fail(state, e))?;
    Ok(redirect(outcome))
}

async fn delete_entry(state: &AppState, browser: &Browser, kind: EntryKind, id: i64) -> Result<Response, Response> {
    let outcome = state
        .entry_service
        .delete(kind, id, &browser.viewer())
        .await
        .map_err(|e| browser.fail(state, e))?;
    Ok(redirect(outcome))
}

async fn show_comment_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    browser: Browser,
) -> Result<Response, Response> {
    create_entry(&state, &browser, EntryKind::Comment, id, None).await
}

async fn post_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    browser: Browser,
    form: Result<Form<EntryForm>, FormRejection>,
) -> Result<Response, Response> {
    create_entry(&state, &browser, EntryKind::Comment, id, submitted_content(form)).await
}

async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    browser: Browser,
) -> Result<Response, Response> {
    delete_entry(&state, &browser, EntryKind::Comment, id).await
}

async fn show_guestbook_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    browser: Browser,
) -> Result<Response, Response> {
    create_entry(&state, &browser, EntryKind::Guestbook, id, None).await
}

async fn post_guestbook(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    browser: Browser,
    form: Result<Form<EntryForm>, FormRejection>,
) -> Result<Response, Response> {
    create_entry(&state, &browser, EntryKind::Guestbook, id, submitted_content(form)).await
}

async fn delete_guestbook(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    browser: Browser,
) -> Result<Response, Response> {
    delete_entry(&state, &browser, EntryKind::Guestbook, id).await
}

async fn like(state: &AppState, browser: &Browser, kind: TargetKind, target_id: i64) -> Result<Response, Response> {
    let outcome = state
        .like_service
        .like(kind, target_id, &browser.viewer())
        .await
        .map_err(|e| browser.fail(state, e))?;
    Ok(redirect(outcome))
}

async fn dislike(state: &AppState, browser: &Browser, kind: TargetKind, like_id: i64) -> Result<Response, Response> {
    let outcome = state
        .like_service
        .dislike(kind, like_id, &browser.viewer())
        .await
        .map_err(|e| browser.fail(state, e))?;
    Ok(redirect(outcome))
}

async fn share(state: &AppState, browser: &Browser, kind: TargetKind, target_id: i64) -> Result<Response, Response> {
    let outcome = state
        .share_service
        .share(kind, target_id, &browser.viewer())
        .await
        .map_err(|e| browser.fail(state, e))?;
    Ok(redirect(outcome))
}

async fn like_exhibition(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    browser: Browser,
) -> Result<Response, Response> {
    like(&state, &browser, TargetKind::Exhibition, id).await
}

async fn dislike_exhibition(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    browser: Browser,
) -> Result<Response, Response> {
    dislike(&state, &browser, TargetKind::Exhibition, id).await
}

async fn like_piece(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    browser: Browser,
) -> Result<Response, Response> {
    like(&state, &browser, TargetKind::Piece, id).await
}

async fn dislike_piece(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    browser: Browser,
) -> Result<Response, Response> {
    dislike(&state, &browser, TargetKind::Piece, id).await
}

async fn share_exhibition(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    browser: Browser,
) -> Result<Response, Response> {
    share(&state, &browser, TargetKind::Exhibition, id).await
}

async fn share_piece(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    browser: Browser,
) -> Result<Response, Response> {
    share(&state, &browser, TargetKind::Piece, id).await
}
