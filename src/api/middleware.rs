//! API middleware
//!
//! Contains:
//! - Application state shared by every handler
//! - `ApiError`, the JSON error body for `/api/v1` routes
//! - Session token extraction (Bearer header or `session` cookie)
//! - The `CurrentViewer` extractor used by browser routes
//! - `require_auth` for the curator API

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::Config;
use crate::db::repositories::{
    SqlxClickRepository, SqlxEntryRepository, SqlxExhibitionRepository, SqlxLikeRepository,
    SqlxPieceRepository, SqlxSessionRepository, SqlxShareRepository, SqlxTaxonomyRepository,
    SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::models::User;
use crate::services::{
    CatalogRepositories, CatalogService, EntryService, LedgerError, LikeService, ListingService,
    ShareService, TargetDirectory, UserService, Viewer,
};
use crate::theme::ThemeEngine;

/// Name shown in page titles
pub const SITE_NAME: &str = "Gallery";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub entry_service: Arc<EntryService>,
    pub like_service: Arc<LikeService>,
    pub share_service: Arc<ShareService>,
    pub listing_service: Arc<ListingService>,
    pub catalog_service: Arc<CatalogService>,
    pub theme_engine: Arc<ThemeEngine>,
    /// Lifetime of the `session` cookie in seconds
    pub session_max_age: i64,
}

impl AppState {
    /// Wire repositories and services over one database pool
    pub fn new(pool: DynDatabasePool, theme_engine: ThemeEngine, config: &Config) -> Self {
        let exhibitions = SqlxExhibitionRepository::boxed(pool.clone());
        let pieces = SqlxPieceRepository::boxed(pool.clone());
        let taxonomy = SqlxTaxonomyRepository::boxed(pool.clone());
        let entries = SqlxEntryRepository::boxed(pool.clone());
        let likes = SqlxLikeRepository::boxed(pool.clone());
        let shares = SqlxShareRepository::boxed(pool.clone());
        let clicks = SqlxClickRepository::boxed(pool.clone());
        let targets = TargetDirectory::new(exhibitions.clone(), pieces.clone());

        let user_service = UserService::with_session_expiration(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
            config.session.expiration_days,
        );

        Self {
            user_service: Arc::new(user_service),
            entry_service: Arc::new(EntryService::new(entries.clone(), targets.clone())),
            like_service: Arc::new(LikeService::new(likes.clone(), targets.clone())),
            share_service: Arc::new(ShareService::new(shares.clone(), targets)),
            listing_service: Arc::new(ListingService::new(
                likes.clone(),
                exhibitions.clone(),
                pieces.clone(),
                taxonomy.clone(),
            )),
            catalog_service: Arc::new(CatalogService::new(CatalogRepositories {
                taxonomy,
                exhibitions,
                pieces,
                entries,
                likes,
                shares,
                clicks,
            })),
            theme_engine: Arc::new(theme_engine),
            session_max_age: config.session.expiration_days * 24 * 60 * 60,
        }
    }
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn viewer(&self) -> Viewer {
        Viewer::user(self.0.id)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

/// HTTP status for an error code
pub fn status_for_code(code: &str) -> StatusCode {
    match code {
        "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
        "FORBIDDEN" => StatusCode::FORBIDDEN,
        "NOT_FOUND" => StatusCode::NOT_FOUND,
        "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
        "CONFLICT" => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                Self::internal_error("Internal server error")
            }
            other => Self::new(other.code(), other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (status_for_code(&self.error.code), Json(self)).into_response()
    }
}

/// Read one cookie from the `Cookie` header
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie_str = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_str.split(';').find_map(|cookie| {
        let (key, value) = cookie.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Extract session token from request headers
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    cookie_value(headers, "session").filter(|token| !token.is_empty())
}

async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Option<User> {
    let token = extract_session_token(headers)?;
    match state.user_service.validate_session(&token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Session validation failed: {}", e);
            None
        }
    }
}

/// The request's viewer, anonymous when no valid session is presented
#[derive(Debug, Clone)]
pub struct CurrentViewer {
    pub viewer: Viewer,
    pub user: Option<User>,
}

impl FromRequestParts<AppState> for CurrentViewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = resolve_user(state, &parts.headers).await;
        let viewer = match user {
            Some(ref user) => Viewer::user(user.id),
            None => Viewer::anonymous(),
        };
        Ok(Self { viewer, user })
    }
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = state
        .user_service
        .validate_session(&token)
        .await
        .map_err(|e| ApiError::internal_error(format!("Session validation failed: {}", e)))?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}
