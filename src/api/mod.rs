//! API layer - HTTP handlers and routing
//!
//! This module contains every HTTP endpoint of the gallery:
//! - Browser pages (exhibition and piece detail, likes, search, taxonomies)
//! - Interaction ledger mutations (comments, guestbook, likes, shares)
//! - JSON account endpoints under `/api/v1/auth`
//! - JSON catalog endpoints under `/api/v1/curator`

pub mod auth;
pub mod common;
pub mod curator;
pub mod ledger;
pub mod middleware;
pub mod pages;
pub mod responses;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, AuthenticatedUser, CurrentViewer};

/// Build the JSON API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(auth::protected_router())
        .nest("/curator", curator::router())
        .route_layer(axum_middleware::from_fn_with_state(state, middleware::require_auth));

    Router::new()
        .merge(auth::public_router())
        .merge(protected_routes)
}

/// CORS layer allowing credentialed requests from `cors_origin`.
///
/// Credentials cannot be combined with a wildcard origin, so `*` is ignored
/// like any other unusable origin.
fn cors_layer(cors_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    if cors_origin.trim() == "*" {
        tracing::warn!("Ignoring wildcard CORS origin: not allowed with credentials");
        return cors;
    }
    match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!("Ignoring invalid CORS origin '{}': {}", cors_origin, e);
            cors
        }
    }
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = cors_layer(cors_origin);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .merge(pages::router())
        .merge(ledger::router())
        .fallback(pages::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests;
