//! Browser responses
//!
//! Ledger outcomes become `303 See Other` redirects, optionally carrying a
//! confirmation in a short-lived `flash` cookie. Rendered pages pick the
//! flash up, show it once and clear the cookie.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use std::convert::Infallible;
use tera::Context as TeraContext;

use crate::api::middleware::{cookie_value, status_for_code, AppState, CurrentViewer, SITE_NAME};
use crate::services::{LedgerError, Redirect, Viewer};
use crate::theme::{CurrentUser, StandardTemplateVars};

/// Cookie carrying the confirmation message across a redirect
pub const FLASH_COOKIE: &str = "flash";

/// Lifetime of the flash cookie in seconds
pub const FLASH_MAX_AGE: i64 = 60;

/// Turn a ledger outcome into a 303 redirect
pub fn redirect(outcome: Redirect) -> Response {
    let location = axum::response::Redirect::to(&outcome.to);
    match outcome.flash {
        Some(message) => {
            let cookie = format!(
                "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
                FLASH_COOKIE,
                urlencoding::encode(&message),
                FLASH_MAX_AGE
            );
            (AppendHeaders([(header::SET_COOKIE, cookie)]), location).into_response()
        }
        None => location.into_response(),
    }
}

/// Decode the pending flash message, if any
pub fn read_flash(headers: &HeaderMap) -> Option<String> {
    let raw = cookie_value(headers, FLASH_COOKIE)?;
    urlencoding::decode(&raw)
        .ok()
        .map(|message| message.into_owned())
        .filter(|message| !message.is_empty())
}

/// Everything a rendered page needs to know about the request
pub struct Browser {
    pub current: CurrentViewer,
    pub flash: Option<String>,
    pub path: String,
}

impl FromRequestParts<AppState> for Browser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let current = CurrentViewer::from_request_parts(parts, state).await?;
        Ok(Self {
            current,
            flash: read_flash(&parts.headers),
            path: parts.uri.path().to_string(),
        })
    }
}

impl Browser {
    pub fn viewer(&self) -> Viewer {
        self.current.viewer
    }

    fn standard_vars(&self) -> StandardTemplateVars {
        let vars = StandardTemplateVars::new(SITE_NAME, self.path.clone()).with_flash(self.flash.clone());
        match self.current.user {
            Some(ref user) => vars.with_user(CurrentUser {
                id: user.id,
                username: user.username.clone(),
            }),
            None => vars,
        }
    }

    /// Render a template, consuming any pending flash message
    pub fn render(&self, state: &AppState, template: &str, context: &TeraContext) -> Response {
        let page = state
            .theme_engine
            .render_with_standard_vars(template, context, &self.standard_vars());
        if page.failed {
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(page.html)).into_response();
        }

        if self.flash.is_some() {
            let clear = format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", FLASH_COOKIE);
            (AppendHeaders([(header::SET_COOKIE, clear)]), Html(page.html)).into_response()
        } else {
            Html(page.html).into_response()
        }
    }

    /// Render the error page for a failed ledger operation
    pub fn fail(&self, state: &AppState, err: LedgerError) -> Response {
        let status = status_for_code(err.code());
        let message = match err {
            LedgerError::Internal(ref e) => {
                tracing::error!("Internal error on {}: {:#}", self.path, e);
                "Internal server error".to_string()
            }
            ref other => {
                tracing::debug!("{} on {}: {}", other.code(), self.path, other);
                other.to_string()
            }
        };

        let mut context = TeraContext::new();
        context.insert("status", &status.as_u16());
        context.insert("error_message", &message);
        let page = state
            .theme_engine
            .render_with_standard_vars("error.html", &context, &self.standard_vars());
        (status, Html(page.html)).into_response()
    }
}
