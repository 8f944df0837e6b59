//! Theme engine
//!
//! This module provides template rendering using Tera.
//! Features:
//! - Built-in templates compiled into the binary
//! - Per-file overrides from the configured template directory
//! - Standard template variables (site name, viewer, flash message)
//! - Fallback to an error template, then to plain HTML

use anyhow::{Context, Result};
use serde::Serialize;
use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context as TeraContext, Tera};

mod error;

pub use error::ThemeError;

/// Templates shipped with the binary, keyed by template name
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("error.html", include_str!("../../templates/error.html")),
    ("exhibition_detail.html", include_str!("../../templates/exhibition_detail.html")),
    ("piece_detail.html", include_str!("../../templates/piece_detail.html")),
    ("liked.html", include_str!("../../templates/liked.html")),
    ("pagination.html", include_str!("../../templates/pagination.html")),
    ("search.html", include_str!("../../templates/search.html")),
    ("term.html", include_str!("../../templates/term.html")),
];

/// Theme engine for rendering templates
pub struct ThemeEngine {
    /// Tera template engine instance
    tera: Tera,
    /// Directory whose `.html` files override the built-in templates
    templates_path: PathBuf,
}

impl ThemeEngine {
    /// Create a new theme engine
    ///
    /// Built-in templates are always registered. Any `.html` file under
    /// `templates_path` replaces the built-in template of the same relative
    /// name; a missing directory simply means no overrides.
    pub fn new(templates_path: &Path) -> Result<Self> {
        let mut engine = Self {
            tera: Tera::default(),
            templates_path: templates_path.to_path_buf(),
        };
        engine.reload_templates()?;
        Ok(engine)
    }

    /// Rebuild the template set from the built-ins and the override directory
    pub fn reload_templates(&mut self) -> Result<()> {
        let mut templates: Vec<(String, String)> = BUILTIN_TEMPLATES
            .iter()
            .map(|(name, body)| (name.to_string(), body.to_string()))
            .collect();

        let mut overrides = Vec::new();
        collect_templates_from_dir(&self.templates_path, &self.templates_path, &mut overrides)?;
        for (name, body) in overrides {
            tracing::debug!("Template override: {}", name);
            match templates.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = body,
                None => templates.push((name, body)),
            }
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(templates)
            .map_err(|e| ThemeError::TemplateError(describe(&e)))?;
        self.tera = tera;
        Ok(())
    }

    /// Directory searched for override templates
    pub fn templates_path(&self) -> &Path {
        &self.templates_path
    }

    /// Whether a template with this name is registered
    pub fn has_template(&self, template: &str) -> bool {
        self.tera.get_template_names().any(|name| name == template)
    }

    /// Render a template with the given context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        if !self.has_template(template) {
            return Err(ThemeError::NotFound(template.to_string()).into());
        }
        self.tera
            .render(template, context)
            .map_err(|e| ThemeError::TemplateError(format!("Failed to render '{}': {}", template, describe(&e))).into())
    }

    /// Render a template with standard variables automatically added
    pub fn render_with_standard_vars(
        &self,
        template: &str,
        context: &TeraContext,
        standard_vars: &StandardTemplateVars,
    ) -> RenderedPage {
        let mut full_context = context.clone();
        standard_vars.apply(&mut full_context);
        self.render_with_fallback(template, &full_context)
    }

    /// Render a template with fallback to error template or simple HTML
    ///
    /// If the requested template fails, "error.html" is rendered with a
    /// generic message; if that fails too, a plain HTML page is returned.
    /// Tera error details only go to the log.
    pub fn render_with_fallback(&self, template: &str, context: &TeraContext) -> RenderedPage {
        let e = match self.render(template, context) {
            Ok(html) => return RenderedPage { html, failed: false },
            Err(e) => e,
        };
        tracing::error!("Failed to render template '{}': {:#}", template, e);

        let mut error_context = context.clone();
        error_context.insert("status", &500);
        error_context.insert("error_message", RENDER_FAILURE_MESSAGE);

        let html = match self.render("error.html", &error_context) {
            Ok(html) => html,
            Err(error_template_err) => {
                tracing::error!("Failed to render error template: {:#}", error_template_err);
                Self::simple_error_page()
            }
        };
        RenderedPage { html, failed: true }
    }

    /// Last resort when both the requested template and the error template
    /// fail to render.
    fn simple_error_page() -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Internal Server Error</title>
    <style>
        body {{ font-family: sans-serif; max-width: 600px; margin: 50px auto; }}
        h1 {{ color: #e74c3c; }}
    </style>
</head>
<body>
    <h1>Internal Server Error</h1>
    <p>{}</p>
</body>
</html>"#,
            RENDER_FAILURE_MESSAGE
        )
    }
}

/// Message shown to visitors when a page cannot be rendered
pub const RENDER_FAILURE_MESSAGE: &str = "The page could not be rendered.";

/// Output of a fallback render
#[derive(Debug)]
pub struct RenderedPage {
    pub html: String,
    /// The requested template failed and `html` is an error page
    pub failed: bool,
}

/// Recursively collect `.html` files from a directory with relative names
fn collect_templates_from_dir(base_path: &Path, current_path: &Path, out: &mut Vec<(String, String)>) -> Result<()> {
    if !current_path.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(current_path).map_err(ThemeError::from)? {
        let path = entry.map_err(ThemeError::from)?.path();

        if path.is_dir() {
            collect_templates_from_dir(base_path, &path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "html") {
            let relative_path = path
                .strip_prefix(base_path)
                .map_err(|_| ThemeError::TemplateError("Failed to get relative path".to_string()))?;

            // Forward slashes keep names stable across platforms
            let template_name = relative_path.to_string_lossy().replace('\\', "/");

            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template: {:?}", path))?;
            out.push((template_name, content));
        }
    }

    Ok(())
}

/// Flatten a Tera error and its sources into one message
fn describe(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

/// Standard template variables injected into every page
#[derive(Debug, Clone, Serialize)]
pub struct StandardTemplateVars {
    /// Gallery name
    pub site_name: String,
    /// Logged-in viewer, if any
    pub current_user: Option<CurrentUser>,
    /// Current request path
    pub request_path: String,
    /// Confirmation carried over from the previous redirect
    pub flash: Option<String>,
    /// Current year (for the footer)
    pub year: i32,
}

/// Current user information for templates
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

impl StandardTemplateVars {
    /// Create new standard template variables
    pub fn new(site_name: impl Into<String>, request_path: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            current_user: None,
            request_path: request_path.into(),
            flash: None,
            year: chrono::Utc::now().year(),
        }
    }

    /// Set the current user
    pub fn with_user(mut self, user: CurrentUser) -> Self {
        self.current_user = Some(user);
        self
    }

    /// Set the flash message
    pub fn with_flash(mut self, flash: Option<String>) -> Self {
        self.flash = flash;
        self
    }

    fn apply(&self, context: &mut TeraContext) {
        context.insert("site_name", &self.site_name);
        context.insert("request_path", &self.request_path);
        context.insert("year", &self.year);
        if let Some(ref user) = self.current_user {
            context.insert("current_user", user);
        }
        if let Some(ref flash) = self.flash {
            context.insert("flash", flash);
        }
    }
}

use chrono::Datelike;
