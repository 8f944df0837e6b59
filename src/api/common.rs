//! Common API utilities and shared types

use serde::{Deserialize, Serialize};

use crate::models::PagedResult;

/// Default page number (1-indexed)
pub fn default_page() -> u32 {
    1
}

/// `?page=N` on paginated listings
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
}

/// Page navigation derived from a [`PagedResult`], for templates
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PageNav {
    pub total_pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageNav {
    pub fn of<T>(page: &PagedResult<T>) -> Self {
        Self {
            total_pages: page.total_pages(),
            has_prev: page.has_prev(),
            has_next: page.has_next(),
        }
    }

    /// Insert the navigation fields at the top level of a template context
    pub fn insert_into(&self, context: &mut tera::Context) {
        context.insert("total_pages", &self.total_pages);
        context.insert("has_prev", &self.has_prev);
        context.insert("has_next", &self.has_next);
    }
}
