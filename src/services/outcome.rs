//! Mutation outcomes

use serde::Serialize;

/// Where the browser goes after a mutation, plus an optional one-line notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    /// Canonical URL to send the visitor to
    pub to: String,
    /// Confirmation shown on the next page
    pub flash: Option<String>,
}

impl Redirect {
    /// Redirect without a message
    pub fn to(url: impl Into<String>) -> Self {
        Self {
            to: url.into(),
            flash: None,
        }
    }

    /// Attach a confirmation message
    pub fn with_flash(mut self, message: impl Into<String>) -> Self {
        self.flash = Some(message.into());
        self
    }
}
