//! Page record.

/// A single page of the dump.
///
/// Only lives for the time it takes to process it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub title: String,
    /// Raw page content (wikitext).
    pub text: String,
    /// Target title if this page is a redirect.
    pub redirect: Option<String>,
}

impl PageRecord {
    pub fn new(title: String, text: String, redirect: Option<String>) -> Self {
        Self {
            title,
            text,
            redirect,
        }
    }

    pub fn is_redirect(&self) -> bool {
        self.redirect.is_some()
    }
}
