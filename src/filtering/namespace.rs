//! Title-level filtering.
use super::Filter;

/// Title prefixes of pages that are not articles.
pub const NON_ARTICLE_PREFIXES: [&str; 31] = [
    "Talk:",
    "User:",
    "User talk:",
    "Wikipedia:",
    "Wikipedia talk:",
    "Project:",
    "File:",
    "File talk:",
    "Image:",
    "MediaWiki:",
    "MediaWiki talk:",
    "Template:",
    "Template talk:",
    "Help:",
    "Help talk:",
    "Category:",
    "Category talk:",
    "Portal:",
    "Portal talk:",
    "Draft:",
    "Draft talk:",
    "Module:",
    "Module talk:",
    "TimedText:",
    "TimedText talk:",
    "Special:",
    "Media:",
    "Book:",
    "Gadget:",
    "Gadget definition:",
    "Education Program:",
];

/// Keeps titles that do not start with a non-article prefix.
pub struct Namespaces {
    prefixes: Vec<String>,
}

impl Namespaces {
    /// Use a custom set of prefixes.
    pub fn with_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::with_prefixes(NON_ARTICLE_PREFIXES)
    }
}

impl Filter<&str> for Namespaces {
    fn detect(&self, title: &str) -> bool {
        !self
            .prefixes
            .iter()
            .any(|prefix| title.starts_with(prefix.as_str()))
    }
}
