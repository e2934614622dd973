/*! Candidate entities.

The entity catalog is loaded fully in memory into a [CandidateTable], which is
then shared read-only by every worker.

Catalog targets are page titles that may be redirects or may not exist in the
dump at all. They are resolved through a [TitleResolver].
!*/
mod catalog;
mod table;

use crate::error::Error;

pub use catalog::{CatalogEntry, CatalogReader};
pub use table::{CandidateEntity, CandidateTable, CatalogStats};

/// Resolves a catalog target into the title of an existing article.
pub trait TitleResolver {
    /// Returns [None] if the title does not lead to a known article.
    fn resolve(&self, title: &str) -> Result<Option<String>, Error>;
}

/// Accepts any non blank title as is.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyTitle;

impl TitleResolver for AnyTitle {
    fn resolve(&self, title: &str) -> Result<Option<String>, Error> {
        let title = title.trim();
        Ok((!title.is_empty()).then(|| title.to_string()))
    }
}
