/*! Mention matching.

- [Matcher] finds every token-aligned occurrence of known surface forms.
- [spans] removes occurrences nested in other occurrences.
- [CharOffsets] converts byte offsets into the character offsets that are persisted in [Match]es.
!*/
mod matcher;
mod offsets;
pub mod spans;

use serde::{Deserialize, Serialize};

pub use matcher::{Matcher, RawMatch};
pub use offsets::CharOffsets;
pub use spans::Span;

/// An accepted mention of an entity in a page.
///
/// Offsets are character offsets into the plain text of the page, with
/// `start_char < end_char <= len(text)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub entity_id: String,
    pub surface_form: String,
    pub page_title: String,
    pub start_char: usize,
    pub end_char: usize,
    /// Short excerpt around the mention.
    pub debug_context: String,
}

impl Match {
    pub fn span(&self) -> Span {
        Span::new(self.start_char, self.end_char)
    }
}
