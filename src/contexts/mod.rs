/*! Training contexts.

A context is derived from a stored [Match] in three steps:

1. [Window]: the characters around the mention, see [bounds],
1. [Cropper]: the window is trimmed to whole tokens or whole sentences,
1. [Masker]: every mention of the entity is masked.

A context that is empty after cropping, or that lost all of its mentions, is dropped.
!*/
mod crop;
mod mask;
mod sentences;
mod window;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ContextConfig;
use crate::matching::{CharOffsets, Match, Matcher};

pub use crop::Cropper;
pub use mask::Masker;
pub use sentences::{SentenceSplitter, UnicodeSentences};
pub use window::{bounds, Window};

/// A masked training context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRow {
    pub entity_id: String,
    pub surface_form: String,
    pub page_title: String,
    pub unmasked_context: String,
    pub masked_context: String,
}

/// What became of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextOutcome {
    Context(ContextRow),
    /// Nothing left after cropping.
    CroppedEmpty,
    /// No mention left to mask after cropping.
    NoMention,
    /// The match offsets do not fit the page text.
    OutOfBounds,
}

/// Window, crop and mask.
#[derive(Debug, Clone)]
pub struct ContextBuilder<S = UnicodeSentences> {
    radius: usize,
    cropper: Cropper<S>,
    masker: Masker,
}

impl ContextBuilder {
    pub fn new(config: &ContextConfig) -> Self {
        Self::with_splitter(config, UnicodeSentences)
    }
}

impl<S: SentenceSplitter> ContextBuilder<S> {
    pub fn with_splitter(config: &ContextConfig, splitter: S) -> Self {
        Self {
            radius: config.radius,
            cropper: Cropper::with_splitter(config.crop, splitter),
            masker: Masker::new(config.mask_char, config.overlap_policy),
        }
    }

    /// Derive the context of a match.
    ///
    /// `text` is the plain text of the page the match was found in, and
    /// `mentions` matches every surface form of the entity.
    pub fn derive(&self, m: &Match, text: &str, mentions: &Matcher) -> ContextOutcome {
        let offsets = CharOffsets::new(text);
        if m.start_char >= m.end_char || m.end_char > offsets.len_chars() {
            debug!(
                "match {}..{} out of {:?} ({} chars)",
                m.start_char,
                m.end_char,
                m.page_title,
                offsets.len_chars()
            );
            return ContextOutcome::OutOfBounds;
        }

        let window = Window::around(text, &offsets, m.span(), self.radius);
        let cropped = match self.cropper.crop(window.text, mentions) {
            Some(cropped) => cropped,
            None => return ContextOutcome::CroppedEmpty,
        };

        match self.masker.mask(&cropped, mentions) {
            Some(masked) => ContextOutcome::Context(ContextRow {
                entity_id: m.entity_id.clone(),
                surface_form: m.surface_form.clone(),
                page_title: m.page_title.clone(),
                unmasked_context: cropped,
                masked_context: masked,
            }),
            None => ContextOutcome::NoMention,
        }
    }
}
