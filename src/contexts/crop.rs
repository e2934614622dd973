//! Context cropping.
use crate::config::CropMode;
use crate::matching::Matcher;

use super::{SentenceSplitter, UnicodeSentences};

/// Trims a raw window to whole tokens or whole sentences.
#[derive(Debug, Clone)]
pub struct Cropper<S = UnicodeSentences> {
    mode: CropMode,
    splitter: S,
}

impl Cropper {
    pub fn new(mode: CropMode) -> Self {
        Self::with_splitter(mode, UnicodeSentences)
    }
}

impl<S: SentenceSplitter> Cropper<S> {
    pub fn with_splitter(mode: CropMode, splitter: S) -> Self {
        Self { mode, splitter }
    }

    pub fn mode(&self) -> CropMode {
        self.mode
    }

    /// Crop a window. `mentions` matches the surface forms of the entity the
    /// window was built for, and is only used in sentence mode.
    ///
    /// Returns [None] if nothing is left.
    pub fn crop(&self, window: &str, mentions: &Matcher) -> Option<String> {
        match self.mode {
            CropMode::Tokens => crop_tokens(window),
            CropMode::Sentences => self.crop_sentences(window, mentions),
        }
    }

    fn crop_sentences(&self, window: &str, mentions: &Matcher) -> Option<String> {
        let sentences: Vec<&str> = self
            .splitter
            .sentences(window)
            .into_iter()
            .flat_map(|sentence| sentence.split('\n'))
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
            .filter(|sentence| sentence.chars().next().map_or(false, char::is_uppercase))
            .collect();

        // the last one is likely truncated
        let (_, sentences) = sentences.split_last()?;

        let kept: Vec<&str> = sentences
            .iter()
            .copied()
            .filter(|sentence| mentions.is_match(sentence))
            .collect();

        if kept.is_empty() {
            None
        } else {
            Some(kept.join("\n"))
        }
    }
}

/// Drop the first and last tokens, that are likely cut.
fn crop_tokens(window: &str) -> Option<String> {
    let tokens: Vec<&str> = window
        .split(' ')
        .filter(|token| !token.trim().is_empty())
        .collect();

    if tokens.len() <= 2 {
        return None;
    }
    Some(tokens[1..tokens.len() - 1].join(" "))
}
