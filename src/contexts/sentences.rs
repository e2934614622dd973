//! Sentence boundary detection.
use unicode_segmentation::UnicodeSegmentation;

/// Splits a text into sentences.
///
/// Returned slices cover the whole input, trailing whitespace included.
pub trait SentenceSplitter {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Unicode (UAX #29) sentence boundaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeSentences;

impl SentenceSplitter for UnicodeSentences {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split_sentence_bounds().collect()
    }
}
