//! Byte/character offset conversion.
//!
//! Matching works on byte offsets, while persisted offsets are counted in
//! characters (Unicode scalar values).

/// Byte offset of every character boundary of a text.
#[derive(Debug, Clone)]
pub struct CharOffsets {
    /// `bounds[i]` is the byte offset of the `i`-th char. The last entry is the text length.
    bounds: Vec<usize>,
}

impl CharOffsets {
    pub fn new(text: &str) -> Self {
        let mut bounds: Vec<usize> = text.char_indices().map(|(idx, _)| idx).collect();
        bounds.push(text.len());
        Self { bounds }
    }

    /// Text length in characters.
    pub fn len_chars(&self) -> usize {
        self.bounds.len() - 1
    }

    /// Character offset of a byte offset.
    ///
    /// Byte offsets falling inside a character map to that character.
    pub fn char_of(&self, byte: usize) -> usize {
        match self.bounds.binary_search(&byte) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }

    /// Byte offset of a character offset, clamped to the text length.
    pub fn byte_of(&self, char_idx: usize) -> usize {
        self.bounds[char_idx.min(self.len_chars())]
    }

    /// Slice `text` using character offsets.
    pub fn slice<'a>(&self, text: &'a str, start_char: usize, end_char: usize) -> &'a str {
        let start = self.byte_of(start_char);
        let end = self.byte_of(end_char).max(start);
        &text[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii() {
        let o = CharOffsets::new("hello");
        assert_eq!(o.len_chars(), 5);
        assert_eq!(o.char_of(3), 3);
        assert_eq!(o.byte_of(5), 5);
    }

    #[test]
    fn multibyte() {
        let text = "The café costs €50";
        let o = CharOffsets::new(text);
        assert_eq!(o.len_chars(), 18);
        // "€50" starts at byte 17
        assert_eq!(o.char_of(17), 15);
        assert_eq!(o.char_of(text.len()), 18);
        assert_eq!(o.slice(text, 15, 18), "€50");
        assert_eq!(o.slice(text, 4, 8), "café");
    }

    #[test]
    fn clamped() {
        let o = CharOffsets::new("abc");
        assert_eq!(o.byte_of(10), 3);
        assert_eq!(o.slice("abc", 2, 10), "c");
    }
}
