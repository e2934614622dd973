//! Entity masking.
use crate::config::OverlapPolicy;
use crate::matching::Matcher;

/// Replaces the mentions of an entity with a placeholder character.
#[derive(Debug, Clone, Copy)]
pub struct Masker {
    mask_char: char,
    policy: OverlapPolicy,
}

impl Default for Masker {
    fn default() -> Self {
        Self::new('#', OverlapPolicy::default())
    }
}

impl Masker {
    pub fn new(mask_char: char, policy: OverlapPolicy) -> Self {
        Self { mask_char, policy }
    }

    /// Mask every resolved occurrence of `mentions` in `context`.
    ///
    /// Each masked character is replaced by exactly one mask character, so
    /// the masked context has as many characters as `context`.
    /// Returns [None] if `context` has no occurrence.
    pub fn mask(&self, context: &str, mentions: &Matcher) -> Option<String> {
        let found = mentions.find_resolved(context, self.policy);
        if found.is_empty() {
            return None;
        }

        // sorted by start, and with nested spans removed, by end too
        let mut spans = found.iter().map(|m| m.span).peekable();
        let mut masked = String::with_capacity(context.len());
        for (idx, c) in context.char_indices() {
            while spans.peek().map_or(false, |span| span.end <= idx) {
                spans.next();
            }
            match spans.peek() {
                Some(span) if span.start <= idx => masked.push(self.mask_char),
                _ => masked.push(c),
            }
        }

        Some(masked)
    }
}
