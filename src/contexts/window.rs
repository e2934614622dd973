//! Character windows around a mention.
use crate::matching::{CharOffsets, Span};

/// Bounds of the window of radius `radius` around `[start, end)` in a text of
/// `len` characters.
///
/// The window never leaves `[0, len)`. When it is clamped on one side, the
/// characters lost there are taken on the other side, so that its length is
/// `min(2 * radius + (end - start), len)`.
pub fn bounds(len: usize, start: usize, end: usize, radius: usize) -> (usize, usize) {
    let end = end.min(len);
    let start = start.min(end);

    let lost_left = radius.saturating_sub(start);
    let lost_right = (end + radius).saturating_sub(len);

    let lo = start.saturating_sub(radius + lost_right);
    let hi = (end + radius + lost_left).min(len);
    (lo, hi)
}

/// A slice of a page text, with its character bounds in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

impl<'a> Window<'a> {
    /// Window of radius `radius` around a character span.
    pub fn around(text: &'a str, offsets: &CharOffsets, span: Span, radius: usize) -> Self {
        let (start, end) = bounds(offsets.len_chars(), span.start, span.end, radius);
        Self {
            text: offsets.slice(text, start, end),
            start,
            end,
        }
    }

    /// Single line version of the window, used as a debug context.
    pub fn one_line(&self) -> String {
        self.text.replace(['\n', '\r'], " ")
    }
}
