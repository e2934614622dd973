//! Multi-pattern surface form matcher.
use std::collections::BTreeSet;

use aho_corasick::{AhoCorasick, MatchKind};

use crate::config::OverlapPolicy;
use crate::error::Error;

use super::spans::{self, Span};

/// An occurrence of a pattern, in byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMatch {
    pub pattern: usize,
    pub span: Span,
}

/// Exact, case-sensitive phrase matcher.
///
/// Every occurrence is reported, including nested and overlapping ones, as long
/// as it is aligned on token boundaries: `Berlin` is found in `Berlin's` but
/// not in `Berliner`.
#[derive(Debug, Clone)]
pub struct Matcher {
    automaton: Option<AhoCorasick>,
    patterns: Vec<String>,
}

/// `true` if the match does not cut a word at either end.
fn on_token_boundary(text: &str, start: usize, end: usize) -> bool {
    let matched = &text[start..end];
    let cuts = |inside: Option<char>, outside: Option<char>| match (inside, outside) {
        (Some(i), Some(o)) => i.is_alphanumeric() && o.is_alphanumeric(),
        _ => false,
    };

    !cuts(matched.chars().next(), text[..start].chars().next_back())
        && !cuts(matched.chars().next_back(), text[end..].chars().next())
}

impl Matcher {
    /// Build a matcher. Blank patterns and duplicates are ignored.
    pub fn new<I, S>(forms: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: BTreeSet<String> = forms
            .into_iter()
            .map(|form| form.as_ref().to_string())
            .filter(|form| !form.trim().is_empty())
            .collect();
        let patterns: Vec<String> = patterns.into_iter().collect();

        let automaton = if patterns.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .match_kind(MatchKind::Standard)
                    .build(&patterns)?,
            )
        };

        Ok(Self {
            automaton,
            patterns,
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Surface form of a pattern index.
    pub fn pattern(&self, idx: usize) -> &str {
        &self.patterns[idx]
    }

    /// Every boundary-aligned occurrence, in no particular order.
    pub fn find(&self, text: &str) -> Vec<RawMatch> {
        match &self.automaton {
            Some(automaton) => automaton
                .find_overlapping_iter(text)
                .filter(|m| on_token_boundary(text, m.start(), m.end()))
                .map(|m| RawMatch {
                    pattern: m.pattern().as_usize(),
                    span: Span::new(m.start(), m.end()),
                })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Occurrences with nested ones removed, sorted by start offset.
    pub fn find_resolved(&self, text: &str, policy: OverlapPolicy) -> Vec<RawMatch> {
        spans::resolve_by(self.find(text), |m| m.span, policy)
    }

    /// `true` if at least one pattern occurs in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        match &self.automaton {
            Some(automaton) => automaton
                .find_overlapping_iter(text)
                .any(|m| on_token_boundary(text, m.start(), m.end())),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forms(matcher: &Matcher, matches: &[RawMatch]) -> Vec<String> {
        matches
            .iter()
            .map(|m| matcher.pattern(m.pattern).to_string())
            .collect()
    }

    #[test]
    fn boundaries() {
        let m = Matcher::new(["Berlin"]).unwrap();
        assert_eq!(m.find("Berlin's mayor").len(), 1);
        assert_eq!(m.find("a Berliner").len(), 0);
        assert_eq!(m.find("East-Berlin").len(), 1);
        assert_eq!(m.find("(Berlin)").len(), 1);
        assert!(!m.is_match("Berliner"));
    }

    #[test]
    fn case_sensitive() {
        let m = Matcher::new(["Mercury"]).unwrap();
        assert!(m.find("mercury poisoning").is_empty());
        assert_eq!(m.find("Mercury orbits").len(), 1);
    }

    #[test]
    fn punctuation_patterns() {
        let m = Matcher::new(["C++"]).unwrap();
        let found = m.find("Written in C++, mostly.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, Span::new(11, 14));
    }

    #[test]
    fn nested_are_resolved() {
        let m = Matcher::new(["New York", "York", "New York City", ""]).unwrap();
        assert_eq!(m.len(), 3);

        let text = "New York City is not York.";
        let all = m.find(text);
        assert_eq!(all.len(), 4);

        let resolved = m.find_resolved(text, OverlapPolicy::KeepPartial);
        assert_eq!(forms(&m, &resolved), vec!["New York City", "York"]);
        assert_eq!(resolved[1].span, Span::new(21, 25));
    }

    #[test]
    fn multibyte_text() {
        let m = Matcher::new(["Zürich"]).unwrap();
        let text = "Über Zürich.";
        let found = m.find(text);
        assert_eq!(found.len(), 1);
        assert_eq!(&text[found[0].span.start..found[0].span.end], "Zürich");
    }

    #[test]
    fn empty_matcher() {
        let m = Matcher::new(Vec::<String>::new()).unwrap();
        assert!(m.is_empty());
        assert!(m.find("anything").is_empty());
    }
}
