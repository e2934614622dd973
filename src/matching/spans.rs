//! Overlap resolution.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::OverlapPolicy;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// `true` if `other` lies within `self`.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Resolve a set of spans.
///
/// A span contained in (or equal to) another span of the set is discarded.
/// Partial overlaps are kept with [OverlapPolicy::KeepPartial]; with
/// [OverlapPolicy::LeftmostLongest] a span overlapping an already kept one is
/// discarded as well.
///
/// The result is sorted by start offset.
pub fn resolve(spans: &[Span], policy: OverlapPolicy) -> Vec<Span> {
    let spans: BTreeSet<Span> = spans.iter().copied().collect();
    resolve_by(spans.into_iter().collect(), |s| *s, policy)
}

/// Resolve items by their span. See [resolve].
///
/// Items sharing the exact same span are deduplicated, keeping the first one.
pub fn resolve_by<T, F>(mut items: Vec<T>, span: F, policy: OverlapPolicy) -> Vec<T>
where
    F: Fn(&T) -> Span,
{
    // start ascending, end descending: any container comes before what it contains.
    items.sort_by(|a, b| {
        let (a, b) = (span(a), span(b));
        a.start.cmp(&b.start).then(b.end.cmp(&a.end))
    });

    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    let mut max_end: Option<usize> = None;

    for item in items {
        let s = span(&item);
        let keep = match (policy, max_end) {
            (_, None) => true,
            (OverlapPolicy::KeepPartial, Some(end)) => s.end > end,
            (OverlapPolicy::LeftmostLongest, Some(end)) => s.start >= end,
        };
        if keep {
            max_end = Some(max_end.map_or(s.end, |end| end.max(s.end)));
            kept.push(item);
        }
    }

    kept
}
