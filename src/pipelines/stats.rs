//! Run reports.
use std::{collections::HashMap, time::Duration};

use itertools::Itertools;
use serde::Serialize;

use crate::candidates::CatalogStats;
use crate::graph::GraphStats;
use crate::sources::ReadStats;

/// Number of entities listed in the mention report.
const TOP_ENTITIES: usize = 10;

/// Counters of a single page, returned by workers.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PageStats {
    /// Boundary-aligned occurrences.
    pub raw: usize,
    /// Occurrences left after span resolution.
    pub resolved: usize,
    /// Resolved occurrences whose entity is a neighbor of the page.
    pub accepted: usize,
    pub elapsed: Duration,
    /// Accepted matches per entity id.
    pub per_entity: HashMap<String, usize>,
}

/// Mention pass counters, aggregated by the coordinator.
#[derive(Debug, Default, Clone, Serialize)]
pub struct MentionStats {
    pub pages: usize,
    pub redirects: usize,
    pub failed: usize,
    pub pages_with_matches: usize,
    pub raw_matches: usize,
    pub resolved_matches: usize,
    pub accepted_matches: usize,
    pub rejected_matches: usize,
    /// Accepted matches that were not already stored.
    pub inserted_matches: usize,
    pub worker_time: Duration,
    pub per_entity: HashMap<String, usize>,
}

impl MentionStats {
    pub fn record(&mut self, page: PageStats) {
        self.pages += 1;
        if page.accepted > 0 {
            self.pages_with_matches += 1;
        }
        self.raw_matches += page.raw;
        self.resolved_matches += page.resolved;
        self.accepted_matches += page.accepted;
        self.rejected_matches += page.resolved - page.accepted;
        self.worker_time += page.elapsed;
        for (entity, count) in page.per_entity {
            *self.per_entity.entry(entity).or_default() += count;
        }
    }

    pub fn record_redirect(&mut self) {
        self.pages += 1;
        self.redirects += 1;
    }

    pub fn record_failure(&mut self) {
        self.pages += 1;
        self.failed += 1;
    }

    /// Running counts, for progress and failure log lines.
    pub fn progress(&self) -> String {
        format!(
            "{} pages seen, {} failed, {} matches accepted",
            self.pages, self.failed, self.accepted_matches
        )
    }

    /// Entities with the most accepted matches, most frequent first.
    pub fn top_entities(&self, n: usize) -> Vec<(&str, usize)> {
        self.per_entity
            .iter()
            .map(|(id, count)| (id.as_str(), *count))
            .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)))
            .take(n)
            .collect()
    }
}

impl std::fmt::Display for MentionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} pages ({} redirects, {} failed), {} with matches",
            self.pages, self.redirects, self.failed, self.pages_with_matches
        )?;
        writeln!(
            f,
            "{} occurrences, {} after span resolution, {} accepted, {} rejected, {} new",
            self.raw_matches,
            self.resolved_matches,
            self.accepted_matches,
            self.rejected_matches,
            self.inserted_matches
        )?;
        write!(
            f,
            "{} entities matched, worker time {:.2?}",
            self.per_entity.len(),
            self.worker_time
        )?;
        let top = self.top_entities(TOP_ENTITIES);
        if !top.is_empty() {
            write!(
                f,
                "\ntop entities: {}",
                top.iter()
                    .map(|(id, count)| format!("{id} ({count})"))
                    .join(", ")
            )?;
        }
        Ok(())
    }
}

/// Link graph pass report.
#[derive(Debug, Clone, Serialize)]
pub struct GraphReport {
    pub read: ReadStats,
    pub graph: GraphStats,
}

impl std::fmt::Display for GraphReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.read, self.graph)
    }
}

/// Mention pass report.
#[derive(Debug, Clone, Serialize)]
pub struct MentionReport {
    pub read: ReadStats,
    pub catalog: CatalogStats,
    pub mentions: MentionStats,
}

impl std::fmt::Display for MentionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}\n{}", self.read, self.catalog, self.mentions)
    }
}

/// Context pass counters.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ContextStats {
    /// Entities with at least one match.
    pub entities: usize,
    /// Matched entities that are not in the catalog anymore.
    pub unknown_entities: usize,
    /// Matches a context was derived from, after sampling.
    pub matches_seen: usize,
    pub missing_text: usize,
    pub out_of_bounds: usize,
    pub cropped_empty: usize,
    /// Contexts that lost their mention when cropped.
    pub unmasked: usize,
    pub contexts: usize,
    /// Contexts that were not already stored.
    pub inserted: usize,
}

impl std::fmt::Display for ContextStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} entities ({} unknown), {} matches: {} contexts ({} new), {} empty after cropping, {} without mention, {} without text, {} out of bounds",
            self.entities,
            self.unknown_entities,
            self.matches_seen,
            self.contexts,
            self.inserted,
            self.cropped_empty,
            self.unmasked,
            self.missing_text,
            self.out_of_bounds
        )
    }
}
