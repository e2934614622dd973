//! Per-page mention extraction.
//!
//! A [WorkerContext] holds everything a worker needs, and is shared read-only
//! by every worker thread. Processing a page never touches the database.
use std::{
    any::Any,
    collections::HashMap,
    panic::{self, AssertUnwindSafe},
    time::Instant,
};

use crate::candidates::CandidateTable;
use crate::config::{MentionConfig, OverlapPolicy};
use crate::contexts::Window;
use crate::error::Error;
use crate::filtering::{Filter, NeighborFilter};
use crate::graph::{Neighbors, PageHash};
use crate::matching::{spans, CharOffsets, Match, Matcher, Span};
use crate::sources::{markup, PageRecord};
use crate::store::{PageMatches, PageText};

use super::stats::PageStats;

/// Accepted matches of a page, along with its plain text.
#[derive(Debug)]
pub struct PageResult {
    pub rows: PageMatches,
    pub stats: PageStats,
}

/// What a worker sends back to the coordinator.
#[derive(Debug)]
pub enum PageOutcome {
    Done(PageResult),
    Redirect,
    /// Processing failed or panicked. The page is skipped.
    Failed {
        idx: usize,
        title: String,
        error: Error,
    },
    /// The dump could not be read further.
    Unreadable { idx: usize, error: Error },
}

pub struct WorkerContext<G> {
    candidates: CandidateTable,
    matcher: Matcher,
    graph: G,
    debug_radius: usize,
    policy: OverlapPolicy,
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl<G: Neighbors> WorkerContext<G> {
    /// Compile the matcher over the unambiguous surface forms.
    pub fn new(candidates: CandidateTable, graph: G, config: &MentionConfig) -> Result<Self, Error> {
        let matcher = Matcher::new(candidates.vocabulary())?;
        Ok(Self {
            candidates,
            matcher,
            graph,
            debug_radius: config.debug_radius,
            policy: config.overlap_policy,
        })
    }

    pub fn candidates(&self) -> &CandidateTable {
        &self.candidates
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Process a page. Errors and panics are caught and reported as [PageOutcome::Failed].
    pub fn run(&self, idx: usize, page: PageRecord) -> PageOutcome {
        if page.is_redirect() {
            return PageOutcome::Redirect;
        }

        match panic::catch_unwind(AssertUnwindSafe(|| self.process_page(&page))) {
            Ok(Ok(result)) => PageOutcome::Done(result),
            Ok(Err(error)) => PageOutcome::Failed {
                idx,
                title: page.title,
                error,
            },
            Err(panic) => PageOutcome::Failed {
                idx,
                title: page.title,
                error: Error::WorkerPanic(panic_message(panic)),
            },
        }
    }

    /// Match, resolve, and keep the matches whose entity is a neighbor of the page.
    pub fn process_page(&self, page: &PageRecord) -> Result<PageResult, Error> {
        let timer = Instant::now();
        let text = markup::plain_text(&page.text);

        let found = self.matcher.find(&text);
        let nb_found = found.len();
        let resolved = spans::resolve_by(found, |m| m.span, self.policy);
        let nb_resolved = resolved.len();

        let mut matches = Vec::new();
        let mut per_entity: HashMap<String, usize> = HashMap::new();

        if !resolved.is_empty() {
            let neighbors = NeighborFilter::for_page(PageHash::of(&page.title), &self.graph)?;
            let offsets = CharOffsets::new(&text);

            for found in resolved {
                let form = self.matcher.pattern(found.pattern);
                let entity = match self.candidates.entity_for_form(form) {
                    Some(entity) => entity,
                    None => continue,
                };
                if !neighbors.detect(entity.target_hash) {
                    continue;
                }

                let span = Span::new(
                    offsets.char_of(found.span.start),
                    offsets.char_of(found.span.end),
                );
                let debug_context = Window::around(&text, &offsets, span, self.debug_radius).one_line();

                *per_entity.entry(entity.id.clone()).or_default() += 1;
                matches.push(Match {
                    entity_id: entity.id.clone(),
                    surface_form: form.to_string(),
                    page_title: page.title.clone(),
                    start_char: span.start,
                    end_char: span.end,
                    debug_context,
                });
            }
        }

        let stats = PageStats {
            raw: nb_found,
            resolved: nb_resolved,
            accepted: matches.len(),
            elapsed: timer.elapsed(),
            per_entity,
        };

        Ok(PageResult {
            rows: PageMatches {
                page: PageText {
                    title: page.title.clone(),
                    text,
                },
                matches,
            },
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::candidates::{AnyTitle, CatalogEntry};
    use crate::graph::{LinkEdge, LinkGraph};

    use super::*;

    fn entry(id: &str, label: &str, target: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            label: label.to_string(),
            target: Some(target.to_string()),
            aliases: vec![],
        }
    }

    fn context() -> WorkerContext<LinkGraph> {
        let (table, _) = CandidateTable::from_entries(
            vec![
                entry("Q64", "Berlin", "Berlin"),
                entry("Q90", "Paris", "Paris"),
                entry("Q1", "Berlin Wall", "Berlin Wall"),
            ],
            &AnyTitle,
        )
        .unwrap();
        let graph = LinkGraph::from_edges(vec![
            LinkEdge::new("Germany", "Berlin"),
            LinkEdge::new("Berlin Wall", "Germany"),
        ]);
        WorkerContext::new(table, graph, &MentionConfig::default()).unwrap()
    }

    fn page(title: &str, text: &str) -> PageRecord {
        PageRecord::new(title.to_string(), text.to_string(), None)
    }

    #[test]
    fn neighbors_are_accepted() {
        let ctx = context();
        let result = ctx
            .process_page(&page(
                "Germany",
                "'''Germany''' has [[Berlin]] as capital. Paris is in France.",
            ))
            .unwrap();

        assert_eq!(result.rows.page.text, "Germany has Berlin as capital. Paris is in France.");
        assert_eq!(result.stats.raw, 2);
        assert_eq!(result.stats.accepted, 1);

        let m = &result.rows.matches[0];
        assert_eq!(m.entity_id, "Q64");
        assert_eq!((m.start_char, m.end_char), (12, 18));
        assert_eq!(m.page_title, "Germany");
    }

    #[test]
    fn unrelated_pages_are_rejected() {
        let ctx = context();
        let result = ctx
            .process_page(&page("Cooking", "Berlin is a sauce."))
            .unwrap();
        assert_eq!(result.stats.resolved, 1);
        assert!(result.rows.matches.is_empty());
    }

    #[test]
    fn nested_mentions() {
        let ctx = context();
        let result = ctx
            .process_page(&page("Germany", "The Berlin Wall fell."))
            .unwrap();
        assert_eq!(result.stats.raw, 2);
        assert_eq!(result.stats.resolved, 1);
        let ids: HashSet<&str> = result
            .rows
            .matches
            .iter()
            .map(|m| m.entity_id.as_str())
            .collect();
        assert_eq!(ids, ["Q1"].into_iter().collect());
    }

    #[test]
    fn char_offsets() {
        let ctx = context();
        let result = ctx
            .process_page(&page("Berlin", "Überall in Berlin."))
            .unwrap();
        let m = &result.rows.matches[0];
        assert_eq!((m.start_char, m.end_char), (11, 17));
        assert_eq!(m.debug_context, "Überall in Berlin.");
    }

    #[test]
    fn redirects_are_not_processed() {
        let ctx = context();
        let outcome = ctx.run(
            0,
            PageRecord::new(
                "Deutschland".to_string(),
                "#REDIRECT [[Germany]]".to_string(),
                Some("Germany".to_string()),
            ),
        );
        assert!(matches!(outcome, PageOutcome::Redirect));
    }

    #[test]
    fn panics_are_caught() {
        let r = panic::catch_unwind(|| panic!("boom"));
        assert_eq!(panic_message(r.unwrap_err()), "boom");
    }

    /// Graph failing on some pages, the way a lost connection or a corrupt
    /// store would.
    struct BrokenGraph {
        inner: LinkGraph,
    }

    impl Neighbors for BrokenGraph {
        fn linked_to(&self, page: PageHash) -> Result<HashSet<PageHash>, Error> {
            if page == PageHash::of("Unreachable") {
                return Err(Error::Custom("db gone".to_string()));
            }
            self.inner.linked_to(page)
        }

        fn linked_from(&self, page: PageHash) -> Result<HashSet<PageHash>, Error> {
            if page == PageHash::of("Cursed") {
                panic!("index out of bounds");
            }
            self.inner.linked_from(page)
        }
    }

    fn broken_context() -> WorkerContext<BrokenGraph> {
        let (table, _) =
            CandidateTable::from_entries(vec![entry("Q64", "Berlin", "Berlin")], &AnyTitle)
                .unwrap();
        let graph = BrokenGraph {
            inner: LinkGraph::from_edges(vec![LinkEdge::new("Germany", "Berlin")]),
        };
        WorkerContext::new(table, graph, &MentionConfig::default()).unwrap()
    }

    #[test]
    fn errors_fail_the_page() {
        let ctx = broken_context();
        let outcome = ctx.run(7, page("Unreachable", "Berlin is far."));
        match outcome {
            PageOutcome::Failed { idx, title, error } => {
                assert_eq!(idx, 7);
                assert_eq!(title, "Unreachable");
                assert!(matches!(error, Error::Custom(msg) if msg == "db gone"));
            }
            other => panic!("expected a failure, got {:?}", other),
        }
    }

    #[test]
    fn panics_fail_the_page() {
        let ctx = broken_context();
        let outcome = ctx.run(3, page("Cursed", "Berlin is near."));
        match outcome {
            PageOutcome::Failed { idx, title, error } => {
                assert_eq!(idx, 3);
                assert_eq!(title, "Cursed");
                assert!(matches!(error, Error::WorkerPanic(msg) if msg == "index out of bounds"));
            }
            other => panic!("expected a failure, got {:?}", other),
        }
    }

    #[test]
    fn failures_do_not_stop_the_worker() {
        let ctx = broken_context();
        assert!(matches!(
            ctx.run(0, page("Cursed", "Berlin.")),
            PageOutcome::Failed { .. }
        ));
        assert!(matches!(
            ctx.run(1, page("Unreachable", "Berlin.")),
            PageOutcome::Failed { .. }
        ));

        match ctx.run(2, page("Germany", "Berlin is the capital.")) {
            PageOutcome::Done(result) => assert_eq!(result.stats.accepted, 1),
            other => panic!("expected a result, got {:?}", other),
        }
    }

    #[test]
    fn pages_without_mentions_skip_the_graph() {
        let ctx = broken_context();
        assert!(matches!(
            ctx.run(0, page("Cursed", "Nothing to see here.")),
            PageOutcome::Done(_)
        ));
    }
}
