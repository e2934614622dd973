//! Rows produced for each page of the dump.
use serde::Serialize;

use crate::sources::{markup, PageRecord};

use super::{LinkEdge, PageHash, PageTitle, Redirect};

/// What a single page contributes to the link graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphRow {
    Article {
        title: PageTitle,
        edges: Vec<LinkEdge>,
    },
    Redirect(Redirect),
}

impl GraphRow {
    /// Extract rows from a page.
    ///
    /// Redirect pages only record the redirect, not their link.
    pub fn from_page(page: &PageRecord) -> Self {
        match &page.redirect {
            Some(target) => GraphRow::Redirect(Redirect {
                from: page.title.clone(),
                to: target.clone(),
            }),
            None => {
                let from = PageHash::of(&page.title);
                let edges = markup::links(&page.text)
                    .iter()
                    .map(|target| LinkEdge {
                        from,
                        to: PageHash::of(target),
                    })
                    .collect();
                GraphRow::Article {
                    title: PageTitle {
                        hash: from,
                        title: page.title.clone(),
                    },
                    edges,
                }
            }
        }
    }
}

/// Link graph pass counters.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub articles: usize,
    pub redirects: usize,
    pub edges: usize,
}

impl GraphStats {
    pub fn record(&mut self, row: &GraphRow) {
        match row {
            GraphRow::Article { edges, .. } => {
                self.articles += 1;
                self.edges += edges.len();
            }
            GraphRow::Redirect(_) => self.redirects += 1,
        }
    }
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} articles, {} redirects, {} edges",
            self.articles, self.redirects, self.edges
        )
    }
}
