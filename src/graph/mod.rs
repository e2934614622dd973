/*! Link graph.

Pages are identified by a [PageHash] of their title. Each internal link of an
article is a directed [LinkEdge]; redirects are kept apart as [Redirect]s,
used to resolve titles and, through a [RedirectMap], the ends of edges.

Neighbor queries are expressed by the [Neighbors] trait, implemented both by
the persisted store ([crate::store::Database]) and by the in-memory [LinkGraph].
!*/
mod builder;
mod hash;
mod memory;
mod redirects;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use builder::{GraphRow, GraphStats};
pub use hash::{normalize_title, PageHash};
pub use memory::LinkGraph;
pub use redirects::{RedirectMap, MAX_REDIRECT_HOPS};

/// Directed link between two pages. Duplicates are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkEdge {
    pub from: PageHash,
    pub to: PageHash,
}

impl LinkEdge {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: PageHash::of(from),
            to: PageHash::of(to),
        }
    }
}

/// Redirect from one title to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub from: String,
    pub to: String,
}

/// Title of an article, keyed by its hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTitle {
    pub hash: PageHash,
    pub title: String,
}

impl PageTitle {
    pub fn new(title: String) -> Self {
        Self {
            hash: PageHash::of(&title),
            title,
        }
    }
}

/// Neighbor queries over a link graph.
pub trait Neighbors {
    /// Pages `page` links to.
    fn linked_to(&self, page: PageHash) -> Result<HashSet<PageHash>, Error>;

    /// Pages linking to `page`.
    fn linked_from(&self, page: PageHash) -> Result<HashSet<PageHash>, Error>;

    /// `page` itself, the pages it links to and the pages linking to it.
    fn neighbors(&self, page: PageHash) -> Result<HashSet<PageHash>, Error> {
        let mut neighbors = self.linked_to(page)?;
        neighbors.extend(self.linked_from(page)?);
        neighbors.insert(page);
        Ok(neighbors)
    }
}
