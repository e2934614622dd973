//! Page locality filter.
//!
//! A mention found in page `P` is only accepted if the target page of the
//! candidate entity is `P` itself, a page `P` links to or a page linking to `P`.
//! This rejects homonymous surface forms that refer to entities unrelated to
//! the page being scanned.
use std::collections::HashSet;

use crate::error::Error;
use crate::graph::{Neighbors, PageHash};

use super::Filter;

#[derive(Debug, Default)]
pub struct NeighborFilter {
    neighbors: HashSet<PageHash>,
}

impl NeighborFilter {
    /// Compute the neighbor set of `page`.
    pub fn for_page<G: Neighbors + ?Sized>(page: PageHash, graph: &G) -> Result<Self, Error> {
        Ok(Self {
            neighbors: graph.neighbors(page)?,
        })
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

impl Filter<PageHash> for NeighborFilter {
    fn detect(&self, target: PageHash) -> bool {
        self.neighbors.contains(&target)
    }
}
