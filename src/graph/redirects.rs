//! Redirect resolution over page hashes.
//!
//! Links are stored with the title they were written with, which is often a
//! redirect (`[[Deutschland|Germany]]`). Neighbor queries look through
//! redirects so that such a link reaches the article it leads to.
use std::{collections::HashMap, hash::BuildHasherDefault};

use twox_hash::XxHash64;

use super::{LinkEdge, PageHash};

/// Maximum number of redirects followed when resolving a title or a hash.
pub const MAX_REDIRECT_HOPS: usize = 5;

#[derive(Debug, Default, Clone)]
pub struct RedirectMap {
    targets: HashMap<PageHash, PageHash, BuildHasherDefault<XxHash64>>,
}

impl RedirectMap {
    pub fn insert(&mut self, from: PageHash, to: PageHash) {
        self.targets.insert(from, to);
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Page `page` leads to, following at most [MAX_REDIRECT_HOPS] redirects.
    ///
    /// Pages that are not redirects, and redirect cycles, resolve to themselves.
    pub fn resolve(&self, page: PageHash) -> PageHash {
        let mut current = page;
        for _ in 0..MAX_REDIRECT_HOPS {
            match self.targets.get(&current) {
                Some(&next) if next == page => return page,
                Some(&next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Resolve both ends of an edge.
    pub fn resolve_edge(&self, edge: LinkEdge) -> LinkEdge {
        LinkEdge {
            from: self.resolve(edge.from),
            to: self.resolve(edge.to),
        }
    }
}

impl FromIterator<(PageHash, PageHash)> for RedirectMap {
    fn from_iter<I: IntoIterator<Item = (PageHash, PageHash)>>(iter: I) -> Self {
        let mut map = Self::default();
        for (from, to) in iter {
            map.insert(from, to);
        }
        map
    }
}
